/// Preprocessing tool: reads one GeoJSON built-up layer per year, rasterizes
/// every year onto shared bounds and writes `grid_<year>.json` snapshots plus
/// a `manifest.json` for the `sprawl` CLI.
///
/// Layer files are matched by extension (`.geojson`, `.json`); the year is
/// taken from the digits of the file stem, e.g. `pemukiman_2019.geojson`.
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::FmtSubscriber;

use sprawl_core::raster::{parse_layer, rasterize_years, RasterManifest, VectorLayer};
use sprawl_core::snapshot::{save_set, year_from_stem};
use sprawl_core::{RasterOptions, SimulationConfig};

// ── CLI ──────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "rasterizer", about = "Rasterize yearly built-up polygon layers into occupancy grid snapshots")]
struct Args {
    /// Directory of yearly GeoJSON layers
    #[arg(short, long, default_value = "data/layers")]
    input: PathBuf,

    /// Output directory for snapshots and manifest (created if absent)
    #[arg(short, long, default_value = "data/grids")]
    output: PathBuf,

    /// Cell size in projected units; overrides the config file
    #[arg(long)]
    resolution: Option<f64>,

    /// JSON configuration file; only its `raster` section is used
    #[arg(long)]
    config: Option<PathBuf>,

    /// CRS assumed for layers that declare none, e.g. EPSG:32751
    #[arg(long)]
    default_crs: Option<String>,

    /// Verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn raster_options(args: &Args) -> Result<RasterOptions> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path).with_context(|| format!("Cannot read {}", path.display()))?;
            SimulationConfig::from_json(&text).with_context(|| format!("Invalid config {}", path.display()))?
        }
        None => SimulationConfig::default(),
    };
    if let Some(r) = args.resolution {
        config.raster.resolution = r;
    }
    if let Some(crs) = &args.default_crs {
        config.raster.default_crs = Some(crs.clone());
    }
    config.validate().context("Invalid raster options")?;
    Ok(config.raster)
}

fn is_layer_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref(),
        Some("geojson" | "json")
    )
}

/// Year-tagged layer files in `dir`, ascending by year. Files without a year
/// in their stem are skipped; two files for one year is an error.
fn list_layers(dir: &Path) -> Result<BTreeMap<i32, PathBuf>> {
    let mut layers = BTreeMap::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Cannot list {}", dir.display()))? {
        let path = entry?.path();
        if !path.is_file() || !is_layer_file(&path) {
            continue;
        }
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        let year = match year_from_stem(stem) {
            Ok(y) => y,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "layer ignored");
                continue;
            }
        };
        if let Some(prev) = layers.insert(year, path.clone()) {
            bail!("Two layers for {year}: {} and {}", prev.display(), path.display());
        }
    }
    Ok(layers)
}

/// Parse every listed layer. Unreadable layers are reported and dropped.
fn read_layers(files: &BTreeMap<i32, PathBuf>) -> (BTreeMap<i32, VectorLayer>, Vec<(i32, String)>) {
    let mut layers = BTreeMap::new();
    let mut failures = Vec::new();
    for (&year, path) in files {
        let parsed = fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|text| parse_layer(&text).map_err(|e| e.to_string()));
        match parsed {
            Ok(layer) => {
                info!(year, features = layer.features.len(), "layer read");
                layers.insert(year, layer);
            }
            Err(e) => failures.push((year, e)),
        }
    }
    (layers, failures)
}

/// Full pipeline; returns the manifest and every per-year failure.
fn process(input: &Path, output: &Path, opts: &RasterOptions) -> Result<(RasterManifest, Vec<(i32, String)>)> {
    let files = list_layers(input)?;
    if files.is_empty() {
        bail!("No year-tagged GeoJSON layers in {}", input.display());
    }

    let (layers, mut failures) = read_layers(&files);
    let run = rasterize_years(&layers, opts).context("Rasterization failed")?;
    failures.extend(run.failures.iter().map(|(y, e)| (*y, e.to_string())));
    failures.sort_by_key(|(y, _)| *y);
    if run.grids.is_empty() {
        bail!("Every layer failed; nothing to write");
    }

    save_set(output, &run.grids).with_context(|| format!("Cannot write snapshots to {}", output.display()))?;
    let manifest = run.manifest(opts.resolution);
    let manifest_path = output.join("manifest.json");
    fs::write(&manifest_path, serde_json::to_string_pretty(&manifest)?)
        .with_context(|| format!("Cannot write {}", manifest_path.display()))?;
    Ok((manifest, failures))
}

fn main() -> Result<()> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(match args.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        })
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Cannot install tracing subscriber")?;

    let opts = raster_options(&args)?;
    let (manifest, failures) = process(&args.input, &args.output, &opts)?;

    eprintln!(
        "[rasterizer] {}x{} cells at {} units → {}",
        manifest.width,
        manifest.height,
        manifest.resolution,
        args.output.display()
    );
    for y in &manifest.years {
        eprintln!("  {}: {} cells, {:.2} ha of polygons", y.year, y.occupied_cells, y.polygon_hectares);
    }
    for (year, reason) in &failures {
        eprintln!("  [skip] {year}: {reason}");
    }
    Ok(())
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("sprawl-rasterizer-{tag}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn square(x0: f64, y0: f64, side: f64, category: &str) -> String {
        let (x1, y1) = (x0 + side, y0 + side);
        format!(
            r#"{{"type":"Feature","properties":{{"Filter":"{category}"}},"geometry":{{"type":"Polygon","coordinates":[[[{x0},{y0}],[{x1},{y0}],[{x1},{y1}],[{x0},{y1}],[{x0},{y0}]]]}}}}"#
        )
    }

    fn collection(features: &[String]) -> String {
        format!(
            r#"{{"type":"FeatureCollection","crs":{{"type":"name","properties":{{"name":"EPSG:32751"}}}},"features":[{}]}}"#,
            features.join(",")
        )
    }

    #[test]
    fn layer_listing_keys_by_year() {
        let dir = scratch_dir("listing");
        fs::write(dir.join("built_2019.geojson"), "{}").unwrap();
        fs::write(dir.join("built_2018.JSON"), "{}").unwrap();
        fs::write(dir.join("notes.txt"), "").unwrap();
        fs::write(dir.join("legend.json"), "{}").unwrap();

        let layers = list_layers(&dir).unwrap();
        assert_eq!(layers.keys().copied().collect::<Vec<_>>(), vec![2018, 2019]);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn duplicate_year_rejected() {
        let dir = scratch_dir("duplicate");
        fs::write(dir.join("a_2019.geojson"), "{}").unwrap();
        fs::write(dir.join("b_2019.json"), "{}").unwrap();
        assert!(list_layers(&dir).is_err());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn pipeline_writes_snapshots_and_manifest() {
        let input = scratch_dir("pipeline-in");
        let output = input.join("out");
        fs::write(
            input.join("built_2020.geojson"),
            collection(&[square(0.0, 0.0, 200.0, "Kawasan Terbangun"), square(400.0, 400.0, 100.0, "Sawah")]),
        )
        .unwrap();
        fs::write(
            input.join("built_2021.geojson"),
            collection(&[square(0.0, 0.0, 300.0, " kawasan terbangun ")]),
        )
        .unwrap();
        fs::write(input.join("built_2022.geojson"), "not json").unwrap();

        let (manifest, failures) = process(&input, &output, &RasterOptions::default()).unwrap();
        assert_eq!((manifest.width, manifest.height), (5, 5));
        assert_eq!(manifest.years.len(), 2);
        assert_eq!(manifest.years[0].occupied_cells, 4);
        assert_eq!(manifest.years[1].occupied_cells, 9);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, 2022);

        let loaded = sprawl_core::snapshot::load_set(&output).unwrap();
        assert_eq!(loaded.years().collect::<Vec<_>>(), vec![2020, 2021]);
        assert!(output.join("manifest.json").exists());
        fs::remove_dir_all(&input).unwrap();
    }

    #[test]
    fn resolution_flag_overrides_config() {
        let args = Args::try_parse_from(["rasterizer", "--resolution", "30", "--default-crs", "EPSG:32751"]).unwrap();
        let opts = raster_options(&args).unwrap();
        assert_eq!(opts.resolution, 30.0);
        assert_eq!(opts.default_crs.as_deref(), Some("EPSG:32751"));

        let bad = Args::try_parse_from(["rasterizer", "--resolution", "0"]).unwrap();
        assert!(raster_options(&bad).is_err());
    }
}
