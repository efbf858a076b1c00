/// Command-line front end: calibrate, forecast and compare over a directory
/// of `grid_<year>.json` snapshots written by the rasterizer tool.
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

use sprawl_core::metrics::{area_trend, occupied_hectares, AreaSample, ChangeSummary};
use sprawl_core::raster::RasterManifest;
use sprawl_core::snapshot::{load_set, save_set};
use sprawl_core::synthetic::{clustered_grid, grow_history};
use sprawl_core::{CalibrationReport, Extent, Forecaster, SimulationConfig, Threshold, YearlyGridSet};

// ── CLI ──────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "sprawl", about = "Cellular-automaton urban growth calibration and forecasting")]
struct Cli {
    /// JSON configuration file (defaults apply when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Pick the threshold that best reproduces the historical transitions
    Calibrate {
        /// Directory of grid snapshots
        #[arg(long)]
        grids: PathBuf,
    },
    /// Forecast the built-up area of a future year
    Predict {
        #[arg(long)]
        grids: PathBuf,
        /// Target year, after the last snapshot and within the horizon
        #[arg(long)]
        year: i32,
        /// Write the full forecast (both grids included) to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Classify observed change between `year - 1` and `year`
    Compare {
        #[arg(long)]
        grids: PathBuf,
        #[arg(long)]
        year: i32,
    },
    /// Built-up area per year; polygon area too when a rasterizer manifest is present
    Trend {
        #[arg(long)]
        grids: PathBuf,
    },
    /// Grow a synthetic history and calibrate against it
    Demo {
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Grid side length in cells
        #[arg(long, default_value_t = 64)]
        size: usize,
        /// Number of synthetic years
        #[arg(long, default_value_t = 5)]
        years: usize,
        /// Threshold used to grow the synthetic history
        #[arg(long, default_value_t = 3)]
        threshold: i64,
        /// Also write the synthetic snapshots to this directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

// ── JSON output ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct PredictionSummary {
    threshold: Threshold,
    base_year: i32,
    target_year: i32,
    steps: u32,
    before_hectares: f64,
    after_hectares: f64,
    change: ChangeSummary,
    bounds: Extent,
    calibration: CalibrationReport,
}

#[derive(Serialize)]
struct ComparisonSummary {
    from_year: i32,
    to_year: i32,
    change: ChangeSummary,
    bounds: Extent,
}

#[derive(Serialize)]
struct TrendRow {
    #[serde(flatten)]
    cells: AreaSample,
    /// Area measured on the source polygons, from `manifest.json`.
    #[serde(skip_serializing_if = "Option::is_none")]
    polygon_hectares: Option<f64>,
}

#[derive(Serialize)]
struct DemoSummary {
    seed: u64,
    size: usize,
    true_threshold: Threshold,
    calibration: CalibrationReport,
    trend: Vec<AreaSample>,
}

// ── Commands ─────────────────────────────────────────────────────────────────

fn load_config(path: Option<&Path>) -> Result<SimulationConfig> {
    let Some(path) = path else {
        return Ok(SimulationConfig::default());
    };
    let text = fs::read_to_string(path).with_context(|| format!("Cannot read {}", path.display()))?;
    SimulationConfig::from_json(&text).with_context(|| format!("Invalid config {}", path.display()))
}

fn load_grids(dir: &Path) -> Result<YearlyGridSet> {
    let set = load_set(dir).with_context(|| format!("Cannot load snapshots from {}", dir.display()))?;
    if set.is_empty() {
        bail!("No grid_<year>.json snapshots in {}", dir.display());
    }
    info!(years = set.len(), dir = %dir.display(), "snapshots loaded");
    Ok(set)
}

fn load_manifest(dir: &Path) -> Result<Option<RasterManifest>> {
    let path = dir.join("manifest.json");
    if !path.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(&path).with_context(|| format!("Cannot read {}", path.display()))?;
    let manifest = serde_json::from_str(&text).with_context(|| format!("Invalid manifest {}", path.display()))?;
    Ok(Some(manifest))
}

fn trend_rows(set: &YearlyGridSet, manifest: Option<&RasterManifest>) -> Vec<TrendRow> {
    area_trend(set)
        .into_iter()
        .map(|cells| TrendRow {
            polygon_hectares: manifest
                .and_then(|m| m.years.iter().find(|y| y.year == cells.year))
                .map(|y| y.polygon_hectares),
            cells,
        })
        .collect()
}

/// Execute one command and return its JSON report.
fn run(command: Command, config: SimulationConfig) -> Result<String> {
    let mut forecaster = Forecaster::new(config).context("Invalid configuration")?;

    let json = match command {
        Command::Calibrate { grids } => {
            let set = load_grids(&grids)?;
            let report = forecaster.calibrate(&set)?;
            serde_json::to_string_pretty(&report)?
        }
        Command::Predict { grids, year, output } => {
            let set = load_grids(&grids)?;
            let forecast = forecaster.predict(&set, year)?;
            if let Some(path) = output {
                fs::write(&path, serde_json::to_string(&forecast)?)
                    .with_context(|| format!("Cannot write {}", path.display()))?;
                info!(path = %path.display(), "forecast written");
            }
            let summary = PredictionSummary {
                threshold: forecast.threshold,
                base_year: forecast.base_year,
                target_year: forecast.target_year,
                steps: forecast.steps.get(),
                before_hectares: occupied_hectares(&forecast.before),
                after_hectares: occupied_hectares(&forecast.after),
                change: forecast.change()?.summary(),
                bounds: forecast.after.world_extent(),
                calibration: forecast.report,
            };
            serde_json::to_string_pretty(&summary)?
        }
        Command::Compare { grids, year } => {
            let set = load_grids(&grids)?;
            let map = forecaster.compare(&set, year)?;
            let summary = ComparisonSummary {
                from_year: year - 1,
                to_year: year,
                change: map.summary(),
                bounds: map.bounds,
            };
            serde_json::to_string_pretty(&summary)?
        }
        Command::Trend { grids } => {
            let set = load_grids(&grids)?;
            let manifest = load_manifest(&grids)?;
            serde_json::to_string_pretty(&trend_rows(&set, manifest.as_ref()))?
        }
        Command::Demo { seed, size, years, threshold, output } => {
            if size == 0 || years < 2 {
                bail!("demo needs a non-empty grid and at least two years");
            }
            let true_threshold = Threshold::new(threshold)?;
            let start = clustered_grid(size, size, (size / 16).max(1), 2, seed);
            let set = grow_history(&start, true_threshold, 2015, years)?;
            if let Some(dir) = output {
                save_set(&dir, &set).with_context(|| format!("Cannot write snapshots to {}", dir.display()))?;
            }
            let calibration = forecaster.calibrate(&set)?;
            let summary = DemoSummary { seed, size, true_threshold, calibration, trend: area_trend(&set) };
            serde_json::to_string_pretty(&summary)?
        }
    };
    Ok(json)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_writer(std::io::stderr)
        .with_max_level(match cli.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        })
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Cannot install tracing subscriber")?;

    let config = load_config(cli.config.as_deref())?;
    println!("{}", run(cli.command, config)?);
    Ok(())
}

// ── Tests ────────────────────────────────────────────────────────────────────
