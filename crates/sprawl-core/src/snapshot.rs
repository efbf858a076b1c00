//! JSON snapshots of occupancy grids, one `grid_<year>.json` file per year.
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::SnapshotError;
use crate::grid::OccupancyGrid;
use crate::yearly::YearlyGridSet;

pub fn snapshot_path(dir: &Path, year: i32) -> PathBuf {
    dir.join(format!("grid_{year}.json"))
}

pub fn save_grid(path: &Path, grid: &OccupancyGrid) -> Result<(), SnapshotError> {
    fs::write(path, serde_json::to_string(grid)?)?;
    Ok(())
}

pub fn load_grid(path: &Path) -> Result<OccupancyGrid, SnapshotError> {
    let grid: OccupancyGrid = serde_json::from_str(&fs::read_to_string(path)?)?;
    grid.validate()?;
    Ok(grid)
}

/// Write every grid of the set into `dir`, creating it if needed.
pub fn save_set(dir: &Path, set: &YearlyGridSet) -> Result<(), SnapshotError> {
    fs::create_dir_all(dir)?;
    for (year, grid) in set.iter() {
        let path = snapshot_path(dir, year);
        save_grid(&path, grid)?;
        debug!(year, path = %path.display(), "snapshot written");
    }
    Ok(())
}

/// Year taken from the digits of a file stem: `grid_2021` → 2021.
pub fn year_from_stem(stem: &str) -> Result<i32, SnapshotError> {
    let digits: String = stem.chars().filter(char::is_ascii_digit).collect();
    digits.parse().map_err(|_| SnapshotError::NoYearInName(stem.to_string()))
}

/// Load every `grid_*.json` in `dir`. Other files are ignored.
pub fn load_set(dir: &Path) -> Result<YearlyGridSet, SnapshotError> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| is_snapshot(p))
        .collect();
    entries.sort();

    let mut set = YearlyGridSet::new();
    for path in entries {
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        let year = match year_from_stem(stem) {
            Ok(y) => y,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "snapshot ignored");
                continue;
            }
        };
        set.insert(year, load_grid(&path)?)?;
    }
    Ok(set)
}

fn is_snapshot(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    name.starts_with("grid_") && name.ends_with(".json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic::random_grid;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("sprawl-snapshot-{tag}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn set_roundtrips_through_directory() {
        let dir = scratch_dir("roundtrip");
        let set = YearlyGridSet::from_grids([
            (2020, random_grid(6, 5, 0.3, 1)),
            (2021, random_grid(6, 5, 0.4, 2)),
        ])
        .unwrap();
        save_set(&dir, &set).unwrap();
        fs::write(dir.join("manifest.json"), "{}").unwrap();

        let loaded = load_set(&dir).unwrap();
        assert_eq!(loaded, set);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn corrupt_snapshot_rejected() {
        let dir = scratch_dir("corrupt");
        fs::create_dir_all(&dir).unwrap();
        let bad = r#"{"data":[0,3],"width":2,"height":1,"georef":{"origin_x":0.0,"origin_y":1.0,"cell_size":1.0}}"#;
        fs::write(snapshot_path(&dir, 2020), bad).unwrap();
        assert!(matches!(load_set(&dir), Err(SnapshotError::Grid(_))));

        let huge = format!(
            r#"{{"data":[],"width":{},"height":2,"georef":{{"origin_x":0.0,"origin_y":1.0,"cell_size":1.0}}}}"#,
            usize::MAX
        );
        fs::write(snapshot_path(&dir, 2020), huge).unwrap();
        assert!(matches!(load_grid(&snapshot_path(&dir, 2020)), Err(SnapshotError::Grid(_))));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn year_parsing() {
        assert_eq!(year_from_stem("grid_2024").unwrap(), 2024);
        assert_eq!(year_from_stem("permukiman2019").unwrap(), 2019);
        assert!(year_from_stem("grid_latest").is_err());
    }
}
