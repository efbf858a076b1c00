//! Error types for sprawl-core.

use thiserror::Error;

/// Errors raised by the grid model, the growth automaton and the calibrator.
///
/// All variants are local to a single request; none of them leaves shared
/// state behind, so the caller can recover by supplying different input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GrowthError {
    /// A requested year has no grid in the historical set.
    #[error("no occupancy grid for year {year}")]
    MissingData {
        /// The year that was looked up.
        year: i32,
    },

    /// Two grids that must be compared cell by cell have different dimensions.
    #[error("grid shape mismatch: expected {}x{}, found {}x{}", expected.0, expected.1, found.0, found.1)]
    ShapeMismatch {
        /// (height, width) of the reference grid.
        expected: (usize, usize),
        /// (height, width) of the offending grid.
        found: (usize, usize),
    },

    /// A grid has the right shape but sits on a different spatial transform.
    #[error("grid for year {year} does not share the common bounds of the set")]
    GeoRefMismatch {
        /// Year of the rejected grid.
        year: i32,
    },

    /// Threshold outside the supported 1..=8 neighbour-count range.
    #[error("threshold {0} outside supported range 1..=8")]
    InvalidThreshold(i64),

    /// Negative number of simulation steps.
    #[error("step count {0} is negative")]
    InvalidStepCount(i64),

    /// Prediction year not strictly after the last known year, or past the horizon.
    #[error("target year {target} must lie in {}..={}", *last as i64 + 1, *last as i64 + *horizon as i64)]
    InvalidTargetYear {
        /// Requested prediction year.
        target: i32,
        /// Last year with known data.
        last: i32,
        /// Maximum number of years past `last`.
        horizon: u32,
    },

    /// Operation needs at least one grid.
    #[error("yearly grid set is empty")]
    EmptyGridSet,

    /// Grid data does not describe a binary raster of the stated shape.
    #[error("invalid grid: {reason}")]
    InvalidGrid {
        /// Human-readable cause.
        reason: String,
    },

    /// Configuration values are inconsistent.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Human-readable cause.
        reason: String,
    },
}

/// Errors raised while turning polygon layers into occupancy grids.
#[derive(Debug, Error)]
pub enum RasterError {
    /// Layer carries no coordinate reference system.
    #[error("layer has no coordinate reference system")]
    MissingCrs,

    /// Layer is in geographic (lon/lat) coordinates; cell sizes would be meaningless.
    #[error("layer CRS {0} is geographic; reproject to a projected CRS first")]
    GeographicCrs(String),

    /// No feature carries the category attribute.
    #[error("no feature carries the '{0}' attribute")]
    MissingAttribute(String),

    /// Category filter removed every feature.
    #[error("no built-up features in layer")]
    NoBuiltUpFeatures,

    /// Geometry repair removed every polygon.
    #[error("no valid polygon geometry left after repair")]
    NoValidGeometry,

    /// Extent too small for a single cell at the requested resolution.
    #[error("degenerate grid size {width}x{height}")]
    DegenerateExtent {
        /// Computed column count.
        width: i64,
        /// Computed row count.
        height: i64,
    },

    /// Cell size must be positive and finite.
    #[error("invalid resolution {0}")]
    InvalidResolution(f64),

    /// Common bounds requested over zero layers.
    #[error("no layers to compute common bounds from")]
    EmptyLayerSet,

    /// Geometry type other than Polygon / MultiPolygon.
    #[error("unsupported geometry type '{0}'")]
    UnsupportedGeometry(String),

    /// Malformed GeoJSON.
    #[error("malformed GeoJSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Grid(#[from] GrowthError),
}

/// Errors raised while reading or writing grid snapshots.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Grid(#[from] GrowthError),

    /// File name has no digits to take the year from.
    #[error("no year in snapshot name '{0}'")]
    NoYearInName(String),
}
