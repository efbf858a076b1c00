//! Cellular-automaton urban growth: rasterize yearly built-up layers,
//! calibrate the Moore-neighbourhood threshold on history, simulate forward.
pub mod automaton;
pub mod cache;
pub mod calibrate;
pub mod config;
pub mod error;
pub mod extent;
pub mod forecast;
pub mod grid;
pub mod metrics;
pub mod raster;
pub mod snapshot;
pub mod synthetic;
pub mod threshold;
pub mod yearly;

pub use automaton::{count_neighbors, grow_step, simulate, NeighborCounts, SweepStrategy};
pub use calibrate::{calibrate, CalibrationReport, CalibrationWindow, CandidateScore};
pub use config::{CalibrationSettings, RasterOptions, SimulationConfig};
pub use error::{GrowthError, RasterError, SnapshotError};
pub use extent::{Extent, GeoRef};
pub use forecast::{Forecast, Forecaster};
pub use grid::{OccupancyGrid, OCCUPIED, VACANT};
pub use threshold::{StepCount, Threshold};
pub use yearly::YearlyGridSet;
