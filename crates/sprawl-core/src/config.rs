//! User-facing configuration. Defaults reproduce the reference calibration
//! setup: 100 m cells, the four earliest year pairs, thresholds 1–8, and a
//! ten-year forecast horizon.

use serde::{Deserialize, Serialize};

use crate::automaton::SweepStrategy;
use crate::calibrate::CalibrationWindow;
use crate::error::GrowthError;
use crate::threshold::Threshold;
use crate::yearly::YearlyGridSet;

/// Rasterization settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterOptions {
    /// Cell side length in projected units.
    pub resolution: f64,
    /// Attribute holding the land-use category.
    pub category_attribute: String,
    /// Category value that marks built-up land (case-insensitive, trimmed).
    pub built_up_category: String,
    /// Refuse layers without a CRS.
    pub require_crs: bool,
    /// CRS assumed for layers that carry none.
    pub default_crs: Option<String>,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            resolution: 100.0,
            category_attribute: "Filter".into(),
            built_up_category: "Kawasan Terbangun".into(),
            require_crs: true,
            default_crs: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationSettings {
    /// First year of the window; `None` means the earliest year available.
    pub first_year: Option<i32>,
    /// Number of consecutive year pairs scored.
    pub pairs: usize,
    pub min_threshold: u8,
    pub max_threshold: u8,
}

impl Default for CalibrationSettings {
    fn default() -> Self {
        Self { first_year: None, pairs: 4, min_threshold: Threshold::MIN, max_threshold: Threshold::MAX }
    }
}

impl CalibrationSettings {
    pub fn candidates(&self) -> Result<Vec<Threshold>, GrowthError> {
        Threshold::candidates(self.min_threshold, self.max_threshold)
    }

    /// Resolve the window against the data actually loaded.
    pub fn window(&self, set: &YearlyGridSet) -> Result<CalibrationWindow, GrowthError> {
        match self.first_year {
            Some(y) => CalibrationWindow::new(y, self.pairs),
            None => CalibrationWindow::earliest(set, self.pairs),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub raster: RasterOptions,
    pub calibration: CalibrationSettings,
    /// Furthest forecast, in years past the last observed year.
    pub horizon: u32,
    pub strategy: SweepStrategy,
    /// Memoize simulation results within one forecaster.
    pub cache: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            raster: RasterOptions::default(),
            calibration: CalibrationSettings::default(),
            horizon: 10,
            strategy: SweepStrategy::Frontier,
            cache: true,
        }
    }
}

impl SimulationConfig {
    /// Parse and validate. Missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self, GrowthError> {
        let cfg: SimulationConfig = serde_json::from_str(text)
            .map_err(|e| GrowthError::InvalidConfig { reason: e.to_string() })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), GrowthError> {
        let invalid = |reason: String| Err(GrowthError::InvalidConfig { reason });

        let c = &self.calibration;
        if Threshold::new(c.min_threshold as i64).is_err() || Threshold::new(c.max_threshold as i64).is_err() {
            return invalid(format!(
                "threshold bounds {}..={} must lie within {}..={}",
                c.min_threshold,
                c.max_threshold,
                Threshold::MIN,
                Threshold::MAX
            ));
        }
        if c.min_threshold > c.max_threshold {
            return invalid(format!("min_threshold {} exceeds max_threshold {}", c.min_threshold, c.max_threshold));
        }
        if c.pairs == 0 {
            return invalid("calibration needs at least one year pair".into());
        }
        if i32::try_from(c.pairs).is_err() {
            return invalid(format!("{} calibration pairs exceed the year range", c.pairs));
        }
        if let Some(first) = c.first_year {
            CalibrationWindow::new(first, c.pairs)?;
        }
        let r = self.raster.resolution;
        if !(r.is_finite() && r > 0.0) {
            return invalid(format!("resolution {r} must be positive"));
        }
        if self.horizon == 0 {
            return invalid("horizon must be at least one year".into());
        }
        Ok(())
    }
}
