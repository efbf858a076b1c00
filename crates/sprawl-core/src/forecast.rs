//! Forecast orchestrator: calibrate on history, seed with the last observed
//! year, run the automaton forward, classify the change.

use serde::Serialize;
use tracing::info;

use crate::cache::SimulationCache;
use crate::calibrate::{calibrate, CalibrationReport};
use crate::config::SimulationConfig;
use crate::error::GrowthError;
use crate::grid::OccupancyGrid;
use crate::metrics::ChangeMap;
use crate::threshold::{StepCount, Threshold};
use crate::yearly::YearlyGridSet;

// ── Public structs ────────────────────────────────────────────────────────────

/// Result of one prediction request. `before`/`after` go to the renderer.
#[derive(Debug, Clone, Serialize)]
pub struct Forecast {
    pub threshold: Threshold,
    pub base_year: i32,
    pub target_year: i32,
    pub steps: StepCount,
    pub before: OccupancyGrid,
    pub after: OccupancyGrid,
    pub report: CalibrationReport,
}

impl Forecast {
    pub fn change(&self) -> Result<ChangeMap, GrowthError> {
        ChangeMap::between(&self.before, &self.after)
    }
}

// ── Orchestrator ──────────────────────────────────────────────────────────────

/// Stateless apart from the optional simulation cache.
pub struct Forecaster {
    config: SimulationConfig,
    cache: Option<SimulationCache>,
}

impl Forecaster {
    pub fn new(config: SimulationConfig) -> Result<Self, GrowthError> {
        config.validate()?;
        let cache = config.cache.then(SimulationCache::new);
        Ok(Self { config, cache })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn cache(&self) -> Option<&SimulationCache> {
        self.cache.as_ref()
    }

    /// Score every configured candidate over the configured window.
    pub fn calibrate(&self, set: &YearlyGridSet) -> Result<CalibrationReport, GrowthError> {
        let window = self.config.calibration.window(set)?;
        let candidates = self.config.calibration.candidates()?;
        calibrate(set, &window, &candidates)
    }

    /// Predict `target_year` from the last observed year.
    ///
    /// The target must lie in `last+1 ..= last+horizon`; a set with no grids
    /// cannot seed a prediction and is an error, never substituted.
    pub fn predict(&mut self, set: &YearlyGridSet, target_year: i32) -> Result<Forecast, GrowthError> {
        let base_year = set.last_year().ok_or(GrowthError::EmptyGridSet)?;
        self.predict_from(set, base_year, target_year)
    }

    /// Predict `target_year` starting from an explicit `base_year`.
    pub fn predict_from(
        &mut self,
        set: &YearlyGridSet,
        base_year: i32,
        target_year: i32,
    ) -> Result<Forecast, GrowthError> {
        let horizon = self.config.horizon;
        if target_year <= base_year || target_year as i64 - base_year as i64 > horizon as i64 {
            return Err(GrowthError::InvalidTargetYear { target: target_year, last: base_year, horizon });
        }
        let before = set.require(base_year)?.clone();
        let steps = StepCount::between(base_year, target_year)?;

        let report = self.calibrate(set)?;
        let threshold = report.best;

        let strategy = self.config.strategy;
        let after = match self.cache.as_mut() {
            Some(cache) => cache.simulate(&before, threshold, steps, strategy),
            None => crate::automaton::simulate(&before, threshold, steps, strategy),
        };
        info!(
            base_year,
            target_year,
            threshold = threshold.get(),
            before = before.occupied_count(),
            after = after.occupied_count(),
            "forecast complete"
        );

        Ok(Forecast { threshold, base_year, target_year, steps, before, after, report })
    }

    /// Observed change from `year - 1` to `year`.
    pub fn compare(&self, set: &YearlyGridSet, year: i32) -> Result<ChangeMap, GrowthError> {
        let previous = year.checked_sub(1).ok_or(GrowthError::MissingData { year })?;
        let before = set.require(previous)?;
        let after = set.require(year)?;
        ChangeMap::between(before, after)
    }
}

// ── Unit tests ────────────────────────────────────────────────────────────────
