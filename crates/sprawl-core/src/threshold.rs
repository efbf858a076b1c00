//! Validated scalar parameters of the growth automaton.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::GrowthError;

/// Minimum number of occupied Moore neighbours that converts a vacant cell.
///
/// Only values in `1..=8` can be constructed, so the growth step itself is
/// total over every `Threshold` it receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Threshold(u8);

impl Threshold {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 8;

    pub fn new(value: i64) -> Result<Self, GrowthError> {
        if (Self::MIN as i64..=Self::MAX as i64).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(GrowthError::InvalidThreshold(value))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Ascending candidates `min..=max`; both ends must be valid thresholds.
    pub fn candidates(min: u8, max: u8) -> Result<Vec<Threshold>, GrowthError> {
        let lo = Self::new(min as i64)?;
        let hi = Self::new(max as i64)?;
        Ok((lo.0..=hi.0).map(Threshold).collect())
    }

    /// The full `1..=8` candidate set.
    pub fn all() -> Vec<Threshold> {
        (Self::MIN..=Self::MAX).map(Threshold).collect()
    }
}

impl TryFrom<i64> for Threshold {
    type Error = GrowthError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Threshold> for u8 {
    fn from(t: Threshold) -> u8 {
        t.0
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Number of growth steps to apply; one step per simulated year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StepCount(u32);

impl StepCount {
    pub const ZERO: StepCount = StepCount(0);

    pub fn new(value: i64) -> Result<Self, GrowthError> {
        if value < 0 {
            return Err(GrowthError::InvalidStepCount(value));
        }
        u32::try_from(value)
            .map(StepCount)
            .map_err(|_| GrowthError::InvalidStepCount(value))
    }

    /// Steps needed to go from `last_year` to `target_year`.
    pub fn between(last_year: i32, target_year: i32) -> Result<Self, GrowthError> {
        Self::new(target_year as i64 - last_year as i64)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for StepCount {
    fn from(n: u32) -> Self {
        StepCount(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_range_enforced() {
        assert_eq!(Threshold::new(0), Err(GrowthError::InvalidThreshold(0)));
        assert_eq!(Threshold::new(9), Err(GrowthError::InvalidThreshold(9)));
        assert_eq!(Threshold::new(-3), Err(GrowthError::InvalidThreshold(-3)));
        assert_eq!(Threshold::new(1).unwrap().get(), 1);
        assert_eq!(Threshold::new(8).unwrap().get(), 8);
    }

    #[test]
    fn candidates_are_ascending() {
        let c: Vec<u8> = Threshold::candidates(3, 6).unwrap().into_iter().map(u8::from).collect();
        assert_eq!(c, vec![3, 4, 5, 6]);
        assert_eq!(Threshold::all().len(), 8);
        assert!(Threshold::candidates(0, 4).is_err());
        assert!(Threshold::candidates(5, 4).unwrap().is_empty());
    }

    #[test]
    fn threshold_deserialize_validates() {
        let ok: Threshold = serde_json::from_str("5").unwrap();
        assert_eq!(ok.get(), 5);
        assert!(serde_json::from_str::<Threshold>("12").is_err());
    }

    #[test]
    fn negative_steps_rejected() {
        assert_eq!(StepCount::new(-1), Err(GrowthError::InvalidStepCount(-1)));
        assert_eq!(StepCount::between(2024, 2030).unwrap().get(), 6);
        assert!(StepCount::between(2024, 2020).is_err());
    }
}
