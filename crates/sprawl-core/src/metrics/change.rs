//! Before/after classification handed to the map renderer.
//!
//! Each cell of a before/after pair falls in one of four classes. The
//! renderer draws `New` cells as the growth overlay and `Retained` cells as
//! the existing settlement; `Lost` only appears when comparing observed
//! historical years, never in a simulated forecast.

use serde::{Deserialize, Serialize};

use crate::error::GrowthError;
use crate::extent::Extent;
use crate::grid::{OccupancyGrid, OCCUPIED, VACANT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeClass {
    /// Vacant before and after.
    Empty,
    /// Occupied before and after.
    Retained,
    /// Vacant before, occupied after.
    New,
    /// Occupied before, vacant after.
    Lost,
}

impl ChangeClass {
    fn classify(before: u8, after: u8) -> Self {
        match (before, after) {
            (OCCUPIED, OCCUPIED) => ChangeClass::Retained,
            (VACANT, OCCUPIED) => ChangeClass::New,
            (OCCUPIED, _) => ChangeClass::Lost,
            _ => ChangeClass::Empty,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChangeSummary {
    pub empty: usize,
    pub retained: usize,
    pub new: usize,
    pub lost: usize,
}

/// Per-cell change classes between two same-shape grids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeMap {
    pub classes: Vec<ChangeClass>,
    pub width: usize,
    pub height: usize,
    /// Real-world bounds for geo-registering the overlay.
    pub bounds: Extent,
}

impl ChangeMap {
    pub fn between(before: &OccupancyGrid, after: &OccupancyGrid) -> Result<Self, GrowthError> {
        before.ensure_same_shape(after)?;
        let classes = before
            .data
            .iter()
            .zip(&after.data)
            .map(|(&b, &a)| ChangeClass::classify(b, a))
            .collect();
        Ok(Self {
            classes,
            width: before.width,
            height: before.height,
            bounds: before.world_extent(),
        })
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> ChangeClass {
        self.classes[row * self.width + col]
    }

    pub fn summary(&self) -> ChangeSummary {
        let mut s = ChangeSummary::default();
        for c in &self.classes {
            match c {
                ChangeClass::Empty => s.empty += 1,
                ChangeClass::Retained => s.retained += 1,
                ChangeClass::New => s.new += 1,
                ChangeClass::Lost => s.lost += 1,
            }
        }
        s
    }

    /// Binary mask of newly occupied cells only.
    pub fn growth_mask(&self) -> Vec<u8> {
        self.classes
            .iter()
            .map(|&c| if c == ChangeClass::New { OCCUPIED } else { VACANT })
            .collect()
    }

    pub fn has_growth(&self) -> bool {
        self.classes.contains(&ChangeClass::New)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classes_cover_all_transitions() {
        let before = OccupancyGrid::from_rows(&[&[0, 1], &[1, 0]]).unwrap();
        let after = OccupancyGrid::from_rows(&[&[1, 1], &[0, 0]]).unwrap();
        let map = ChangeMap::between(&before, &after).unwrap();
        assert_eq!(map.get(0, 0), ChangeClass::New);
        assert_eq!(map.get(0, 1), ChangeClass::Retained);
        assert_eq!(map.get(1, 0), ChangeClass::Lost);
        assert_eq!(map.get(1, 1), ChangeClass::Empty);
        assert_eq!(map.summary(), ChangeSummary { empty: 1, retained: 1, new: 1, lost: 1 });
        assert_eq!(map.growth_mask(), vec![1, 0, 0, 0]);
    }

    #[test]
    fn identical_grids_have_no_growth() {
        let g = OccupancyGrid::from_rows(&[&[0, 1, 1]]).unwrap();
        let map = ChangeMap::between(&g, &g).unwrap();
        assert!(!map.has_growth());
        assert_eq!(map.summary().retained, 2);
    }

    #[test]
    fn shape_mismatch_rejected() {
        let a = OccupancyGrid::vacant(2, 2);
        let b = OccupancyGrid::vacant(2, 3);
        assert!(ChangeMap::between(&a, &b).is_err());
    }
}
