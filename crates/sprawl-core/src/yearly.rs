use std::collections::BTreeMap;

use crate::error::GrowthError;
use crate::grid::OccupancyGrid;

/// Occupancy grids keyed by year, all sharing one shape and one transform.
///
/// The common-bounds invariant is enforced on insert: the first grid fixes
/// the shape and [`GeoRef`](crate::extent::GeoRef), every later grid must
/// match both.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct YearlyGridSet {
    grids: BTreeMap<i32, OccupancyGrid>,
}

impl YearlyGridSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the grid for `year`.
    pub fn insert(&mut self, year: i32, grid: OccupancyGrid) -> Result<(), GrowthError> {
        if let Some(reference) = self.grids.values().next() {
            reference.ensure_same_shape(&grid)?;
            if reference.georef != grid.georef {
                return Err(GrowthError::GeoRefMismatch { year });
            }
        }
        self.grids.insert(year, grid);
        Ok(())
    }

    pub fn from_grids<I>(grids: I) -> Result<Self, GrowthError>
    where
        I: IntoIterator<Item = (i32, OccupancyGrid)>,
    {
        let mut set = Self::new();
        for (year, grid) in grids {
            set.insert(year, grid)?;
        }
        Ok(set)
    }

    pub fn get(&self, year: i32) -> Option<&OccupancyGrid> {
        self.grids.get(&year)
    }

    /// Like [`get`](Self::get) but a missing year is an error.
    pub fn require(&self, year: i32) -> Result<&OccupancyGrid, GrowthError> {
        self.grids.get(&year).ok_or(GrowthError::MissingData { year })
    }

    pub fn contains(&self, year: i32) -> bool {
        self.grids.contains_key(&year)
    }

    /// Years in ascending order.
    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.grids.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, &OccupancyGrid)> + '_ {
        self.grids.iter().map(|(&y, g)| (y, g))
    }

    pub fn first_year(&self) -> Option<i32> {
        self.grids.keys().next().copied()
    }

    pub fn last_year(&self) -> Option<i32> {
        self.grids.keys().next_back().copied()
    }

    pub fn len(&self) -> usize {
        self.grids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extent::{Extent, GeoRef};

    #[test]
    fn insert_rejects_mismatched_shape() {
        let mut set = YearlyGridSet::new();
        set.insert(2020, OccupancyGrid::vacant(4, 4)).unwrap();
        let err = set.insert(2021, OccupancyGrid::vacant(5, 4)).unwrap_err();
        assert!(matches!(err, GrowthError::ShapeMismatch { .. }));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn insert_rejects_different_bounds() {
        let mut set = YearlyGridSet::new();
        set.insert(2020, OccupancyGrid::vacant(4, 4)).unwrap();
        let shifted = GeoRef::from_origin(&Extent::new(100.0, 0.0, 500.0, 400.0), 100.0);
        let err = set.insert(2021, OccupancyGrid::empty(4, 4, shifted)).unwrap_err();
        assert_eq!(err, GrowthError::GeoRefMismatch { year: 2021 });
    }

    #[test]
    fn require_reports_missing_year() {
        let set = YearlyGridSet::from_grids([(2020, OccupancyGrid::vacant(2, 2))]).unwrap();
        assert!(set.require(2020).is_ok());
        assert_eq!(set.require(2024).unwrap_err(), GrowthError::MissingData { year: 2024 });
    }

    #[test]
    fn years_ascend_with_gaps() {
        let g = OccupancyGrid::vacant(2, 2);
        let set = YearlyGridSet::from_grids(
            [2020, 2021, 2023, 2024, 2025].map(|y| (y, g.clone())),
        )
        .unwrap();
        assert_eq!(set.years().collect::<Vec<_>>(), vec![2020, 2021, 2023, 2024, 2025]);
        assert_eq!(set.first_year(), Some(2020));
        assert_eq!(set.last_year(), Some(2025));
    }
}
