use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::GrowthError;
use crate::extent::{Extent, GeoRef};

/// Cell value for built-up land.
pub const OCCUPIED: u8 = 1;
/// Cell value for land that is not built up.
pub const VACANT: u8 = 0;

/// A 2D binary occupancy raster, row-major, row 0 at the north edge.
/// Every cell holds either [`VACANT`] or [`OCCUPIED`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupancyGrid {
    /// Row-major cell values.
    pub data: Vec<u8>,
    pub width: usize,
    pub height: usize,
    pub georef: GeoRef,
}

impl OccupancyGrid {
    /// Create an all-vacant grid on the given transform.
    pub fn empty(width: usize, height: usize, georef: GeoRef) -> Self {
        Self { data: vec![VACANT; width * height], width, height, georef }
    }

    /// All-vacant grid on a unit transform; for synthetic and test grids.
    pub fn vacant(width: usize, height: usize) -> Self {
        Self::empty(width, height, GeoRef::unit(height))
    }

    /// Build from row-major cells, validating length and binary values.
    pub fn from_cells(
        data: Vec<u8>,
        width: usize,
        height: usize,
        georef: GeoRef,
    ) -> Result<Self, GrowthError> {
        let grid = Self { data, width, height, georef };
        grid.validate()?;
        Ok(grid)
    }

    /// Build from nested rows on a unit transform. Rows must be equally long.
    pub fn from_rows(rows: &[&[u8]]) -> Result<Self, GrowthError> {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.len());
        if let Some(bad) = rows.iter().find(|r| r.len() != width) {
            return Err(GrowthError::InvalidGrid {
                reason: format!("ragged rows: {} vs {width} columns", bad.len()),
            });
        }
        let data = rows.iter().flat_map(|r| r.iter().copied()).collect();
        Self::from_cells(data, width, height, GeoRef::unit(height))
    }

    /// Re-check every invariant, e.g. after deserializing a snapshot:
    /// cell count matches the shape, cells are binary, the transform is usable.
    pub fn validate(&self) -> Result<(), GrowthError> {
        let invalid = |reason: String| Err(GrowthError::InvalidGrid { reason });
        if self.width.checked_mul(self.height) != Some(self.data.len()) {
            return invalid(format!("{} cells for a {}x{} grid", self.data.len(), self.width, self.height));
        }
        let g = &self.georef;
        if !(g.cell_size.is_finite() && g.cell_size > 0.0) {
            return invalid(format!("cell size {} must be positive", g.cell_size));
        }
        if !(g.origin_x.is_finite() && g.origin_y.is_finite()) {
            return invalid(format!("non-finite origin ({}, {})", g.origin_x, g.origin_y));
        }
        match self.data.iter().find(|&&v| v > OCCUPIED) {
            Some(v) => invalid(format!("non-binary cell value {v}")),
            None => Ok(()),
        }
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.data[row * self.width + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, val: u8) {
        self.data[row * self.width + col] = val;
    }

    #[inline]
    pub fn is_occupied(&self, row: usize, col: usize) -> bool {
        self.get(row, col) == OCCUPIED
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// `(height, width)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    pub fn same_shape(&self, other: &OccupancyGrid) -> bool {
        self.shape() == other.shape()
    }

    /// Fails with [`GrowthError::ShapeMismatch`] unless both grids have identical dimensions.
    pub fn ensure_same_shape(&self, other: &OccupancyGrid) -> Result<(), GrowthError> {
        if self.same_shape(other) {
            Ok(())
        } else {
            Err(GrowthError::ShapeMismatch { expected: self.shape(), found: other.shape() })
        }
    }

    pub fn occupied_count(&self) -> usize {
        self.data.iter().filter(|&&v| v == OCCUPIED).count()
    }

    /// Built-up area in squared projected units.
    pub fn occupied_area(&self) -> f64 {
        self.occupied_count() as f64 * self.georef.cell_area()
    }

    /// Real-world bounds of the raster.
    pub fn world_extent(&self) -> Extent {
        self.georef.grid_extent(self.width, self.height)
    }

    /// True if every occupied cell of `self` is also occupied in `other`.
    pub fn is_subset_of(&self, other: &OccupancyGrid) -> bool {
        self.same_shape(other)
            && self.data.iter().zip(&other.data).all(|(&a, &b)| a == VACANT || b == OCCUPIED)
    }

    /// Content hash over dimensions and cells. Not a proof of equality.
    pub fn fingerprint(&self) -> u64 {
        let mut h = DefaultHasher::new();
        self.width.hash(&mut h);
        self.height.hash(&mut h);
        self.data.hash(&mut h);
        h.finish()
    }
}
