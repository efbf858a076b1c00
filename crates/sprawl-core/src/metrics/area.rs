//! Built-up area per year.
use serde::{Deserialize, Serialize};

use crate::grid::OccupancyGrid;
use crate::raster::VectorLayer;
use crate::yearly::YearlyGridSet;

const M2_PER_HECTARE: f64 = 10_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AreaSample {
    pub year: i32,
    pub occupied_cells: usize,
    pub hectares: f64,
}

/// Built-up area of a grid, assuming metre-based projected coordinates.
pub fn occupied_hectares(grid: &OccupancyGrid) -> f64 {
    grid.occupied_area() / M2_PER_HECTARE
}

/// Polygon area of a layer in hectares, measured on the geometry rather
/// than the raster. Pass a prepared layer to get built-up area only.
pub fn layer_area_hectares(layer: &VectorLayer) -> f64 {
    layer.area() / M2_PER_HECTARE
}

/// One sample per year, ascending.
pub fn area_trend(set: &YearlyGridSet) -> Vec<AreaSample> {
    set.iter()
        .map(|(year, g)| AreaSample {
            year,
            occupied_cells: g.occupied_count(),
            hectares: occupied_hectares(g),
        })
        .collect()
}
