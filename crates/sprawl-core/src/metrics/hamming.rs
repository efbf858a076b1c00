use crate::error::GrowthError;
use crate::grid::OccupancyGrid;

/// Number of cells whose values differ, i.e. Σ|a − b| over binary grids.
pub fn hamming_distance(a: &OccupancyGrid, b: &OccupancyGrid) -> Result<u64, GrowthError> {
    a.ensure_same_shape(b)?;
    Ok(a.data.iter().zip(&b.data).filter(|(x, y)| x != y).count() as u64)
}
