//! Polygon → occupancy grid burn-in over shared bounds.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::RasterOptions;
use crate::error::RasterError;
use crate::extent::{Extent, GeoRef};
use crate::grid::{OccupancyGrid, OCCUPIED};
use crate::metrics::layer_area_hectares;
use crate::yearly::YearlyGridSet;

use super::layer::VectorLayer;
use super::polygon::Polygon;

/// Common bounds over every layer that has geometry.
pub fn common_bounds<'a, I>(layers: I) -> Result<Extent, RasterError>
where
    I: IntoIterator<Item = &'a VectorLayer>,
{
    let extents: Vec<Extent> = layers.into_iter().filter_map(VectorLayer::extent).collect();
    Extent::common(&extents).ok_or(RasterError::EmptyLayerSet)
}

/// Burn an already prepared layer into a grid covering `bounds`.
///
/// Grid origin is the (xmin, ymax) corner; partial cells at the east and
/// south edges are truncated. A cell is occupied when its centre lies inside
/// any polygon.
pub fn rasterize(layer: &VectorLayer, bounds: &Extent, resolution: f64) -> Result<OccupancyGrid, RasterError> {
    if !(resolution.is_finite() && resolution > 0.0) {
        return Err(RasterError::InvalidResolution(resolution));
    }
    let (rows, cols) = GeoRef::dims_for(bounds, resolution);
    if rows <= 0 || cols <= 0 {
        return Err(RasterError::DegenerateExtent { width: cols, height: rows });
    }

    let georef = GeoRef::from_origin(bounds, resolution);
    let mut grid = OccupancyGrid::empty(cols as usize, rows as usize, georef);
    for polygon in layer.features.iter().flat_map(|f| &f.polygons) {
        burn_polygon(&mut grid, polygon);
    }
    Ok(grid)
}

fn burn_polygon(grid: &mut OccupancyGrid, polygon: &Polygon) {
    let Some(bbox) = polygon.extent() else { return };
    let g = grid.georef;

    // Cells whose centres fall inside the polygon's bounding box.
    let col_lo = ((bbox.xmin - g.origin_x) / g.cell_size - 0.5).ceil().max(0.0) as i64;
    let col_hi = (((bbox.xmax - g.origin_x) / g.cell_size - 0.5).floor() as i64).min(grid.width as i64 - 1);
    let row_lo = ((g.origin_y - bbox.ymax) / g.cell_size - 0.5).ceil().max(0.0) as i64;
    let row_hi = (((g.origin_y - bbox.ymin) / g.cell_size - 0.5).floor() as i64).min(grid.height as i64 - 1);
    if col_hi < col_lo || row_hi < row_lo {
        return;
    }

    for r in row_lo as usize..=row_hi as usize {
        for c in col_lo as usize..=col_hi as usize {
            let (x, y) = g.cell_center(r, c);
            if polygon.contains(x, y) {
                grid.set(r, c, OCCUPIED);
            }
        }
    }
}

/// Outcome of rasterizing a multi-year collection.
#[derive(Debug)]
pub struct RasterRun {
    pub bounds: Extent,
    pub grids: YearlyGridSet,
    /// Years that could not be rasterized, with the reason.
    pub failures: Vec<(i32, RasterError)>,
    /// Built-up polygon area per successfully rasterized year, hectares.
    pub polygon_hectares: BTreeMap<i32, f64>,
}

/// Rasterize every year onto bounds shared by all layers.
///
/// Common bounds come from the full layers as loaded, before category
/// filtering, so every year lands on the same grid. A year that fails is
/// recorded in `failures` and the remaining years still run.
pub fn rasterize_years(layers: &BTreeMap<i32, VectorLayer>, opts: &RasterOptions) -> Result<RasterRun, RasterError> {
    let bounds = common_bounds(layers.values())?;
    info!(
        xmin = bounds.xmin,
        ymin = bounds.ymin,
        xmax = bounds.xmax,
        ymax = bounds.ymax,
        "common bounds"
    );

    let mut grids = YearlyGridSet::new();
    let mut failures = Vec::new();
    let mut polygon_hectares = BTreeMap::new();
    for (&year, layer) in layers {
        let prepared = match layer.prepare(opts) {
            Ok(p) => p,
            Err(e) => {
                warn!(year, error = %e, "layer skipped");
                failures.push((year, e));
                continue;
            }
        };
        match rasterize(&prepared, &bounds, opts.resolution) {
            Ok(grid) => {
                info!(year, occupied = grid.occupied_count(), "rasterized");
                grids.insert(year, grid)?;
                polygon_hectares.insert(year, layer_area_hectares(&prepared));
            }
            Err(e) => {
                warn!(year, error = %e, "rasterization failed");
                failures.push((year, e));
            }
        }
    }
    Ok(RasterRun { bounds, grids, failures, polygon_hectares })
}

/// Grid-side summary written next to the snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterManifest {
    pub bounds: Extent,
    pub resolution: f64,
    pub width: usize,
    pub height: usize,
    pub years: Vec<ManifestYear>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestYear {
    pub year: i32,
    pub occupied_cells: usize,
    pub polygon_hectares: f64,
}

impl RasterRun {
    pub fn manifest(&self, resolution: f64) -> RasterManifest {
        let (rows, cols) = GeoRef::dims_for(&self.bounds, resolution);
        let years = self
            .grids
            .iter()
            .map(|(year, g)| ManifestYear {
                year,
                occupied_cells: g.occupied_count(),
                polygon_hectares: self.polygon_hectares.get(&year).copied().unwrap_or(0.0),
            })
            .collect();
        RasterManifest {
            bounds: self.bounds,
            resolution,
            width: cols.max(0) as usize,
            height: rows.max(0) as usize,
            years,
        }
    }
}
