/// Planar extents and the north-up grid transform.
/// All coordinate math uses f64 in projected units (metres for UTM layers).

use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in projected coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl Extent {
    pub fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self { xmin, ymin, xmax, ymax }
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    /// Smallest extent covering both `self` and `other`.
    pub fn union(&self, other: &Extent) -> Extent {
        Extent {
            xmin: self.xmin.min(other.xmin),
            ymin: self.ymin.min(other.ymin),
            xmax: self.xmax.max(other.xmax),
            ymax: self.ymax.max(other.ymax),
        }
    }

    /// Common bounds: the union of every extent, or `None` when there are none.
    pub fn common<'a, I>(extents: I) -> Option<Extent>
    where
        I: IntoIterator<Item = &'a Extent>,
    {
        extents
            .into_iter()
            .fold(None, |acc: Option<Extent>, e| Some(acc.map_or(*e, |a| a.union(e))))
    }

    /// Grow to include a single point.
    pub fn include_point(&mut self, x: f64, y: f64) {
        self.xmin = self.xmin.min(x);
        self.ymin = self.ymin.min(y);
        self.xmax = self.xmax.max(x);
        self.ymax = self.ymax.max(y);
    }
}

/// North-up affine transform anchored at the top-left corner of the grid.
///
/// Row 0 is the northernmost row; column 0 the westernmost column. Cell
/// `(row, col)` spans
///   x ∈ [origin_x + col·cell, origin_x + (col+1)·cell]
///   y ∈ [origin_y − (row+1)·cell, origin_y − row·cell]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoRef {
    pub origin_x: f64,
    pub origin_y: f64,
    pub cell_size: f64,
}

impl GeoRef {
    /// Transform whose origin is the (xmin, ymax) corner of `extent`.
    pub fn from_origin(extent: &Extent, cell_size: f64) -> Self {
        Self { origin_x: extent.xmin, origin_y: extent.ymax, cell_size }
    }

    /// Unit-cell transform for synthetic grids with no real-world placement.
    pub fn unit(height: usize) -> Self {
        Self { origin_x: 0.0, origin_y: height as f64, cell_size: 1.0 }
    }

    /// Grid dimensions `(rows, cols)` covering `extent`, truncating partial cells.
    /// May be zero or negative for degenerate extents; callers decide.
    pub fn dims_for(extent: &Extent, cell_size: f64) -> (i64, i64) {
        let rows = (extent.height() / cell_size) as i64;
        let cols = (extent.width() / cell_size) as i64;
        (rows, cols)
    }

    pub fn cell_center(&self, row: usize, col: usize) -> (f64, f64) {
        (
            self.origin_x + (col as f64 + 0.5) * self.cell_size,
            self.origin_y - (row as f64 + 0.5) * self.cell_size,
        )
    }

    /// Real-world bounding box of a `width × height` grid on this transform.
    pub fn grid_extent(&self, width: usize, height: usize) -> Extent {
        Extent {
            xmin: self.origin_x,
            ymin: self.origin_y - height as f64 * self.cell_size,
            xmax: self.origin_x + width as f64 * self.cell_size,
            ymax: self.origin_y,
        }
    }

    /// Area of a single cell in squared projected units.
    pub fn cell_area(&self) -> f64 {
        self.cell_size * self.cell_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn common_bounds_is_union_of_all() {
        let a = Extent::new(0.0, 0.0, 10.0, 10.0);
        let b = Extent::new(-5.0, 2.0, 8.0, 20.0);
        let c = Extent::new(3.0, -1.0, 4.0, 1.0);
        let common = Extent::common([&a, &b, &c]).unwrap();
        assert_eq!(common, Extent::new(-5.0, -1.0, 10.0, 20.0));
    }

    #[test]
    fn common_bounds_of_nothing_is_none() {
        let none: [&Extent; 0] = [];
        assert!(Extent::common(none).is_none());
    }

    #[test]
    fn dims_truncate_partial_cells() {
        let e = Extent::new(0.0, 0.0, 1050.0, 299.0);
        assert_eq!(GeoRef::dims_for(&e, 100.0), (2, 10));
    }

    #[test]
    fn cell_center_is_north_up() {
        let e = Extent::new(1000.0, 2000.0, 1400.0, 2300.0);
        let g = GeoRef::from_origin(&e, 100.0);
        let (x, y) = g.cell_center(0, 0);
        assert_relative_eq!(x, 1050.0);
        assert_relative_eq!(y, 2250.0);
        let (x, y) = g.cell_center(2, 3);
        assert_relative_eq!(x, 1350.0);
        assert_relative_eq!(y, 2050.0);
    }

    #[test]
    fn grid_extent_covers_whole_cells() {
        let e = Extent::new(0.0, 0.0, 1050.0, 299.0);
        let g = GeoRef::from_origin(&e, 100.0);
        let (rows, cols) = GeoRef::dims_for(&e, 100.0);
        let ge = g.grid_extent(cols as usize, rows as usize);
        assert_relative_eq!(ge.xmax, 1000.0);
        assert_relative_eq!(ge.ymin, 99.0);
        assert_relative_eq!(ge.ymax, 299.0);
    }
}
