//! Planar polygons with holes: area, bounds, centre-point containment and repair.
use serde::{Deserialize, Serialize};

use crate::extent::Extent;

/// Rings smaller than this (squared units) are treated as collapsed.
const MIN_RING_AREA: f64 = 1e-9;

pub type Point = [f64; 2];

/// A polygon with one exterior ring and zero or more holes.
/// Rings are stored open: the closing vertex is not repeated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub exterior: Vec<Point>,
    #[serde(default)]
    pub holes: Vec<Vec<Point>>,
}

impl Polygon {
    pub fn new(exterior: Vec<Point>, holes: Vec<Vec<Point>>) -> Self {
        Self { exterior, holes }
    }

    /// Axis-aligned rectangle, handy for tests and synthetic layers.
    pub fn rect(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self::new(vec![[xmin, ymin], [xmax, ymin], [xmax, ymax], [xmin, ymax]], Vec::new())
    }

    /// Exterior area minus hole area.
    pub fn area(&self) -> f64 {
        let holes: f64 = self.holes.iter().map(|h| ring_signed_area(h).abs()).sum();
        (ring_signed_area(&self.exterior).abs() - holes).max(0.0)
    }

    pub fn extent(&self) -> Option<Extent> {
        let (first, rest) = self.exterior.split_first()?;
        let mut e = Extent::new(first[0], first[1], first[0], first[1]);
        for p in rest {
            e.include_point(p[0], p[1]);
        }
        Some(e)
    }

    /// Even-odd containment: inside the exterior and outside every hole.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        ring_contains(&self.exterior, x, y) && !self.holes.iter().any(|h| ring_contains(h, x, y))
    }

    /// Clean the rings; `None` if the exterior collapses.
    /// Collapsed holes are dropped, the polygon survives.
    pub fn repaired(&self) -> Option<Polygon> {
        let exterior = clean_ring(&self.exterior)?;
        let holes = self.holes.iter().filter_map(|h| clean_ring(h)).collect();
        let p = Polygon { exterior, holes };
        (p.area() > MIN_RING_AREA).then_some(p)
    }
}

/// Shoelace area; positive for counter-clockwise rings.
pub fn ring_signed_area(ring: &[Point]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..ring.len() {
        let [x0, y0] = ring[i];
        let [x1, y1] = ring[(i + 1) % ring.len()];
        sum += x0 * y1 - x1 * y0;
    }
    sum * 0.5
}

/// Crossing-number test; works for open or closed rings.
pub fn ring_contains(ring: &[Point], x: f64, y: f64) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let [xi, yi] = ring[i];
        let [xj, yj] = ring[j];
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Drop non-finite vertices, consecutive duplicates and the closing vertex.
fn clean_ring(ring: &[Point]) -> Option<Vec<Point>> {
    let mut out: Vec<Point> = Vec::with_capacity(ring.len());
    for &p in ring {
        if !(p[0].is_finite() && p[1].is_finite()) {
            continue;
        }
        if out.last() != Some(&p) {
            out.push(p);
        }
    }
    while out.len() > 1 && out.first() == out.last() {
        out.pop();
    }
    (out.len() >= 3 && ring_signed_area(&out).abs() > MIN_RING_AREA).then_some(out)
}
