//! Vector layers: category filtering, CRS checks and geometry repair.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::config::RasterOptions;
use crate::error::RasterError;
use crate::extent::Extent;

use super::polygon::Polygon;

/// Geographic CRS identifiers the rasterizer refuses; cell sizes need projected units.
const GEOGRAPHIC_EPSG: [u32; 5] = [4326, 4269, 4258, 4267, 4283];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub properties: Map<String, Value>,
    pub polygons: Vec<Polygon>,
}

impl Feature {
    /// Attribute value as text, the way a table column cast to string reads.
    pub fn attribute_text(&self, key: &str) -> Option<String> {
        match self.properties.get(key)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    pub fn area(&self) -> f64 {
        self.polygons.iter().map(Polygon::area).sum()
    }
}

/// One year's polygon layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VectorLayer {
    /// CRS identifier such as `EPSG:32751` or an OGC URN.
    pub crs: Option<String>,
    pub features: Vec<Feature>,
}

impl VectorLayer {
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Bounds of every polygon exterior, or `None` for a layer without geometry.
    pub fn extent(&self) -> Option<Extent> {
        let extents: Vec<Extent> = self
            .features
            .iter()
            .flat_map(|f| f.polygons.iter().filter_map(Polygon::extent))
            .collect();
        Extent::common(&extents)
    }

    /// Total polygon area in squared projected units.
    pub fn area(&self) -> f64 {
        self.features.iter().map(Feature::area).sum()
    }

    /// Reject layers without a projected CRS. `opts.default_crs` fills in a missing one.
    pub fn check_crs(&self, opts: &RasterOptions) -> Result<(), RasterError> {
        let crs = match self.crs.as_deref().or(opts.default_crs.as_deref()) {
            Some(c) => c,
            None if opts.require_crs => return Err(RasterError::MissingCrs),
            None => return Ok(()),
        };
        if is_geographic(crs) {
            return Err(RasterError::GeographicCrs(crs.to_string()));
        }
        Ok(())
    }

    /// Keep features whose category attribute equals the built-up category,
    /// compared case-insensitively after trimming.
    pub fn filter_built_up(&self, opts: &RasterOptions) -> Result<VectorLayer, RasterError> {
        let wanted = opts.built_up_category.trim().to_lowercase();
        let mut seen_attribute = false;
        let features: Vec<Feature> = self
            .features
            .iter()
            .filter(|f| match f.attribute_text(&opts.category_attribute) {
                Some(v) => {
                    seen_attribute = true;
                    v.trim().to_lowercase() == wanted
                }
                None => false,
            })
            .cloned()
            .collect();

        if !self.features.is_empty() && !seen_attribute {
            return Err(RasterError::MissingAttribute(opts.category_attribute.clone()));
        }
        if features.is_empty() {
            return Err(RasterError::NoBuiltUpFeatures);
        }
        Ok(VectorLayer { crs: self.crs.clone(), features })
    }

    /// Repair every polygon and drop features left without geometry.
    pub fn repaired(&self) -> Result<VectorLayer, RasterError> {
        let mut dropped = 0usize;
        let features: Vec<Feature> = self
            .features
            .iter()
            .filter_map(|f| {
                let polygons: Vec<Polygon> = f.polygons.iter().filter_map(Polygon::repaired).collect();
                dropped += f.polygons.len() - polygons.len();
                (!polygons.is_empty()).then(|| Feature { properties: f.properties.clone(), polygons })
            })
            .collect();

        if dropped > 0 {
            warn!(dropped, "invalid or empty polygons removed during repair");
        }
        if features.is_empty() {
            return Err(RasterError::NoValidGeometry);
        }
        Ok(VectorLayer { crs: self.crs.clone(), features })
    }

    /// CRS check, category filter, then geometry repair.
    pub fn prepare(&self, opts: &RasterOptions) -> Result<VectorLayer, RasterError> {
        self.check_crs(opts)?;
        self.filter_built_up(opts)?.repaired()
    }
}

fn is_geographic(crs: &str) -> bool {
    let upper = crs.to_uppercase();
    if upper.ends_with("CRS84") {
        return true;
    }
    let digits: String = upper
        .chars()
        .rev()
        .take_while(char::is_ascii_digit)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    digits.parse::<u32>().map_or(false, |code| GEOGRAPHIC_EPSG.contains(&code))
}
