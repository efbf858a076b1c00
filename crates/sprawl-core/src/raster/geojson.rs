//! GeoJSON `FeatureCollection` input for polygon layers.
//!
//! Only `Polygon` and `MultiPolygon` geometries are burned. Features with a
//! null or non-areal geometry are kept with no polygons and disappear at
//! repair time; a layer with no areal geometry at all is rejected.
//! The legacy `crs` member (`{"type":"name","properties":{"name":…}}`) is
//! read when present.

use serde::de::Error as _;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::RasterError;

use super::layer::{Feature, VectorLayer};
use super::polygon::{Point, Polygon};

#[derive(Deserialize)]
struct CollectionDoc {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    crs: Option<CrsDoc>,
    #[serde(default)]
    features: Vec<FeatureDoc>,
}

#[derive(Deserialize)]
struct CrsDoc {
    properties: CrsProperties,
}

#[derive(Deserialize)]
struct CrsProperties {
    name: String,
}

#[derive(Deserialize)]
struct FeatureDoc {
    #[serde(default)]
    properties: Option<Map<String, Value>>,
    #[serde(default)]
    geometry: Option<GeometryDoc>,
}

#[derive(Deserialize)]
struct GeometryDoc {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: Value,
}

/// Positions may carry a third (z) ordinate; only x and y are kept.
type RawRing = Vec<Vec<f64>>;

pub fn parse_layer(text: &str) -> Result<VectorLayer, RasterError> {
    let doc: CollectionDoc = serde_json::from_str(text)?;
    if doc.kind != "FeatureCollection" {
        return Err(RasterError::Json(serde_json::Error::custom(format!(
            "expected a FeatureCollection, got '{}'",
            doc.kind
        ))));
    }

    let mut features = Vec::with_capacity(doc.features.len());
    let mut skipped: Vec<String> = Vec::new();
    let mut areal = 0usize;
    for f in doc.features {
        let polygons = match f.geometry {
            Some(g) => match convert_geometry(&g)? {
                Some(polygons) => {
                    areal += 1;
                    polygons
                }
                None => {
                    skipped.push(g.kind);
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
        features.push(Feature { properties: f.properties.unwrap_or_default(), polygons });
    }

    if let Some(kind) = skipped.first() {
        if areal == 0 {
            return Err(RasterError::UnsupportedGeometry(kind.clone()));
        }
        warn!(skipped = skipped.len(), first = %kind, "non-polygon geometries skipped");
    }

    Ok(VectorLayer { crs: doc.crs.map(|c| c.properties.name), features })
}

/// `None` for geometry types that carry no area.
fn convert_geometry(g: &GeometryDoc) -> Result<Option<Vec<Polygon>>, RasterError> {
    match g.kind.as_str() {
        "Polygon" => {
            let rings: Vec<RawRing> = serde_json::from_value(g.coordinates.clone())?;
            Ok(Some(polygon_from_rings(rings).into_iter().collect()))
        }
        "MultiPolygon" => {
            let parts: Vec<Vec<RawRing>> = serde_json::from_value(g.coordinates.clone())?;
            Ok(Some(parts.into_iter().filter_map(polygon_from_rings).collect()))
        }
        _ => Ok(None),
    }
}

fn polygon_from_rings(rings: Vec<RawRing>) -> Option<Polygon> {
    let mut rings = rings.into_iter().map(to_points);
    let exterior = rings.next()?;
    Some(Polygon::new(exterior, rings.collect()))
}

fn to_points(ring: RawRing) -> Vec<Point> {
    ring.into_iter()
        .filter(|p| p.len() >= 2)
        .map(|p| [p[0], p[1]])
        .collect()
}
