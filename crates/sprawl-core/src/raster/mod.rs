//! Vector → raster preprocessing: layers are checked, filtered to the
//! built-up category, repaired, then burned onto one shared grid.
pub mod geojson;
pub mod layer;
pub mod polygon;
pub mod rasterize;

pub use geojson::parse_layer;
pub use layer::{Feature, VectorLayer};
pub use polygon::Polygon;
pub use rasterize::{common_bounds, rasterize, rasterize_years, ManifestYear, RasterManifest, RasterRun};
