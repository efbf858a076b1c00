pub mod area;
pub mod change;
mod hamming;

pub use area::{area_trend, layer_area_hectares, occupied_hectares, AreaSample};
pub use change::{ChangeClass, ChangeMap, ChangeSummary};
pub use hamming::hamming_distance;
