//! Vector I/O
//!
//! Contour layers are exchanged as GeoJSON FeatureCollections. Coordinates
//! are taken as-is: any reprojection happens before they reach this crate.

mod geojson;

pub use self::geojson::{parse_geojson, read_geojson, to_geojson_string, write_geojson};
