//! GeoJSON reading/writing for feature collections
//!
//! Parsing and geometry conversion go through the `geojson` crate; this
//! module only maps its features onto [`Feature`] and [`AttributeValue`].
//! A feature whose geometry cannot be converted is kept with
//! `geometry: None` so the caller decides whether to skip it.

use crate::error::{Error, Result};
use crate::vector::{AttributeValue, Feature, FeatureCollection};
use geo_types::Geometry;
use geojson::feature::Id;
use geojson::{GeoJson, JsonObject, JsonValue, Value};
use std::fs;
use std::path::Path;
use tracing::warn;

/// Read a GeoJSON FeatureCollection from disk
pub fn read_geojson<P: AsRef<Path>>(path: P) -> Result<FeatureCollection> {
    let text = fs::read_to_string(path.as_ref())?;
    parse_geojson(&text)
}

/// Parse a GeoJSON FeatureCollection from a string
pub fn parse_geojson(text: &str) -> Result<FeatureCollection> {
    let collection = match text.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(fc) => fc,
        GeoJson::Feature(_) => {
            return Err(Error::InvalidGeometry(
                "expected a FeatureCollection, found a Feature".into(),
            ))
        }
        GeoJson::Geometry(_) => {
            return Err(Error::InvalidGeometry(
                "expected a FeatureCollection, found a Geometry".into(),
            ))
        }
    };

    let features = collection
        .features
        .into_iter()
        .enumerate()
        .map(|(i, f)| {
            let geometry = f.geometry.and_then(|g| match to_geo(g) {
                Ok(geom) => Some(geom),
                Err(e) => {
                    warn!("feature {}: unreadable geometry ({})", i, e);
                    None
                }
            });

            let properties = f
                .properties
                .unwrap_or_default()
                .into_iter()
                .map(|(k, v)| (k, attribute_from_json(v)))
                .collect();

            let id = f.id.map(|id| match id {
                Id::String(s) => s,
                Id::Number(n) => n.to_string(),
            });

            Feature { geometry, properties, id }
        })
        .collect();

    Ok(FeatureCollection { features })
}

/// Serialize a feature collection as GeoJSON text
pub fn to_geojson_string(collection: &FeatureCollection) -> Result<String> {
    let features = collection
        .iter()
        .map(|f| {
            let properties = f
                .properties
                .iter()
                .map(|(k, v)| Ok((k.clone(), serde_json::to_value(v)?)))
                .collect::<Result<JsonObject>>()?;
            Ok(geojson::Feature {
                bbox: None,
                geometry: f.geometry.as_ref().map(|g| geojson::Geometry::new(Value::from(g))),
                id: f.id.clone().map(Id::String),
                properties: Some(properties),
                foreign_members: None,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let doc = geojson::FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}

/// Write a feature collection to disk as GeoJSON
pub fn write_geojson<P: AsRef<Path>>(path: P, collection: &FeatureCollection) -> Result<()> {
    let text = to_geojson_string(collection)?;
    fs::write(path.as_ref(), text)?;
    Ok(())
}

fn attribute_from_json(value: JsonValue) -> AttributeValue {
    match value {
        JsonValue::Null => AttributeValue::Null,
        JsonValue::Bool(b) => AttributeValue::Bool(b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => AttributeValue::Int(i),
            None => n.as_f64().map(AttributeValue::Float).unwrap_or(AttributeValue::Null),
        },
        JsonValue::String(s) => AttributeValue::String(s),
        other => AttributeValue::String(other.to_string()),
    }
}

/// Every position carries at least x and y
fn positions_complete(value: &Value) -> bool {
    fn complete(p: &[f64]) -> bool {
        p.len() >= 2
    }
    match value {
        Value::Point(p) => complete(p),
        Value::MultiPoint(ps) | Value::LineString(ps) => ps.iter().all(|p| complete(p)),
        Value::MultiLineString(ls) | Value::Polygon(ls) => ls.iter().flatten().all(|p| complete(p)),
        Value::MultiPolygon(polys) => polys.iter().flatten().flatten().all(|p| complete(p)),
        Value::GeometryCollection(gs) => gs.iter().all(|g| positions_complete(&g.value)),
    }
}

fn to_geo(geometry: geojson::Geometry) -> Result<Geometry<f64>> {
    if !positions_complete(&geometry.value) {
        return Err(Error::InvalidGeometry("position needs 2 ordinates".into()));
    }
    Ok(Geometry::<f64>::try_from(geometry)?)
}
