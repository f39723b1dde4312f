//! GeoJSON ingestion.
//!
//! Converts a `FeatureCollection` of polygon / multi-polygon boundaries into
//! [`Feature`]s, preserving document order so feature positions match the
//! source. Features without a supported geometry are kept with an empty
//! geometry (they can still be searched by name but never located).

use crate::error::{Error, Result};
use crate::types::{Feature, Geometry};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use geojson::{GeoJson, JsonObject, Value};
use std::path::Path;

/// Parses a GeoJSON document holding a `FeatureCollection` or a single `Feature`.
///
/// ```
/// let json = r#"{
///   "type": "FeatureCollection",
///   "features": [{
///     "type": "Feature",
///     "properties": { "NAME_1": "Kigali City", "ID_1": 1 },
///     "geometry": {
///       "type": "Polygon",
///       "coordinates": [[[30.0, -2.0], [30.1, -2.0], [30.1, -1.9], [30.0, -2.0]]]
///     }
///   }]
/// }"#;
///
/// let features = imbibi::loader::features_from_geojson_str(json).unwrap();
/// assert_eq!(features.len(), 1);
/// assert_eq!(features[0].attribute("ID_1"), "1");
/// ```
pub fn features_from_geojson_str(json: &str) -> Result<Vec<Feature>> {
    let geojson: GeoJson = json.parse()?;
    features_from_geojson(geojson)
}

/// Reads and parses a GeoJSON file.
pub fn features_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Feature>> {
    let path = path.as_ref();
    log::debug!("loading boundaries from {}", path.display());
    let json = std::fs::read_to_string(path)?;
    features_from_geojson_str(&json)
}

/// Converts an already parsed GeoJSON document.
pub fn features_from_geojson(geojson: GeoJson) -> Result<Vec<Feature>> {
    let features = match geojson {
        GeoJson::FeatureCollection(collection) => collection.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(_) => {
            return Err(Error::InvalidGeoJson(
                "expected a Feature or FeatureCollection, found a bare Geometry".into(),
            ))
        }
    };

    features
        .into_iter()
        .enumerate()
        .map(|(position, feature)| {
            let geometry = match feature.geometry {
                Some(geometry) => convert_geometry(position, geometry.value)?,
                None => {
                    log::warn!("feature {position} has no geometry");
                    Geometry::empty()
                }
            };
            Ok(Feature::new(geometry, properties(feature.properties)))
        })
        .collect()
}

fn convert_geometry(position: usize, value: Value) -> Result<Geometry> {
    match value {
        Value::Polygon(rings) => Ok(Geometry::Polygon(convert_polygon(position, rings)?)),
        Value::MultiPolygon(polygons) => {
            let polygons = polygons
                .into_iter()
                .map(|rings| convert_polygon(position, rings))
                .collect::<Result<Vec<_>>>()?;
            Ok(Geometry::MultiPolygon(MultiPolygon::new(polygons)))
        }
        other => {
            log::warn!(
                "feature {position}: unsupported geometry type {}, indexing by name only",
                type_name(&other)
            );
            Ok(Geometry::empty())
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}

fn convert_polygon(position: usize, rings: Vec<Vec<Vec<f64>>>) -> Result<Polygon<f64>> {
    let mut rings = rings
        .into_iter()
        .map(|ring| convert_ring(position, ring))
        .collect::<Result<Vec<_>>>()?
        .into_iter();
    let exterior = rings.next().unwrap_or_else(|| LineString::new(Vec::new()));
    Ok(Polygon::new(exterior, rings.collect()))
}

fn convert_ring(position: usize, ring: Vec<Vec<f64>>) -> Result<LineString<f64>> {
    ring.into_iter()
        .map(|coords| match coords.as_slice() {
            [x, y, ..] => Ok(Coord { x: *x, y: *y }),
            _ => Err(Error::InvalidGeoJson(format!(
                "feature {position}: position must have at least 2 values"
            ))),
        })
        .collect::<Result<Vec<_>>>()
        .map(LineString::new)
}

fn properties(properties: Option<JsonObject>) -> Vec<(String, String)> {
    properties
        .into_iter()
        .flatten()
        .filter_map(|(key, value)| {
            let value = match value {
                serde_json::Value::Null => return None,
                serde_json::Value::String(text) => text,
                other => other.to_string(),
            };
            Some((key, value))
        })
        .collect()
}
