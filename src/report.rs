//! Report export: JSON for tabular views, GeoJSON for the choropleth frame.

use crate::data::{canonical_name, county_key, CountyKey, JoinedMapFrame};
use anyhow::{Context, Result};
use geojson::{Feature, FeatureCollection, GeoJson};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Build a FeatureCollection with `County`, `Value` and `CountyCode`
/// properties. Missing values are written as JSON null.
pub fn map_to_geojson(frame: &JoinedMapFrame<'_>) -> GeoJson {
    let features: Vec<Feature> = frame
        .rows
        .iter()
        .map(|row| {
            let mut feature = Feature {
                bbox: None,
                geometry: Some(geojson::Geometry::new(geojson::Value::from(
                    &row.geometry.boundary,
                ))),
                id: None,
                properties: None,
                foreign_members: None,
            };
            feature.set_property("County", row.geometry.county.clone());
            feature.set_property("Value", row.value);
            match county_key(&row.geometry.county) {
                CountyKey::Code(code) => {
                    feature.set_property("CountyCode", code);
                    feature.set_property("CanonicalName", canonical_name(code));
                }
                CountyKey::Name(_) => {
                    feature.set_property("CountyCode", serde_json::Value::Null);
                }
            }
            feature
        })
        .collect();

    let mut collection: FeatureCollection = features.into_iter().collect();
    let mut members = serde_json::Map::new();
    members.insert("indicator".to_string(), frame.indicator.clone().into());
    members.insert("date".to_string(), frame.date.into());
    collection.foreign_members = Some(members);

    GeoJson::from(collection)
}

/// Write the map frame as GeoJSON.
pub fn write_geojson(path: &Path, frame: &JoinedMapFrame<'_>) -> Result<()> {
    fs::write(path, map_to_geojson(frame).to_string())
        .with_context(|| format!("Failed to write GeoJSON: {:?}", path))
}

/// Serialize any view as pretty JSON.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize view")
}

/// Write any view as pretty JSON.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    fs::write(path, to_json(value)?).with_context(|| format!("Failed to write JSON: {:?}", path))
}
