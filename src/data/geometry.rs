//! County Boundary Loader Module
//! Reads the county GeoJSON and normalizes its name field to `County`.

use super::counties::COUNTY_COUNT;
use super::normalize::title_case;
use geo::MultiPolygon;
use geojson::GeoJson;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Name property in the Kenya counties boundary file.
pub const DEFAULT_COUNTY_FIELD: &str = "COUNTY_NAM";

#[derive(Error, Debug)]
pub enum GeometryError {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Unexpected GeoJSON layout: {0}")]
    Schema(String),
    #[error("Failed to parse GeoJSON: {0}")]
    Parse(#[from] geojson::Error),
    #[error("Failed to read GeoJSON: {0}")]
    Io(#[from] std::io::Error),
}

/// One county boundary.
#[derive(Debug, Clone)]
pub struct CountyGeometry {
    pub county: String,
    pub boundary: MultiPolygon<f64>,
}

/// Loads county boundaries from GeoJSON.
pub struct GeometryLoader;

impl GeometryLoader {
    /// Load boundaries using the default `COUNTY_NAM` field.
    pub fn load(path: &Path) -> Result<Vec<CountyGeometry>, GeometryError> {
        Self::load_with_field(path, DEFAULT_COUNTY_FIELD)
    }

    /// Load boundaries, reading county names from `field`.
    pub fn load_with_field(path: &Path, field: &str) -> Result<Vec<CountyGeometry>, GeometryError> {
        if !path.exists() {
            return Err(GeometryError::FileNotFound(path.to_path_buf()));
        }

        let reader = BufReader::new(File::open(path)?);
        let geojson = GeoJson::from_reader(reader).map_err(geojson::Error::from)?;
        let counties = Self::from_geojson(geojson, field)?;

        if counties.len() != COUNTY_COUNT {
            warn!(
                found = counties.len(),
                expected = COUNTY_COUNT,
                "unexpected number of county boundaries"
            );
        }
        info!(counties = counties.len(), path = %path.display(), "loaded county boundaries");

        Ok(counties)
    }

    /// Convert a parsed FeatureCollection into county geometries.
    pub fn from_geojson(geojson: GeoJson, field: &str) -> Result<Vec<CountyGeometry>, GeometryError> {
        let collection = match geojson {
            GeoJson::FeatureCollection(fc) => fc,
            _ => {
                return Err(GeometryError::Schema(
                    "GeoJSON must be a FeatureCollection".to_string(),
                ))
            }
        };

        let mut counties = Vec::with_capacity(collection.features.len());
        let mut skipped = 0usize;

        for (idx, feature) in collection.features.into_iter().enumerate() {
            let name = match feature.properties.as_ref().and_then(|props| props.get(field)) {
                Some(serde_json::Value::String(s)) => title_case(s),
                Some(other) => {
                    return Err(GeometryError::Schema(format!(
                        "feature {idx}: field '{field}' must be a string, found {other}"
                    )))
                }
                None => {
                    return Err(GeometryError::Schema(format!(
                        "feature {idx}: missing field '{field}'"
                    )))
                }
            };

            let boundary = match feature.geometry {
                Some(geom) => match geo::Geometry::<f64>::try_from(geom.value) {
                    Ok(geo::Geometry::MultiPolygon(mp)) => mp,
                    Ok(geo::Geometry::Polygon(p)) => MultiPolygon::new(vec![p]),
                    Ok(_) | Err(_) => {
                        skipped += 1;
                        continue;
                    }
                },
                None => {
                    skipped += 1;
                    continue;
                }
            };

            counties.push(CountyGeometry {
                county: name,
                boundary,
            });
        }

        if skipped > 0 {
            warn!(skipped, "skipped features without polygon geometry");
        }

        Ok(counties)
    }
}
