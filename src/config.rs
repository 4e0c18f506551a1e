//! Dashboard configuration, read from TOML.

use crate::data::DEFAULT_COUNTY_FIELD;
use crate::stats::DEFAULT_RANKING_SIZE;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Year shown by the map, KPI and county views.
pub const DEFAULT_DATE: i32 = 2022;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub input: InputConfig,
    pub selection: SelectionConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct InputConfig {
    pub indicators_csv: PathBuf,
    pub counties_geojson: PathBuf,
    /// Property holding the county name in the boundary file
    pub county_field: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            indicators_csv: PathBuf::from("Data/immunization_kenya_2022.csv"),
            counties_geojson: PathBuf::from("Data/kenya_counties.geojson"),
            county_field: DEFAULT_COUNTY_FIELD.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SelectionConfig {
    pub date: i32,
    pub top_n: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            date: DEFAULT_DATE,
            top_n: DEFAULT_RANKING_SIZE,
        }
    }
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: AppConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML configuration")?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }
}
