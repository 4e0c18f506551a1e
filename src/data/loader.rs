//! Indicator CSV Loader Module
//! Loads the raw coverage CSV with Polars and normalizes it into the fixed
//! [County, Indicator, Date, Value] schema.

use super::normalize::title_case;
use polars::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

pub const COUNTY: &str = "County";
pub const INDICATOR: &str = "Indicator";
pub const DATE: &str = "Date";
pub const VALUE: &str = "Value";

/// Column dropped at load time.
const UNIT: &str = "Unit";
const EXPECTED_COLUMNS: usize = 5;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Unexpected CSV layout: {0}")]
    Schema(String),
    #[error("Failed to load CSV: {0}")]
    Csv(#[from] PolarsError),
}

/// One coverage observation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorRecord {
    pub county: String,
    pub indicator: String,
    pub date: i32,
    pub value: Option<f64>,
}

impl IndicatorRecord {
    pub fn new(county: &str, indicator: &str, date: i32, value: Option<f64>) -> Self {
        Self {
            county: county.to_string(),
            indicator: indicator.to_string(),
            date,
            value,
        }
    }
}

/// Normalized indicator data, read-only after load.
#[derive(Debug, Clone)]
pub struct IndicatorTable {
    df: DataFrame,
}

impl IndicatorTable {
    /// Build a table from records, title-casing County and Indicator.
    pub fn from_records(records: &[IndicatorRecord]) -> Result<Self, LoaderError> {
        let counties: Vec<String> = records.iter().map(|r| title_case(&r.county)).collect();
        let indicators: Vec<String> = records.iter().map(|r| title_case(&r.indicator)).collect();
        let dates: Vec<i32> = records.iter().map(|r| r.date).collect();
        let values: Vec<Option<f64>> = records.iter().map(|r| r.value).collect();

        let df = DataFrame::new(vec![
            Column::new(COUNTY.into(), counties),
            Column::new(INDICATOR.into(), indicators),
            Column::new(DATE.into(), dates),
            Column::new(VALUE.into(), values),
        ])?;

        Ok(Self { df })
    }

    /// Get a reference to the underlying DataFrame.
    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    pub fn len(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    /// Materialize every row as an `IndicatorRecord`.
    pub fn records(&self) -> Result<Vec<IndicatorRecord>, PolarsError> {
        frame_to_records(&self.df)
    }
}

/// Convert a frame with the normalized schema back into records.
pub(crate) fn frame_to_records(df: &DataFrame) -> Result<Vec<IndicatorRecord>, PolarsError> {
    let counties = df.column(COUNTY)?.as_materialized_series().str()?;
    let indicators = df.column(INDICATOR)?.as_materialized_series().str()?;
    let dates = df.column(DATE)?.as_materialized_series().i32()?;
    let values = df.column(VALUE)?.as_materialized_series().f64()?;

    let mut records = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        if let (Some(c), Some(ind), Some(d)) = (counties.get(i), indicators.get(i), dates.get(i)) {
            records.push(IndicatorRecord {
                county: c.to_string(),
                indicator: ind.to_string(),
                date: d,
                value: values.get(i),
            });
        }
    }

    Ok(records)
}

/// Loads the indicator CSV.
pub struct IndicatorLoader;

impl IndicatorLoader {
    /// Load and normalize the indicator CSV at `path`.
    ///
    /// The file must have exactly five columns with `Unit` last. The first
    /// four are renamed positionally to County, Indicator, Date, Value.
    /// Cells that do not parse as the inferred column type load as null.
    pub fn load(path: &Path) -> Result<IndicatorTable, LoaderError> {
        if !path.exists() {
            return Err(LoaderError::FileNotFound(path.to_path_buf()));
        }

        let raw = LazyCsvReader::new(path)
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .finish()?
            .collect()?;

        let table = Self::normalize(&raw)?;
        info!(rows = table.len(), path = %path.display(), "loaded indicator table");
        Ok(table)
    }

    /// Validate the raw layout, drop Unit, rename and coerce.
    fn normalize(raw: &DataFrame) -> Result<IndicatorTable, LoaderError> {
        let names: Vec<String> = raw
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        if names.len() != EXPECTED_COLUMNS {
            return Err(LoaderError::Schema(format!(
                "expected {} columns [County, Indicator, Date, Value, Unit], found {}: {:?}",
                EXPECTED_COLUMNS,
                names.len(),
                names
            )));
        }
        if !names[4].trim().eq_ignore_ascii_case(UNIT) {
            return Err(LoaderError::Schema(format!(
                "expected fifth column '{}', found {:?}",
                UNIT, names
            )));
        }

        let columns = raw.get_columns();
        let county_ca = columns[0].cast(&DataType::String)?;
        let indicator_ca = columns[1].cast(&DataType::String)?;
        let date_ca = columns[2].cast(&DataType::Int32)?;
        let value_ca = columns[3].cast(&DataType::Float64)?;

        let county_ca = county_ca.as_materialized_series().str()?;
        let indicator_ca = indicator_ca.as_materialized_series().str()?;
        let date_ca = date_ca.as_materialized_series().i32()?;
        let value_ca = value_ca.as_materialized_series().f64()?;

        let mut records = Vec::with_capacity(raw.height());
        let mut dropped = 0usize;

        for i in 0..raw.height() {
            match (county_ca.get(i), indicator_ca.get(i), date_ca.get(i)) {
                (Some(c), Some(ind), Some(d)) if !c.trim().is_empty() && !ind.trim().is_empty() => {
                    let value = value_ca.get(i).filter(|v| !v.is_nan());
                    records.push(IndicatorRecord::new(c, ind, d, value));
                }
                _ => dropped += 1,
            }
        }

        if dropped > 0 {
            warn!(dropped, "skipped rows missing County, Indicator or Date");
        }

        IndicatorTable::from_records(&records)
    }
}
