//! Join & Filter Module
//! Selections over the indicator table and the left join against county
//! boundaries that feeds the choropleth.

use super::geometry::CountyGeometry;
use super::loader::{frame_to_records, IndicatorTable, COUNTY, DATE, INDICATOR, VALUE};
use super::normalize::{county_key, CountyKey};
use polars::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error("Duplicate county '{county}' in {source_name}")]
    DuplicateCounty {
        source_name: &'static str,
        county: String,
    },
}

/// A county and its value for one indicator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountyValue {
    pub county: String,
    pub value: Option<f64>,
}

/// An indicator and its value for one county.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorValue {
    pub indicator: String,
    pub value: Option<f64>,
}

/// One date and indicator, projected to {County, Value}, in input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilteredView {
    pub date: i32,
    pub indicator: String,
    pub rows: Vec<CountyValue>,
}

impl FilteredView {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Every indicator recorded for one county and date.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CountyBreakdown {
    pub county: String,
    pub date: i32,
    pub rows: Vec<IndicatorValue>,
}

impl CountyBreakdown {
    /// Rows ordered by indicator name, the axis order of the radar view.
    pub fn sorted(&self) -> Vec<IndicatorValue> {
        let mut rows = self.rows.clone();
        rows.sort_by(|a, b| a.indicator.cmp(&b.indicator));
        rows
    }
}

/// One row of the choropleth frame.
#[derive(Debug, Clone)]
pub struct MapRow<'a> {
    pub geometry: &'a CountyGeometry,
    pub value: Option<f64>,
}

/// Left join of county boundaries with a filtered view.
#[derive(Debug, Clone)]
pub struct JoinedMapFrame<'a> {
    pub indicator: String,
    pub date: i32,
    pub rows: Vec<MapRow<'a>>,
    /// Counties in the view with no boundary to attach to.
    pub unmatched: Vec<String>,
}

impl JoinedMapFrame<'_> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows that carry a value.
    pub fn matched_count(&self) -> usize {
        self.rows.iter().filter(|r| r.value.is_some()).count()
    }
}

/// Filters and joins over the indicator table.
pub struct JoinEngine;

impl JoinEngine {
    /// Rows with `Date == date` and `Indicator == indicator`, projected to
    /// {County, Value}. Matching is exact.
    pub fn filter_by_indicator(
        table: &IndicatorTable,
        date: i32,
        indicator: &str,
    ) -> Result<FilteredView, EngineError> {
        let filtered = table
            .dataframe()
            .clone()
            .lazy()
            .filter(
                col(DATE)
                    .eq(lit(date))
                    .and(col(INDICATOR).eq(lit(indicator))),
            )
            .select([col(COUNTY), col(VALUE)])
            .collect()?;

        let counties = filtered.column(COUNTY)?.as_materialized_series().str()?;
        let values = filtered.column(VALUE)?.as_materialized_series().f64()?;

        let rows: Vec<CountyValue> = counties
            .into_iter()
            .zip(values.into_iter())
            .filter_map(|(county, value)| {
                county.map(|c| CountyValue {
                    county: c.to_string(),
                    value,
                })
            })
            .collect();

        debug!(date, indicator, rows = rows.len(), "filtered by indicator");

        Ok(FilteredView {
            date,
            indicator: indicator.to_string(),
            rows,
        })
    }

    /// Rows with `County == county` and `Date == date`, all indicators.
    pub fn filter_by_county(
        table: &IndicatorTable,
        date: i32,
        county: &str,
    ) -> Result<CountyBreakdown, EngineError> {
        let filtered = table
            .dataframe()
            .clone()
            .lazy()
            .filter(col(COUNTY).eq(lit(county)).and(col(DATE).eq(lit(date))))
            .collect()?;

        let rows = frame_to_records(&filtered)?
            .into_iter()
            .map(|r| IndicatorValue {
                indicator: r.indicator,
                value: r.value,
            })
            .collect();

        Ok(CountyBreakdown {
            county: county.to_string(),
            date,
            rows,
        })
    }

    /// Left join keyed on the canonical county key. The result has one row
    /// per boundary, in boundary order; boundaries without a value keep
    /// `None`. A repeated county on either side is an error.
    pub fn join_with_geometry<'a>(
        geometry: &'a [CountyGeometry],
        view: &FilteredView,
    ) -> Result<JoinedMapFrame<'a>, EngineError> {
        let mut boundary_keys: HashMap<CountyKey, &str> = HashMap::with_capacity(geometry.len());
        for g in geometry {
            if boundary_keys.insert(county_key(&g.county), &g.county).is_some() {
                return Err(EngineError::DuplicateCounty {
                    source_name: "county boundaries",
                    county: g.county.clone(),
                });
            }
        }

        let mut values: HashMap<CountyKey, Option<f64>> = HashMap::with_capacity(view.rows.len());
        let mut unmatched = Vec::new();
        for row in &view.rows {
            let key = county_key(&row.county);
            if values.insert(key.clone(), row.value).is_some() {
                return Err(EngineError::DuplicateCounty {
                    source_name: "indicator data",
                    county: row.county.clone(),
                });
            }
            if !boundary_keys.contains_key(&key) {
                unmatched.push(row.county.clone());
            }
        }

        if !unmatched.is_empty() {
            warn!(?unmatched, "counties without a boundary");
        }

        let rows = geometry
            .iter()
            .map(|g| MapRow {
                geometry: g,
                value: values.get(&county_key(&g.county)).copied().flatten(),
            })
            .collect();

        Ok(JoinedMapFrame {
            indicator: view.indicator.clone(),
            date: view.date,
            rows,
            unmatched,
        })
    }

    /// Distinct indicators, sorted.
    pub fn indicators(table: &IndicatorTable) -> Result<Vec<String>, EngineError> {
        Self::distinct_strings(table, INDICATOR)
    }

    /// Distinct counties, sorted.
    pub fn counties(table: &IndicatorTable) -> Result<Vec<String>, EngineError> {
        Self::distinct_strings(table, COUNTY)
    }

    /// Distinct years, ascending.
    pub fn dates(table: &IndicatorTable) -> Result<Vec<i32>, EngineError> {
        let dates = table.dataframe().column(DATE)?.as_materialized_series().i32()?;
        let mut out: Vec<i32> = dates.into_iter().flatten().collect();
        out.sort_unstable();
        out.dedup();
        Ok(out)
    }

    fn distinct_strings(table: &IndicatorTable, column: &str) -> Result<Vec<String>, EngineError> {
        let ca = table.dataframe().column(column)?.as_materialized_series().str()?;
        let mut out: Vec<String> = ca.into_iter().flatten().map(|s| s.to_string()).collect();
        out.sort();
        out.dedup();
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::IndicatorRecord;
    use geo::{polygon, MultiPolygon};

    fn table(rows: &[(&str, &str, i32, Option<f64>)]) -> IndicatorTable {
        let records: Vec<IndicatorRecord> = rows
            .iter()
            .map(|(c, i, d, v)| IndicatorRecord::new(c, i, *d, *v))
            .collect();
        IndicatorTable::from_records(&records).unwrap()
    }

    fn boundaries(names: &[&str]) -> Vec<CountyGeometry> {
        names
            .iter()
            .map(|n| CountyGeometry {
                county: n.to_string(),
                boundary: MultiPolygon::new(vec![polygon![
                    (x: 0.0, y: 0.0),
                    (x: 1.0, y: 0.0),
                    (x: 1.0, y: 1.0),
                ]]),
            })
            .collect()
    }

    fn sample() -> IndicatorTable {
        table(&[
            ("Nairobi", "BCG", 2022, Some(95.0)),
            ("Kiambu", "BCG", 2022, Some(80.0)),
            ("Nairobi", "BCG", 2021, Some(90.0)),
            ("Nairobi", "Measles", 2022, Some(70.0)),
            ("Nairobi", "Penta 3", 2022, None),
        ])
    }

    #[test]
    fn test_filter_by_indicator_matches_both_predicates() {
        let view = JoinEngine::filter_by_indicator(&sample(), 2022, "Bcg").unwrap();
        assert_eq!(
            view.rows,
            vec![
                CountyValue { county: "Nairobi".into(), value: Some(95.0) },
                CountyValue { county: "Kiambu".into(), value: Some(80.0) },
            ]
        );
    }

    #[test]
    fn test_filter_by_indicator_is_case_sensitive() {
        let view = JoinEngine::filter_by_indicator(&sample(), 2022, "BCG").unwrap();
        assert!(view.is_empty());
    }

    #[test]
    fn test_filter_by_absent_indicator_is_empty() {
        let view = JoinEngine::filter_by_indicator(&sample(), 2022, "Polio").unwrap();
        assert!(view.is_empty());
        assert_eq!(view.indicator, "Polio");
    }

    #[test]
    fn test_filter_by_county_sorted() {
        let breakdown = JoinEngine::filter_by_county(&sample(), 2022, "Nairobi").unwrap();
        assert_eq!(breakdown.rows.len(), 3);

        let names: Vec<String> = breakdown.sorted().into_iter().map(|r| r.indicator).collect();
        assert_eq!(names, vec!["Bcg", "Measles", "Penta 3"]);
    }

    #[test]
    fn test_join_keeps_every_boundary() {
        let geometry = boundaries(&["Nairobi", "Kiambu", "Mombasa"]);
        let view = JoinEngine::filter_by_indicator(&sample(), 2022, "Bcg").unwrap();

        let frame = JoinEngine::join_with_geometry(&geometry, &view).unwrap();
        assert_eq!(frame.len(), geometry.len());
        assert_eq!(frame.rows[0].value, Some(95.0));
        assert_eq!(frame.rows[1].value, Some(80.0));
        assert_eq!(frame.rows[2].value, None);
        assert_eq!(frame.matched_count(), 2);
        assert!(frame.unmatched.is_empty());
    }

    #[test]
    fn test_join_tolerates_spelling_variants() {
        let geometry = boundaries(&["Taita-Taveta", "Elgeyo-Marakwet"]);
        let data = table(&[
            ("Taita Taveta", "BCG", 2022, Some(81.0)),
            ("Keiyo Marakwet", "BCG", 2022, Some(77.0)),
        ]);
        let view = JoinEngine::filter_by_indicator(&data, 2022, "Bcg").unwrap();

        let frame = JoinEngine::join_with_geometry(&geometry, &view).unwrap();
        assert_eq!(frame.rows[0].value, Some(81.0));
        assert_eq!(frame.rows[1].value, Some(77.0));
    }

    #[test]
    fn test_join_reports_unmatched_counties() {
        let geometry = boundaries(&["Nairobi"]);
        let view = JoinEngine::filter_by_indicator(&sample(), 2022, "Bcg").unwrap();

        let frame = JoinEngine::join_with_geometry(&geometry, &view).unwrap();
        assert_eq!(frame.len(), 1);
        assert_eq!(frame.unmatched, vec!["Kiambu".to_string()]);
    }

    #[test]
    fn test_duplicate_boundary_is_error() {
        let geometry = boundaries(&["Nairobi", "Nairobi City"]);
        let view = JoinEngine::filter_by_indicator(&sample(), 2022, "Bcg").unwrap();

        let result = JoinEngine::join_with_geometry(&geometry, &view);
        assert!(matches!(result, Err(EngineError::DuplicateCounty { .. })));
    }

    #[test]
    fn test_duplicate_value_row_is_error() {
        let data = table(&[
            ("Nairobi", "BCG", 2022, Some(95.0)),
            ("Nairobi", "BCG", 2022, Some(96.0)),
        ]);
        let view = JoinEngine::filter_by_indicator(&data, 2022, "Bcg").unwrap();

        let geometry = boundaries(&["Nairobi"]);
        let result = JoinEngine::join_with_geometry(&geometry, &view);
        assert!(matches!(
            result,
            Err(EngineError::DuplicateCounty { source_name: "indicator data", .. })
        ));
    }

    #[test]
    fn test_distinct_selector_values() {
        let data = sample();
        assert_eq!(JoinEngine::indicators(&data).unwrap(), vec!["Bcg", "Measles", "Penta 3"]);
        assert_eq!(JoinEngine::counties(&data).unwrap(), vec!["Kiambu", "Nairobi"]);
        assert_eq!(JoinEngine::dates(&data).unwrap(), vec![2021, 2022]);
    }

    #[test]
    fn test_error_variants() {
        let err = EngineError::from(PolarsError::ColumnNotFound("Value".into()));
        assert!(matches!(err, EngineError::Polars(_)));

        let err = EngineError::DuplicateCounty {
            source_name: "county boundaries",
            county: "Nairobi".to_string(),
        };
        assert_eq!(err.to_string(), "Duplicate county 'Nairobi' in county boundaries");
    }
}
