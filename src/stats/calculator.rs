//! Statistics Calculator Module
//! KPI aggregates, national trend and county rankings over filtered views.

use crate::data::{
    CountyValue, EngineError, FilteredView, IndicatorTable, JoinEngine, DATE_COLUMN,
    INDICATOR_COLUMN, VALUE_COLUMN,
};
use polars::prelude::*;
use rayon::prelude::*;
use serde::Serialize;
use statrs::statistics::Statistics;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use thiserror::Error;

/// Number of counties shown in the top/bottom rankings.
pub const DEFAULT_RANKING_SIZE: usize = 10;

#[derive(Error, Debug)]
pub enum StatsError {
    #[error("No values to aggregate")]
    EmptyInput,
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// KPI card values for one indicator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NationalStats {
    pub count: usize,
    pub mean: f64,
    pub highest: CountyValue,
    pub lowest: CountyValue,
}

/// Mean coverage for one year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: i32,
    /// `None` when every value recorded for the year is missing.
    pub mean: Option<f64>,
}

/// National stats for one indicator, or nothing when it has no values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSummary {
    pub indicator: String,
    pub stats: Option<NationalStats>,
}

/// Handles aggregate calculations.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Mean, highest and lowest county of a view. Missing values are ignored;
    /// ties go to the first row in input order.
    pub fn national_stats(view: &FilteredView) -> Result<NationalStats, StatsError> {
        let present: Vec<(&CountyValue, f64)> = view
            .rows
            .iter()
            .filter_map(|row| row.value.map(|v| (row, v)))
            .collect();

        let first = *present.first().ok_or(StatsError::EmptyInput)?;
        let (mut highest, mut lowest) = (first, first);

        for &(row, v) in &present {
            if v > highest.1 {
                highest = (row, v);
            }
            if v < lowest.1 {
                lowest = (row, v);
            }
        }

        let mean = present.iter().map(|(_, v)| *v).mean();

        Ok(NationalStats {
            count: present.len(),
            mean,
            highest: highest.0.clone(),
            lowest: lowest.0.clone(),
        })
    }

    /// Mean value per year for one indicator, ascending by year.
    pub fn trend(table: &IndicatorTable, indicator: &str) -> Result<Vec<TrendPoint>, StatsError> {
        let filtered = table
            .dataframe()
            .clone()
            .lazy()
            .filter(col(INDICATOR_COLUMN).eq(lit(indicator)))
            .select([col(DATE_COLUMN), col(VALUE_COLUMN)])
            .collect()?;

        let dates = filtered.column(DATE_COLUMN)?.as_materialized_series().i32()?;
        let values = filtered.column(VALUE_COLUMN)?.as_materialized_series().f64()?;

        let mut by_date: BTreeMap<i32, Vec<f64>> = BTreeMap::new();
        for (date, value) in dates.into_iter().zip(values.into_iter()) {
            let Some(date) = date else { continue };
            let bucket = by_date.entry(date).or_default();
            if let Some(v) = value {
                bucket.push(v);
            }
        }

        Ok(by_date
            .into_iter()
            .map(|(date, values)| TrendPoint {
                date,
                mean: if values.is_empty() {
                    None
                } else {
                    Some(values.iter().mean())
                },
            })
            .collect())
    }

    /// The `n` highest counties, best first. Missing values are excluded.
    pub fn top_counties(view: &FilteredView, n: usize) -> Vec<CountyValue> {
        Self::ranked(view, n, |a, b| b.total_cmp(&a))
    }

    /// The `n` lowest counties, worst first. Missing values are excluded.
    pub fn bottom_counties(view: &FilteredView, n: usize) -> Vec<CountyValue> {
        Self::ranked(view, n, |a, b| a.total_cmp(&b))
    }

    fn ranked(view: &FilteredView, n: usize, order: impl Fn(f64, f64) -> Ordering) -> Vec<CountyValue> {
        let mut present: Vec<(&CountyValue, f64)> = view
            .rows
            .iter()
            .filter_map(|row| row.value.map(|v| (row, v)))
            .collect();
        // stable sort keeps input order among ties
        present.sort_by(|a, b| order(a.1, b.1));
        present.into_iter().take(n).map(|(row, _)| row.clone()).collect()
    }

    /// National stats for every indicator at `date`, computed in parallel.
    pub fn summarize_indicators(
        table: &IndicatorTable,
        date: i32,
    ) -> Result<Vec<IndicatorSummary>, StatsError> {
        let indicators = JoinEngine::indicators(table)?;

        let mut summaries = indicators
            .par_iter()
            .map(|indicator| -> Result<IndicatorSummary, StatsError> {
                let view = JoinEngine::filter_by_indicator(table, date, indicator)?;
                let stats = match Self::national_stats(&view) {
                    Ok(stats) => Some(stats),
                    Err(StatsError::EmptyInput) => None,
                    Err(e) => return Err(e),
                };
                Ok(IndicatorSummary {
                    indicator: indicator.clone(),
                    stats,
                })
            })
            .collect::<Result<Vec<_>, StatsError>>()?;

        summaries.sort_by(|a, b| a.indicator.cmp(&b.indicator));
        Ok(summaries)
    }
}
