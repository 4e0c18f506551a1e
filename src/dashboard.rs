//! Dataset handle: both inputs loaded once, then queried read-only by every view.

use crate::config::AppConfig;
use crate::data::{
    title_case, CountyBreakdown, CountyGeometry, CountyValue, EngineError, FilteredView,
    GeometryError, GeometryLoader, IndicatorLoader, IndicatorTable, JoinEngine, JoinedMapFrame,
    LoaderError,
};
use crate::stats::{IndicatorSummary, NationalStats, StatsCalculator, StatsError, TrendPoint};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Indicator data: {0}")]
    Indicators(#[from] LoaderError),
    #[error("County boundaries: {0}")]
    Boundaries(#[from] GeometryError),
}

/// KPI cards for the selected indicator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum KpiPanel {
    Ready {
        indicator: String,
        stats: NationalStats,
    },
    /// Nothing recorded for the selection; shown as a placeholder.
    Empty { indicator: String },
}

/// A single labelled KPI card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiCard {
    pub label: &'static str,
    pub value: String,
}

impl KpiPanel {
    /// Card labels and display strings, in dashboard order.
    pub fn cards(&self) -> Vec<KpiCard> {
        match self {
            KpiPanel::Ready { stats, .. } => vec![
                KpiCard {
                    label: "National Average",
                    value: format!("{:.1}%", stats.mean),
                },
                KpiCard {
                    label: "Highest County",
                    value: format_county(&stats.highest),
                },
                KpiCard {
                    label: "Lowest County",
                    value: format_county(&stats.lowest),
                },
            ],
            KpiPanel::Empty { .. } => ["National Average", "Highest County", "Lowest County"]
                .into_iter()
                .map(|label| KpiCard {
                    label,
                    value: "n/a".to_string(),
                })
                .collect(),
        }
    }
}

fn format_county(row: &CountyValue) -> String {
    match row.value {
        Some(v) => format!("{} ({:.1}%)", row.county, v),
        None => row.county.clone(),
    }
}

/// Top and bottom counties for one indicator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rankings {
    pub indicator: String,
    pub top: Vec<CountyValue>,
    pub bottom: Vec<CountyValue>,
}

/// Loaded indicator table and county boundaries.
pub struct Dataset {
    table: IndicatorTable,
    boundaries: Vec<CountyGeometry>,
}

impl Dataset {
    /// Load both inputs named by `config`. Either failing is fatal.
    pub fn load(config: &AppConfig) -> Result<Self, DatasetError> {
        let table = IndicatorLoader::load(&config.input.indicators_csv)?;
        let boundaries =
            GeometryLoader::load_with_field(&config.input.counties_geojson, &config.input.county_field)?;
        info!(
            records = table.len(),
            counties = boundaries.len(),
            "dataset ready"
        );
        Ok(Self::new(table, boundaries))
    }

    pub fn new(table: IndicatorTable, boundaries: Vec<CountyGeometry>) -> Self {
        Self { table, boundaries }
    }

    pub fn table(&self) -> &IndicatorTable {
        &self.table
    }

    pub fn boundaries(&self) -> &[CountyGeometry] {
        &self.boundaries
    }

    /// Indicator selector choices.
    pub fn indicator_options(&self) -> Result<Vec<String>, EngineError> {
        JoinEngine::indicators(&self.table)
    }

    /// County selector choices.
    pub fn county_options(&self) -> Result<Vec<String>, EngineError> {
        JoinEngine::counties(&self.table)
    }

    /// Values of `indicator` at `date` for every county. The selection is
    /// title-cased first so it matches the stored form.
    pub fn indicator_view(&self, date: i32, indicator: &str) -> Result<FilteredView, EngineError> {
        JoinEngine::filter_by_indicator(&self.table, date, &title_case(indicator))
    }

    /// Choropleth frame for a view.
    pub fn map_frame(&self, view: &FilteredView) -> Result<JoinedMapFrame<'_>, EngineError> {
        JoinEngine::join_with_geometry(&self.boundaries, view)
    }

    /// KPI cards for a view; an empty selection yields a placeholder panel.
    pub fn kpi_panel(&self, view: &FilteredView) -> Result<KpiPanel, StatsError> {
        match StatsCalculator::national_stats(view) {
            Ok(stats) => Ok(KpiPanel::Ready {
                indicator: view.indicator.clone(),
                stats,
            }),
            Err(StatsError::EmptyInput) => Ok(KpiPanel::Empty {
                indicator: view.indicator.clone(),
            }),
            Err(e) => Err(e),
        }
    }

    /// All indicators for one county, ordered by indicator.
    pub fn county_profile(&self, date: i32, county: &str) -> Result<CountyBreakdown, EngineError> {
        let mut breakdown = JoinEngine::filter_by_county(&self.table, date, &title_case(county))?;
        breakdown.rows = breakdown.sorted();
        Ok(breakdown)
    }

    /// National mean per year for one indicator.
    pub fn national_trend(&self, indicator: &str) -> Result<Vec<TrendPoint>, StatsError> {
        StatsCalculator::trend(&self.table, &title_case(indicator))
    }

    pub fn rankings(&self, view: &FilteredView, n: usize) -> Rankings {
        Rankings {
            indicator: view.indicator.clone(),
            top: StatsCalculator::top_counties(view, n),
            bottom: StatsCalculator::bottom_counties(view, n),
        }
    }

    pub fn summary(&self, date: i32) -> Result<Vec<IndicatorSummary>, StatsError> {
        StatsCalculator::summarize_indicators(&self.table, date)
    }
}
