//! Statistics module - KPI aggregates, trends and rankings

mod calculator;

pub use calculator::{
    IndicatorSummary, NationalStats, StatsCalculator, StatsError, TrendPoint,
    DEFAULT_RANKING_SIZE,
};
