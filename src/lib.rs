//! Kenya immunization dashboard engine.
//!
//! Loads county coverage statistics and county boundaries, joins them and
//! computes the views a dashboard renders: choropleth frame, KPI cards,
//! county breakdown, national trend and county rankings.

pub mod config;
pub mod dashboard;
pub mod data;
pub mod report;
pub mod stats;

pub use config::AppConfig;
pub use dashboard::{Dataset, DatasetError, KpiCard, KpiPanel, Rankings};
