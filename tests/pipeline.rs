use approx::assert_relative_eq;
use immunization_dashboard::config::AppConfig;
use immunization_dashboard::data::JoinEngine;
use immunization_dashboard::stats::{StatsCalculator, StatsError};
use immunization_dashboard::{report, Dataset, KpiPanel};
use std::fs;
use std::path::Path;

const CSV: &str = "County,Indicator,Date,Value,Unit
NAIROBI,BCG,2022,95,%
kiambu,bcg,2022,80,%
Taita Taveta,BCG,2022,70,%
Nairobi,Measles,2022,88,%
Nairobi,BCG,2021,91,%
kiambu,BCG,2020,60,%
";

fn square(x: f64) -> String {
    format!(
        r#"{{"type": "Polygon", "coordinates": [[[{x}, 0.0], [{x1}, 0.0], [{x1}, 1.0], [{x}, 1.0], [{x}, 0.0]]]}}"#,
        x = x,
        x1 = x + 1.0
    )
}

fn write_inputs(dir: &Path) -> AppConfig {
    let features: Vec<String> = ["NAIROBI", "Kiambu", "Taita-Taveta", "Lamu"]
        .iter()
        .enumerate()
        .map(|(i, name)| {
            format!(
                r#"{{"type": "Feature", "properties": {{"COUNTY_NAM": "{}"}}, "geometry": {}}}"#,
                name,
                square(i as f64)
            )
        })
        .collect();
    let geojson = format!(
        r#"{{"type": "FeatureCollection", "features": [{}]}}"#,
        features.join(",")
    );

    let csv_path = dir.join("immunization.csv");
    let geo_path = dir.join("counties.geojson");
    fs::write(&csv_path, CSV).unwrap();
    fs::write(&geo_path, geojson).unwrap();

    let mut config = AppConfig::default();
    config.input.indicators_csv = csv_path;
    config.input.counties_geojson = geo_path;
    config
}

#[test]
fn map_view_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_inputs(dir.path());
    let dataset = Dataset::load(&config).unwrap();

    let view = dataset.indicator_view(2022, "Bcg").unwrap();
    assert_eq!(view.len(), 3);
    assert!(view.rows.iter().all(|r| r.value.is_some()));

    let frame = dataset.map_frame(&view).unwrap();
    assert_eq!(frame.len(), dataset.boundaries().len());
    assert_eq!(frame.matched_count(), 3);
    assert_eq!(frame.rows[3].geometry.county, "Lamu");
    assert_eq!(frame.rows[3].value, None);

    match dataset.kpi_panel(&view).unwrap() {
        KpiPanel::Ready { stats, .. } => {
            assert_relative_eq!(stats.mean, 245.0 / 3.0, epsilon = 1e-9);
            assert_eq!(stats.highest.county, "Nairobi");
            assert_eq!(stats.lowest.county, "Taita Taveta");
        }
        other => panic!("expected KPI values, got {other:?}"),
    }

    let out = dir.path().join("map.geojson");
    report::write_geojson(&out, &frame).unwrap();
    assert!(fs::read_to_string(&out).unwrap().contains("\"Value\":95.0"));
}

#[test]
fn county_trend_and_ranking_views() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = Dataset::load(&write_inputs(dir.path())).unwrap();

    let profile = dataset.county_profile(2022, "nairobi").unwrap();
    let indicators: Vec<&str> = profile.rows.iter().map(|r| r.indicator.as_str()).collect();
    assert_eq!(indicators, vec!["Bcg", "Measles"]);

    let trend = dataset.national_trend("BCG").unwrap();
    let years: Vec<i32> = trend.iter().map(|p| p.date).collect();
    assert_eq!(years, vec![2020, 2021, 2022]);

    let view = dataset.indicator_view(2022, "bcg").unwrap();
    let rankings = dataset.rankings(&view, 2);
    let top: Vec<&str> = rankings.top.iter().map(|r| r.county.as_str()).collect();
    let bottom: Vec<&str> = rankings.bottom.iter().map(|r| r.county.as_str()).collect();
    assert_eq!(top, vec!["Nairobi", "Kiambu"]);
    assert_eq!(bottom, vec!["Taita Taveta", "Kiambu"]);
}

#[test]
fn absent_indicator_is_empty_not_a_crash() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = Dataset::load(&write_inputs(dir.path())).unwrap();

    let view = JoinEngine::filter_by_indicator(dataset.table(), 2022, "Polio").unwrap();
    assert!(view.is_empty());
    assert!(matches!(
        StatsCalculator::national_stats(&view),
        Err(StatsError::EmptyInput)
    ));
    assert!(matches!(
        dataset.kpi_panel(&view).unwrap(),
        KpiPanel::Empty { .. }
    ));
}
