//! Kenya Immunization Dashboard - command line front end
//!
//! Prints each dashboard view as JSON so any presentation layer can draw it.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use immunization_dashboard::{report, AppConfig, Dataset};
use serde_json::json;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML configuration; built-in defaults apply when the file is absent
    #[arg(short, long, value_name = "FILE", default_value = "dashboard.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List selectable indicators
    Indicators,
    /// List selectable counties
    Counties,
    /// KPI cards and choropleth frame for one indicator
    Map {
        #[arg(short, long)]
        indicator: String,
        #[arg(short, long, value_name = "FILE", default_value = "map.geojson")]
        out: PathBuf,
    },
    /// Every indicator for one county, ordered for the radar view
    County {
        #[arg(short, long)]
        name: String,
    },
    /// National mean per year for one indicator
    Trend {
        #[arg(short, long)]
        indicator: String,
    },
    /// Top and bottom counties for one indicator
    Rank {
        #[arg(short, long)]
        indicator: String,
        #[arg(short, long)]
        top: Option<usize>,
    },
    /// National stats for every indicator
    Summary,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load_or_default(&cli.config)?;
    let dataset = Dataset::load(&config).context("Failed to load dashboard inputs")?;
    let date = config.selection.date;

    let output = match &cli.command {
        Commands::Indicators => report::to_json(&dataset.indicator_options()?)?,
        Commands::Counties => report::to_json(&dataset.county_options()?)?,
        Commands::Map { indicator, out } => {
            let view = dataset.indicator_view(date, indicator)?;
            let panel = dataset.kpi_panel(&view)?;
            let frame = dataset.map_frame(&view)?;
            report::write_geojson(out, &frame)?;

            report::to_json(&json!({
                "kpi": panel,
                "cards": panel.cards(),
                "map": {
                    "path": out,
                    "counties": frame.len(),
                    "with_value": frame.matched_count(),
                    "unmatched": frame.unmatched,
                },
            }))?
        }
        Commands::County { name } => report::to_json(&dataset.county_profile(date, name)?)?,
        Commands::Trend { indicator } => report::to_json(&dataset.national_trend(indicator)?)?,
        Commands::Rank { indicator, top } => {
            let view = dataset.indicator_view(date, indicator)?;
            let n = top.unwrap_or(config.selection.top_n);
            report::to_json(&dataset.rankings(&view, n))?
        }
        Commands::Summary => report::to_json(&dataset.summary(date)?)?,
    };

    println!("{}", output);
    Ok(())
}
