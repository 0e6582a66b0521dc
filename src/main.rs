use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use config::DashboardConfig;
use loader::Datasets;
use presentation::{OutputFormat, build_report, render};
use processor::{DateRange, filter_orders};
use std::path::PathBuf;
use tracing::{info, warn};

mod config;
mod error;
mod loader;
mod models;
mod presentation;
mod processor;

/// Descriptive statistics and charts over the e-commerce order datasets.
#[derive(Debug, Parser)]
#[command(name = "order-dashboard", version)]
struct Cli {
    /// Dashboard configuration file (TOML).
    #[arg(long, default_value = "src/configs/dashboard.toml")]
    config: String,

    /// Directory holding the CSV datasets; overrides the config and DASHBOARD_DATA_DIR.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// First purchase date to include (YYYY-MM-DD). Defaults to the earliest order.
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Last purchase date to include (YYYY-MM-DD). Defaults to the latest order.
    #[arg(long)]
    end: Option<NaiveDate>,

    /// Include the whole end date instead of only its midnight instant.
    #[arg(long)]
    end_of_day: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    // Load environment variables
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    info!("🚀 Starting E-Commerce Dashboard");

    let mut config = DashboardConfig::load_or_default(&cli.config)
        .context("Failed to load dashboard configuration")?;
    config.apply_cli(cli.data_dir, cli.end_of_day);

    info!(
        "Loading datasets from {} (end boundary: {:?})",
        config.data.dir.display(),
        config.filter.end_boundary
    );

    let datasets = Datasets::load(&config.data)
        .with_context(|| format!("Failed to load datasets from {}", config.data.dir.display()))?;

    if datasets.orders.is_empty() {
        warn!("⚠️ Orders dataset has no rows");
    }

    let range = DateRange::resolve(cli.start, cli.end, &datasets.orders).context(
        "Orders table is empty; pass both --start and --end to choose a date range",
    )?;

    let filtered = filter_orders(&datasets.orders, range, config.filter.end_boundary)
        .context("Failed to filter orders by date range")?;

    if filtered.is_empty() {
        warn!("⚠️ No orders between {} and {}", range.start, range.end);
    } else {
        info!(
            "📦 {} orders between {} and {}",
            filtered.len(),
            range.start,
            range.end
        );
    }

    let report = build_report(&datasets, &filtered, &config.report)
        .context("Failed to build dashboard panels")?;

    println!("{}", render(&report, cli.format)?);

    info!("✅ Dashboard rendered: {} panels", report.panels.len());

    Ok(())
}
