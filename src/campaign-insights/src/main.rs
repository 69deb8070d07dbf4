//! Campaign Insights — campaign rollups, portfolio totals and lab scores for
//! a dashboard snapshot.
//!
//! Reads a JSON snapshot, applies the configured filter, and prints the
//! dashboard report as JSON on stdout. Logs go to stderr.

use anyhow::Context;
use campaign_core::config::AppConfig;
use campaign_core::lab::Strategy;
use campaign_core::types::DashboardSnapshot;
use campaign_reporting::{build_report, AdFilter, DashboardReport};
use chrono::{DateTime, Utc};
use clap::Parser;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "campaign-insights")]
#[command(about = "Campaign insight rollups and lab metric scores for a dashboard snapshot")]
#[command(version)]
struct Cli {
    /// Path to the JSON snapshot ({campaigns, ads, lab?})
    #[arg(long, env = "CAMPAIGN_INSIGHTS__SNAPSHOT")]
    snapshot: PathBuf,

    /// Config file (defaults to ./campaign-insights.toml when present)
    #[arg(long)]
    config: Option<String>,

    /// Lab strategy to score: desktop or mobile (overrides config)
    #[arg(long)]
    strategy: Option<Strategy>,

    /// Campaign status filter (overrides config)
    #[arg(long)]
    status: Option<String>,

    /// Platform filter (overrides config)
    #[arg(long)]
    platform: Option<String>,

    /// Restrict to these campaign ids (repeatable, overrides config)
    #[arg(long = "campaign")]
    campaigns: Vec<String>,

    /// Skip lab scoring
    #[arg(long, default_value_t = false)]
    no_lab: bool,

    /// Single-line JSON output
    #[arg(long, default_value_t = false)]
    compact: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Output<'a> {
    generated_at: DateTime<Utc>,
    #[serde(flatten)]
    report: &'a DashboardReport,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Config is loaded before tracing so the configured filter applies;
    // a load failure is reported once the subscriber is up.
    let loaded = AppConfig::load(cli.config.as_deref());
    let default_filter = loaded
        .as_ref()
        .map(|c| c.log_filter.clone())
        .unwrap_or_else(|_| AppConfig::default().log_filter);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    let mut config = match loaded {
        Ok(config) => config,
        Err(e) if cli.config.is_some() => {
            return Err(e).context("failed to load config file");
        }
        Err(e) => {
            warn!(error = %e, "Failed to load config, using defaults");
            AppConfig::default()
        }
    };

    // Apply CLI overrides
    if let Some(strategy) = cli.strategy {
        config.report.strategy = strategy;
    }
    if let Some(status) = cli.status {
        config.filter.status = Some(status);
    }
    if let Some(platform) = cli.platform {
        config.filter.platform = Some(platform);
    }
    if !cli.campaigns.is_empty() {
        config.filter.campaign_ids = cli.campaigns;
    }
    if cli.no_lab {
        config.report.include_lab = false;
    }
    if cli.compact {
        config.output.pretty = false;
    }

    info!(
        snapshot = %cli.snapshot.display(),
        strategy = %config.report.strategy,
        metrics = config.report.metrics.len(),
        "Configuration loaded"
    );

    let snapshot = DashboardSnapshot::load(&cli.snapshot)
        .with_context(|| format!("failed to load snapshot {}", cli.snapshot.display()))?;

    let filter = AdFilter::from(&config.filter);
    let report = build_report(&snapshot, &filter, &config.report);

    let output = Output {
        generated_at: Utc::now(),
        report: &report,
    };
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if config.output.pretty {
        serde_json::to_writer_pretty(&mut out, &output)?;
    } else {
        serde_json::to_writer(&mut out, &output)?;
    }
    writeln!(out)?;

    Ok(())
}
