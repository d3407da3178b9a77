//! touchcredit — multi-touch marketing attribution.
//!
//! Entry point that loads configuration, pulls the journey feed, runs the five
//! attribution models and hands the report to the file sinks.

mod pipeline;

use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::Parser;
use touchcredit_core::config::AppConfig;
use touchcredit_core::AttributionModel;
use tracing::{info, warn};

const DEFAULT_LOG_FILTER: &str =
    "touchcredit=info,touchcredit_journey=info,touchcredit_reporting=info";

#[derive(Parser, Debug)]
#[command(name = "touchcredit")]
#[command(about = "Multi-touch marketing attribution across five credit models")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(long, env = "TOUCHCREDIT_CONFIG")]
    config: Option<PathBuf>,

    /// Touchpoint feed (.json array or .jsonl); mock data when omitted
    #[arg(long, conflicts_with = "mock")]
    input: Option<PathBuf>,

    /// Use the synthetic journey generator
    #[arg(long, default_value_t = false)]
    mock: bool,

    /// First day to include (YYYY-MM-DD)
    #[arg(long)]
    start_date: Option<NaiveDate>,

    /// Last day to include (YYYY-MM-DD)
    #[arg(long)]
    end_date: Option<NaiveDate>,

    /// Output file; a .json extension selects JSON, anything else CSV
    #[arg(long)]
    output: Option<PathBuf>,

    /// Write text charts next to the output
    #[arg(long, default_value_t = false)]
    visualize: bool,

    /// Time-decay half-life in days (overrides config)
    #[arg(long)]
    half_life: Option<f64>,

    /// Position-based weight of the first touchpoint (overrides config)
    #[arg(long)]
    first_weight: Option<f64>,

    /// Position-based weight shared by middle touchpoints (overrides config)
    #[arg(long)]
    middle_weight: Option<f64>,

    /// Position-based weight of the last touchpoint (overrides config)
    #[arg(long)]
    last_weight: Option<f64>,

    /// Mock generator seed (overrides config)
    #[arg(long)]
    seed: Option<u64>,

    /// Number of mock journeys (overrides config)
    #[arg(long)]
    journeys: Option<usize>,

    /// Decimal places for numeric CSV columns
    #[arg(long)]
    precision: Option<usize>,

    /// Run the models one after another instead of in parallel
    #[arg(long, default_value_t = false)]
    sequential: bool,

    /// Print the available attribution models and exit
    #[arg(long, default_value_t = false)]
    list_models: bool,
}

impl Cli {
    fn apply(self, config: &mut AppConfig) {
        if let Some(input) = self.input {
            config.source.input = Some(input);
        }
        if self.mock {
            config.source.input = None;
        }
        if self.start_date.is_some() {
            config.source.start_date = self.start_date;
        }
        if self.end_date.is_some() {
            config.source.end_date = self.end_date;
        }
        if let Some(output) = self.output {
            config.output.path = Some(output);
        }
        if self.visualize {
            config.output.visualize = true;
        }
        if self.precision.is_some() {
            config.output.precision = self.precision;
        }
        if let Some(half_life) = self.half_life {
            config.models.half_life_days = half_life;
        }
        if let Some(weight) = self.first_weight {
            config.models.position.first = weight;
        }
        if let Some(weight) = self.middle_weight {
            config.models.position.middle = weight;
        }
        if let Some(weight) = self.last_weight {
            config.models.position.last = weight;
        }
        if let Some(seed) = self.seed {
            config.mock.seed = seed;
        }
        if let Some(journeys) = self.journeys {
            config.mock.journeys = journeys;
        }
        if self.sequential {
            config.models.parallel = false;
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .json()
        .init();

    let cli = Cli::parse();

    if cli.list_models {
        for model in AttributionModel::ALL {
            println!(
                "{:<16} {:<28} {}",
                model.as_str(),
                model.display_name(),
                model.description()
            );
        }
        return Ok(());
    }

    // Load configuration
    let mut config = match cli.config.as_deref() {
        Some(path) => AppConfig::load(Some(path))
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => AppConfig::load(None).unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load config, using defaults");
            AppConfig::default()
        }),
    };

    cli.apply(&mut config);
    config.validate()?;

    info!(
        input = ?config.source.input,
        start_date = ?config.source.start_date,
        end_date = ?config.source.end_date,
        half_life_days = config.models.half_life_days,
        parallel = config.models.parallel,
        "Configuration loaded"
    );

    let summary = pipeline::run(&config)?;

    info!(
        output = %summary.output.display(),
        charts = summary.charts.len(),
        rows = summary.report.records.len(),
        "Attribution run complete"
    );

    Ok(())
}
