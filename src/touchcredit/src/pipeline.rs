//! One attribution run: source → validation → engine → sinks. Every setting
//! arrives through the [`AppConfig`] argument.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Local;
use touchcredit_core::config::AppConfig;
use touchcredit_core::validate_records;
use touchcredit_journey::{DateWindow, FileSource, JourneySource, MockSource};
use touchcredit_reporting::chart::{render_bar_chart, render_heatmap};
use touchcredit_reporting::{AttributionEngine, AttributionReport};
use tracing::info;

const BAR_WIDTH: usize = 40;

pub struct RunSummary {
    pub report: AttributionReport,
    pub output: PathBuf,
    pub charts: Vec<PathBuf>,
}

pub fn run(config: &AppConfig) -> anyhow::Result<RunSummary> {
    let source: Box<dyn JourneySource> = match &config.source.input {
        Some(path) => Box::new(FileSource::new(path)),
        None => Box::new(MockSource::new(&config.mock)),
    };
    let window = DateWindow::new(config.source.start_date, config.source.end_date);

    info!(
        source = source.name(),
        windowed = !window.is_unbounded(),
        "Fetching customer journey data"
    );
    let records = source
        .fetch(&window)
        .with_context(|| format!("failed to read journeys from {}", source.name()))?;
    let touchpoints = validate_records(records)?;
    info!(touchpoints = touchpoints.len(), "Retrieved touchpoints for analysis");

    let engine = AttributionEngine::new(config.models.params())?
        .with_parallel(config.models.parallel);
    let report = AttributionReport::build(&touchpoints, &engine);

    let output = config
        .output
        .path
        .clone()
        .unwrap_or_else(default_output_path);
    write_report(&report, &output, config.output.precision)?;
    info!(path = %output.display(), "Results saved");

    let charts = if config.output.visualize {
        write_charts(&report, &output)?
    } else {
        Vec::new()
    };

    Ok(RunSummary {
        report,
        output,
        charts,
    })
}

fn default_output_path() -> PathBuf {
    PathBuf::from(format!(
        "attribution_results_{}.csv",
        Local::now().format("%Y%m%d_%H%M%S")
    ))
}

fn write_report(
    report: &AttributionReport,
    path: &Path,
    precision: Option<usize>,
) -> anyhow::Result<()> {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let body = if is_json {
        report.to_json()?
    } else {
        report.to_csv(precision)
    };
    fs::write(path, body).with_context(|| format!("failed to write {}", path.display()))
}

fn write_charts(report: &AttributionReport, output: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let dir = output.parent().unwrap_or_else(|| Path::new(""));
    let pivot = report.pivot();

    let comparison = dir.join("attribution_comparison.txt");
    fs::write(&comparison, render_bar_chart(&pivot, BAR_WIDTH))
        .with_context(|| format!("failed to write {}", comparison.display()))?;

    let heatmap = dir.join("attribution_heatmap.txt");
    fs::write(&heatmap, render_heatmap(&pivot))
        .with_context(|| format!("failed to write {}", heatmap.display()))?;

    info!(
        comparison = %comparison.display(),
        heatmap = %heatmap.display(),
        "Visualizations saved"
    );
    Ok(vec![comparison, heatmap])
}
