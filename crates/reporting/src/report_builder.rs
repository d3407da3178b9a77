//! Attribution report — the assembled cross-model table plus the exports
//! (CSV, JSON) and the channel × model pivot consumed by charts.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::Serialize;
use touchcredit_core::{
    group_journeys, AttributionModel, AttributionRecord, ModelParams, Touchpoint,
};
use tracing::info;
use uuid::Uuid;

use crate::attribution::AttributionEngine;

/// Sink column order.
pub const CSV_COLUMNS: [&str; 4] = ["channel", "conversion_value", "model", "percentage"];

#[derive(Debug, Clone, Serialize)]
pub struct AttributionReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub journey_count: usize,
    pub touchpoint_count: usize,
    pub params: ModelParams,
    pub records: Vec<AttributionRecord>,
}

impl AttributionReport {
    /// Group the touchpoints, run every model and collect the rows.
    pub fn build(touchpoints: &[Touchpoint], engine: &AttributionEngine) -> Self {
        let journeys = group_journeys(touchpoints);
        let records = engine.assemble(&journeys);

        metrics::counter!("attribution.touchpoints").increment(touchpoints.len() as u64);

        let report = Self {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            journey_count: journeys.len(),
            touchpoint_count: touchpoints.len(),
            params: *engine.params(),
            records,
        };
        info!(
            run_id = %report.run_id,
            journeys = report.journey_count,
            touchpoints = report.touchpoint_count,
            rows = report.records.len(),
            "Attribution report assembled"
        );
        report
    }

    pub fn records_for(
        &self,
        model: AttributionModel,
    ) -> impl Iterator<Item = &AttributionRecord> {
        self.records.iter().filter(move |r| r.model == model)
    }

    /// Total attributed value per model, in canonical model order.
    pub fn model_totals(&self) -> Vec<(AttributionModel, f64)> {
        AttributionModel::ALL
            .iter()
            .map(|model| {
                let total: f64 = self.records_for(*model).map(|r| r.attributed_value).sum();
                (*model, total)
            })
            .collect()
    }

    /// Every channel that appears under any model, sorted.
    pub fn channels(&self) -> Vec<&str> {
        self.records
            .iter()
            .map(|r| r.channel.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn pivot(&self) -> PercentagePivot {
        PercentagePivot::from_records(&self.records)
    }

    /// Render the rows as delimited text. `precision` fixes the decimal places
    /// of the numeric columns; `None` keeps full precision.
    pub fn to_csv(&self, precision: Option<usize>) -> String {
        let mut csv = CSV_COLUMNS.join(",");
        csv.push('\n');
        for record in &self.records {
            let cells = [
                escape_csv_field(&record.channel),
                format_number(record.attributed_value, precision),
                record.model.to_string(),
                format_number(record.percentage, precision),
            ];
            csv.push_str(&cells.join(","));
            csv.push('\n');
        }
        csv
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.records)
    }
}

fn format_number(value: f64, precision: Option<usize>) -> String {
    match precision {
        Some(places) => format!("{value:.places$}"),
        None => value.to_string(),
    }
}

fn escape_csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Channel × model matrix of percentages. Absent combinations read as zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PercentagePivot {
    pub channels: Vec<String>,
    pub models: Vec<AttributionModel>,
    /// `cells[channel][model]`, indexed like `channels` and `models`.
    pub cells: Vec<Vec<f64>>,
}

impl PercentagePivot {
    pub fn from_records(records: &[AttributionRecord]) -> Self {
        let mut by_channel: BTreeMap<&str, BTreeMap<AttributionModel, f64>> = BTreeMap::new();
        for record in records {
            *by_channel
                .entry(record.channel.as_str())
                .or_default()
                .entry(record.model)
                .or_insert(0.0) += record.percentage;
        }

        let models = AttributionModel::ALL.to_vec();
        let mut channels = Vec::with_capacity(by_channel.len());
        let mut cells = Vec::with_capacity(by_channel.len());
        for (channel, row) in by_channel {
            channels.push(channel.to_string());
            cells.push(
                models
                    .iter()
                    .map(|m| row.get(m).copied().unwrap_or(0.0))
                    .collect(),
            );
        }
        Self { channels, models, cells }
    }

    pub fn get(&self, channel: &str, model: AttributionModel) -> Option<f64> {
        let row = self.channels.iter().position(|c| c == channel)?;
        let col = self.models.iter().position(|m| *m == model)?;
        Some(self.cells[row][col])
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Largest cell value, zero for an empty pivot.
    pub fn max_value(&self) -> f64 {
        self.cells.iter().flatten().copied().fold(0.0, f64::max)
    }
}
