//! Plain-text charts over a [`PercentagePivot`]: a grouped bar chart and a
//! shaded heatmap, written alongside the tabular export.

use std::fmt::Write;

use crate::report_builder::PercentagePivot;

const SHADES: [char; 5] = [' ', '░', '▒', '▓', '█'];

/// One block of bars per channel, one bar per model, scaled so 100% spans
/// `width` cells.
pub fn render_bar_chart(pivot: &PercentagePivot, width: usize) -> String {
    let mut out = String::from("Channel Attribution by Model (%)\n\n");
    if pivot.is_empty() {
        out.push_str("(no attributed channels)\n");
        return out;
    }

    let label_width = pivot.models.iter().map(|m| m.as_str().len()).max().unwrap_or(0);
    for (channel, row) in pivot.channels.iter().zip(&pivot.cells) {
        let _ = writeln!(out, "{channel}");
        for (model, pct) in pivot.models.iter().zip(row) {
            let filled = ((pct.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
            let _ = writeln!(
                out,
                "  {:<label_width$} |{}{} {:>6.1}",
                model.as_str(),
                "█".repeat(filled),
                " ".repeat(width.saturating_sub(filled)),
                pct,
            );
        }
    }
    out
}

/// Channel rows against model columns, each cell showing the percentage and
/// a shade relative to the largest cell.
pub fn render_heatmap(pivot: &PercentagePivot) -> String {
    let mut out = String::from("Attribution Heatmap (%)\n\n");
    if pivot.is_empty() {
        out.push_str("(no attributed channels)\n");
        return out;
    }

    let channel_width = pivot
        .channels
        .iter()
        .map(String::len)
        .max()
        .unwrap_or(0)
        .max("channel".len());
    let col_width = pivot
        .models
        .iter()
        .map(|m| m.as_str().len())
        .max()
        .unwrap_or(0)
        .max(8);

    let _ = write!(out, "{:<channel_width$}", "channel");
    for model in &pivot.models {
        let _ = write!(out, " | {:>col_width$}", model.as_str());
    }
    out.push('\n');

    let max = pivot.max_value();
    for (channel, row) in pivot.channels.iter().zip(&pivot.cells) {
        let _ = write!(out, "{channel:<channel_width$}");
        for pct in row {
            let cell = format!("{} {:.1}", shade(*pct, max), pct);
            let _ = write!(out, " | {cell:>col_width$}");
        }
        out.push('\n');
    }
    out
}

fn shade(value: f64, max: f64) -> char {
    if max <= 0.0 || value <= 0.0 {
        return SHADES[0];
    }
    let idx = ((value / max) * (SHADES.len() - 1) as f64).ceil() as usize;
    SHADES[idx.min(SHADES.len() - 1)]
}
