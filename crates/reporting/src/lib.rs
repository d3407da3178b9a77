//! Multi-touch attribution — the five credit-splitting models, the report
//! assembler, and the tabular and chart renderings handed to sinks.

pub mod attribution;
pub mod chart;
pub mod report_builder;

pub use attribution::{run_all_models, run_model, AttributionEngine, ChannelCredit};
pub use report_builder::{AttributionReport, PercentagePivot};
