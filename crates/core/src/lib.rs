//! Shared domain model for touchcredit: touchpoints, journeys, attribution
//! records, model parameters, configuration and the error taxonomy.

pub mod config;
pub mod error;
pub mod journey;
pub mod types;

pub use config::AppConfig;
pub use error::{TouchcreditError, TouchcreditResult};
pub use journey::{group_journeys, validate_records, Journey};
pub use types::{
    AttributionModel, AttributionRecord, ModelParams, PositionWeights, Touchpoint,
    TouchpointRecord, UNKNOWN_CHANNEL,
};
