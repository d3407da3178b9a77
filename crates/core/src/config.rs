use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::{TouchcreditError, TouchcreditResult};
use crate::types::{ModelParams, PositionWeights};

/// Root application configuration. Loaded from an optional TOML file, then
/// environment variables with the prefix `TOUCHCREDIT__`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub models: ModelsConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub mock: MockConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelsConfig {
    #[serde(default = "default_half_life_days")]
    pub half_life_days: f64,
    #[serde(default)]
    pub position: PositionWeights,
    /// Fan the five models out over the rayon pool.
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceConfig {
    /// JSON or JSON-lines touchpoint feed. Mock data is used when unset.
    #[serde(default)]
    pub input: Option<PathBuf>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MockConfig {
    #[serde(default = "default_mock_journeys")]
    pub journeys: usize,
    #[serde(default = "default_mock_seed")]
    pub seed: u64,
    #[serde(default = "default_conversion_rate")]
    pub conversion_rate: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub visualize: bool,
    /// Decimal places for numeric CSV columns; full precision when unset.
    #[serde(default)]
    pub precision: Option<usize>,
}

// Default functions
fn default_half_life_days() -> f64 {
    7.0
}
fn default_parallel() -> bool {
    true
}
fn default_mock_journeys() -> usize {
    1000
}
fn default_mock_seed() -> u64 {
    42
}
fn default_conversion_rate() -> f64 {
    0.3
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            half_life_days: default_half_life_days(),
            position: PositionWeights::default(),
            parallel: default_parallel(),
        }
    }
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            journeys: default_mock_journeys(),
            seed: default_mock_seed(),
            conversion_rate: default_conversion_rate(),
        }
    }
}

impl ModelsConfig {
    pub fn params(&self) -> ModelParams {
        ModelParams {
            half_life_days: self.half_life_days,
            position: self.position,
        }
    }
}

impl AppConfig {
    /// Load configuration from an optional TOML file and environment variables.
    /// Environment values win over the file.
    pub fn load(file: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let builder = builder.add_source(
            config::Environment::with_prefix("TOUCHCREDIT")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> TouchcreditResult<()> {
        self.models.params().validate()?;
        if !(0.0..=1.0).contains(&self.mock.conversion_rate) {
            return Err(TouchcreditError::Config(format!(
                "mock.conversion_rate must be within [0, 1], got {}",
                self.mock.conversion_rate
            )));
        }
        if let (Some(start), Some(end)) = (self.source.start_date, self.source.end_date) {
            if start > end {
                return Err(TouchcreditError::Config(format!(
                    "start_date {start} is after end_date {end}"
                )));
            }
        }
        Ok(())
    }
}
