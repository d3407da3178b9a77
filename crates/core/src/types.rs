use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{TouchcreditError, TouchcreditResult};

/// Bucket for touchpoints whose channel label is null or blank.
pub const UNKNOWN_CHANNEL: &str = "unknown";

// ─── Touchpoints ────────────────────────────────────────────────────────────

/// A validated customer interaction with a marketing channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Touchpoint {
    pub journey_id: String,
    pub timestamp: DateTime<Utc>,
    pub channel: String,
    pub conversion: bool,
    pub conversion_value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub touchpoint_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium: Option<String>,
}

impl Touchpoint {
    /// Minimal touchpoint without the descriptive feed fields.
    pub fn new(
        journey_id: impl Into<String>,
        timestamp: DateTime<Utc>,
        channel: impl Into<String>,
        conversion: bool,
        conversion_value: f64,
    ) -> Self {
        Self {
            journey_id: journey_id.into(),
            timestamp,
            channel: channel.into(),
            conversion,
            conversion_value,
            customer_id: None,
            touchpoint_id: None,
            campaign: None,
            source: None,
            medium: None,
        }
    }
}

/// A touchpoint as it arrives from a journey source, before validation.
///
/// `channel` is doubly optional: the outer `None` means the key was absent,
/// `Some(None)` means it was present but null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TouchpointRecord {
    #[serde(default)]
    pub journey_id: Option<String>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub channel: Option<Option<String>>,
    #[serde(default)]
    pub conversion: Option<bool>,
    #[serde(default)]
    pub conversion_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub touchpoint_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium: Option<String>,
}

fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl TouchpointRecord {
    /// Check required fields and produce a [`Touchpoint`]. `index` is the
    /// record's position in the feed and is reported on failure.
    pub fn validate(self, index: usize) -> TouchcreditResult<Touchpoint> {
        let missing = |field| TouchcreditError::MalformedTouchpoint { index, field };

        let journey_id = self.journey_id.ok_or_else(|| missing("journey_id"))?;
        let timestamp = self.timestamp.ok_or_else(|| missing("timestamp"))?;
        let channel = self.channel.ok_or_else(|| missing("channel"))?;
        let conversion_value = self
            .conversion_value
            .ok_or_else(|| missing("conversion_value"))?;

        let channel = match channel {
            Some(label) if !label.trim().is_empty() => label,
            _ => UNKNOWN_CHANNEL.to_string(),
        };

        Ok(Touchpoint {
            journey_id,
            timestamp,
            channel,
            conversion: self.conversion.unwrap_or(false),
            conversion_value,
            customer_id: self.customer_id,
            touchpoint_id: self.touchpoint_id,
            campaign: self.campaign,
            source: self.source,
            medium: self.medium,
        })
    }
}

impl From<Touchpoint> for TouchpointRecord {
    fn from(tp: Touchpoint) -> Self {
        Self {
            journey_id: Some(tp.journey_id),
            timestamp: Some(tp.timestamp),
            channel: Some(Some(tp.channel)),
            conversion: Some(tp.conversion),
            conversion_value: Some(tp.conversion_value),
            customer_id: tp.customer_id,
            touchpoint_id: tp.touchpoint_id,
            campaign: tp.campaign,
            source: tp.source,
            medium: tp.medium,
        }
    }
}

// ─── Models ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributionModel {
    FirstTouch,
    LastTouch,
    Linear,
    TimeDecay,
    PositionBased,
}

impl AttributionModel {
    /// Canonical report order.
    pub const ALL: [AttributionModel; 5] = [
        AttributionModel::FirstTouch,
        AttributionModel::LastTouch,
        AttributionModel::Linear,
        AttributionModel::TimeDecay,
        AttributionModel::PositionBased,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstTouch => "first_touch",
            Self::LastTouch => "last_touch",
            Self::Linear => "linear",
            Self::TimeDecay => "time_decay",
            Self::PositionBased => "position_based",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::FirstTouch => "First Touch Attribution",
            Self::LastTouch => "Last Touch Attribution",
            Self::Linear => "Linear Attribution",
            Self::TimeDecay => "Time Decay Attribution",
            Self::PositionBased => "Position Based Attribution",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::FirstTouch => "Credits the first touchpoint",
            Self::LastTouch => "Credits the last touchpoint",
            Self::Linear => "Distributes credit equally",
            Self::TimeDecay => "More recent touchpoints get more credit",
            Self::PositionBased => "40/20/40 credit for first, middle, and last",
        }
    }

    /// Whether the model only looks at journeys that ended in a conversion.
    pub fn requires_conversion(&self) -> bool {
        !matches!(self, Self::FirstTouch | Self::LastTouch)
    }
}

impl fmt::Display for AttributionModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttributionModel {
    type Err = TouchcreditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == normalized)
            .ok_or_else(|| TouchcreditError::UnknownModel(s.to_string()))
    }
}

// ─── Parameters ─────────────────────────────────────────────────────────────

/// Position-based weights, applied as fractions of the conversion value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionWeights {
    #[serde(default = "default_first_weight")]
    pub first: f64,
    #[serde(default = "default_middle_weight")]
    pub middle: f64,
    #[serde(default = "default_last_weight")]
    pub last: f64,
}

fn default_first_weight() -> f64 {
    0.4
}

fn default_middle_weight() -> f64 {
    0.2
}

fn default_last_weight() -> f64 {
    0.4
}

impl Default for PositionWeights {
    fn default() -> Self {
        Self {
            first: default_first_weight(),
            middle: default_middle_weight(),
            last: default_last_weight(),
        }
    }
}

/// Tunables shared by the parameterised models.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    #[serde(default = "default_half_life_days")]
    pub half_life_days: f64,
    #[serde(default)]
    pub position: PositionWeights,
}

fn default_half_life_days() -> f64 {
    7.0
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            half_life_days: default_half_life_days(),
            position: PositionWeights::default(),
        }
    }
}

impl ModelParams {
    pub fn validate(&self) -> TouchcreditResult<()> {
        if !self.half_life_days.is_finite() || self.half_life_days <= 0.0 {
            return Err(TouchcreditError::InvalidParameter(format!(
                "half_life_days must be positive, got {}",
                self.half_life_days
            )));
        }
        let weights = [
            ("first", self.position.first),
            ("middle", self.position.middle),
            ("last", self.position.last),
        ];
        for (name, weight) in weights {
            if !weight.is_finite() || weight < 0.0 {
                return Err(TouchcreditError::InvalidParameter(format!(
                    "{name} position weight must be non-negative, got {weight}"
                )));
            }
        }
        Ok(())
    }
}

// ─── Output ─────────────────────────────────────────────────────────────────

/// One row of the attribution report. The attributed value serializes as
/// `conversion_value` to keep the sink's column contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributionRecord {
    pub channel: String,
    #[serde(rename = "conversion_value")]
    pub attributed_value: f64,
    pub model: AttributionModel,
    pub percentage: f64,
}
