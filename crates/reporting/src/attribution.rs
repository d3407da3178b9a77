//! Revenue attribution — splits each journey's conversion value across the
//! channels that touched it, under five position- and time-aware policies.

use std::collections::BTreeMap;

use rayon::prelude::*;
use touchcredit_core::{
    group_journeys, AttributionModel, AttributionRecord, Journey, ModelParams, PositionWeights,
    TouchcreditResult, Touchpoint,
};
use tracing::debug;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Attributed value per channel, ordered by channel name.
pub type ChannelCredit = BTreeMap<String, f64>;

// ─── Per-journey policies ───────────────────────────────────────────────────

/// Full journey value to the earliest touchpoint. Applies to every journey;
/// non-converting ones credit zero.
pub fn first_touch_credits(journey: &Journey) -> Vec<(&str, f64)> {
    journey
        .first()
        .map(|tp| vec![(tp.channel.as_str(), journey.conversion_value())])
        .unwrap_or_default()
}

/// Full journey value to the latest touchpoint.
pub fn last_touch_credits(journey: &Journey) -> Vec<(&str, f64)> {
    journey
        .last()
        .map(|tp| vec![(tp.channel.as_str(), journey.conversion_value())])
        .unwrap_or_default()
}

/// Equal share to every touchpoint of a converting journey.
pub fn linear_credits(journey: &Journey) -> Vec<(&str, f64)> {
    if !journey.is_converted() {
        return Vec::new();
    }
    let share = journey.conversion_value() / journey.len() as f64;
    journey
        .touchpoints()
        .iter()
        .map(|tp| (tp.channel.as_str(), share))
        .collect()
}

/// Exponential decay towards the conversion: `2^(-days_before / half_life)`,
/// normalised so the journey's weights sum to one.
pub fn time_decay_credits(journey: &Journey, half_life_days: f64) -> Vec<(&str, f64)> {
    if !journey.is_converted() {
        return Vec::new();
    }
    let Some(conversion_time) = journey.conversion_time() else {
        return Vec::new();
    };

    let weights: Vec<f64> = journey
        .touchpoints()
        .iter()
        .map(|tp| {
            let seconds = (conversion_time - tp.timestamp).num_milliseconds() as f64 / 1000.0;
            let days_before = seconds / SECONDS_PER_DAY;
            2f64.powf(-days_before / half_life_days)
        })
        .collect();

    // The closing touchpoint weighs 1.0, so the total is never zero.
    let total: f64 = weights.iter().sum();
    let value = journey.conversion_value();

    journey
        .touchpoints()
        .iter()
        .zip(weights)
        .map(|(tp, weight)| (tp.channel.as_str(), weight / total * value))
        .collect()
}

/// Fraction of the conversion value each position receives for a journey of
/// `len` touchpoints.
///
/// A lone touchpoint takes everything. Two touchpoints take `first` and `last`
/// as-is, without renormalising. Longer journeys split `middle` evenly over
/// the interior touchpoints.
pub fn position_weights(len: usize, weights: &PositionWeights) -> Vec<f64> {
    match len {
        0 => Vec::new(),
        1 => vec![1.0],
        2 => vec![weights.first, weights.last],
        n => {
            let middle_each = weights.middle / (n - 2) as f64;
            let mut out = Vec::with_capacity(n);
            out.push(weights.first);
            out.extend(std::iter::repeat(middle_each).take(n - 2));
            out.push(weights.last);
            out
        }
    }
}

pub fn position_based_credits<'a>(
    journey: &'a Journey,
    weights: &PositionWeights,
) -> Vec<(&'a str, f64)> {
    if !journey.is_converted() {
        return Vec::new();
    }
    let value = journey.conversion_value();
    journey
        .touchpoints()
        .iter()
        .zip(position_weights(journey.len(), weights))
        .map(|(tp, weight)| (tp.channel.as_str(), weight * value))
        .collect()
}

// ─── Aggregation ────────────────────────────────────────────────────────────

fn aggregate<'a>(credits: impl IntoIterator<Item = (&'a str, f64)>) -> ChannelCredit {
    let mut table = ChannelCredit::new();
    for (channel, value) in credits {
        *table.entry(channel.to_string()).or_insert(0.0) += value;
    }
    table
}

/// Turn a channel table into report rows. Percentages are each channel's
/// share of the model total; a zero total reports zero everywhere.
pub fn to_records(model: AttributionModel, credit: ChannelCredit) -> Vec<AttributionRecord> {
    let total: f64 = credit.values().sum();
    credit
        .into_iter()
        .map(|(channel, attributed_value)| AttributionRecord {
            percentage: if total > 0.0 {
                attributed_value / total * 100.0
            } else {
                0.0
            },
            channel,
            attributed_value,
            model,
        })
        .collect()
}

// ─── Engine ─────────────────────────────────────────────────────────────────

/// Runs attribution models over pre-grouped journeys. Holds only the model
/// parameters; every call is a pure function of its input.
#[derive(Debug, Clone)]
pub struct AttributionEngine {
    params: ModelParams,
    parallel: bool,
}

impl AttributionEngine {
    pub fn new(params: ModelParams) -> TouchcreditResult<Self> {
        params.validate()?;
        Ok(Self {
            params,
            parallel: false,
        })
    }

    /// Evaluate the models concurrently in [`assemble`](Self::assemble).
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn params(&self) -> &ModelParams {
        &self.params
    }

    pub fn journey_credits<'a>(
        &self,
        model: AttributionModel,
        journey: &'a Journey,
    ) -> Vec<(&'a str, f64)> {
        match model {
            AttributionModel::FirstTouch => first_touch_credits(journey),
            AttributionModel::LastTouch => last_touch_credits(journey),
            AttributionModel::Linear => linear_credits(journey),
            AttributionModel::TimeDecay => {
                time_decay_credits(journey, self.params.half_life_days)
            }
            AttributionModel::PositionBased => {
                position_based_credits(journey, &self.params.position)
            }
        }
    }

    /// Channel table for one model. Conversion-only models skip browsing
    /// journeys up front.
    pub fn credit(&self, model: AttributionModel, journeys: &[Journey]) -> ChannelCredit {
        let needs_conversion = model.requires_conversion();
        aggregate(
            journeys
                .iter()
                .filter(|journey| !needs_conversion || journey.is_converted())
                .flat_map(|journey| self.journey_credits(model, journey)),
        )
    }

    pub fn attribute(
        &self,
        model: AttributionModel,
        journeys: &[Journey],
    ) -> Vec<AttributionRecord> {
        let records = to_records(model, self.credit(model, journeys));
        debug!(model = %model, channels = records.len(), "Model evaluated");
        records
    }

    /// Run all five models and concatenate their tables in canonical order.
    pub fn assemble(&self, journeys: &[Journey]) -> Vec<AttributionRecord> {
        let tables: Vec<Vec<AttributionRecord>> = if self.parallel {
            AttributionModel::ALL[..]
                .par_iter()
                .map(|model| self.attribute(*model, journeys))
                .collect()
        } else {
            AttributionModel::ALL
                .iter()
                .map(|model| self.attribute(*model, journeys))
                .collect()
        };

        let records: Vec<AttributionRecord> = tables.into_iter().flatten().collect();
        metrics::counter!("attribution.journeys").increment(journeys.len() as u64);
        metrics::counter!("attribution.records").increment(records.len() as u64);
        records
    }
}

/// Attribute a flat touchpoint collection under a single model.
pub fn run_model(
    model: AttributionModel,
    touchpoints: &[Touchpoint],
    params: &ModelParams,
) -> TouchcreditResult<Vec<AttributionRecord>> {
    let engine = AttributionEngine::new(*params)?;
    Ok(engine.attribute(model, &group_journeys(touchpoints)))
}

/// Attribute a flat touchpoint collection under every model.
pub fn run_all_models(
    touchpoints: &[Touchpoint],
    params: &ModelParams,
) -> TouchcreditResult<Vec<AttributionRecord>> {
    let engine = AttributionEngine::new(*params)?;
    Ok(engine.assemble(&group_journeys(touchpoints)))
}
