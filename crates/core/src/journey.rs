//! Journey grouping — turns a flat touchpoint feed into per-journey,
//! timestamp-ordered sequences.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::TouchcreditResult;
use crate::types::{Touchpoint, TouchpointRecord};

/// The touchpoints sharing one `journey_id`, ordered by timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct Journey {
    pub journey_id: String,
    touchpoints: Vec<Touchpoint>,
}

impl Journey {
    /// Build a journey from its touchpoints. Sorting is stable, so equal
    /// timestamps keep their feed order.
    pub fn new(journey_id: impl Into<String>, mut touchpoints: Vec<Touchpoint>) -> Self {
        touchpoints.sort_by_key(|tp| tp.timestamp);
        Self {
            journey_id: journey_id.into(),
            touchpoints,
        }
    }

    pub fn touchpoints(&self) -> &[Touchpoint] {
        &self.touchpoints
    }

    pub fn len(&self) -> usize {
        self.touchpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.touchpoints.is_empty()
    }

    pub fn first(&self) -> Option<&Touchpoint> {
        self.touchpoints.first()
    }

    pub fn last(&self) -> Option<&Touchpoint> {
        self.touchpoints.last()
    }

    pub fn is_converted(&self) -> bool {
        self.touchpoints.iter().any(|tp| tp.conversion)
    }

    /// Value realised by the journey: the largest touchpoint value when the
    /// journey converted, zero otherwise.
    pub fn conversion_value(&self) -> f64 {
        if !self.is_converted() {
            return 0.0;
        }
        self.touchpoints
            .iter()
            .map(|tp| tp.conversion_value)
            .fold(0.0, f64::max)
    }

    /// Timestamp of the final touchpoint, used as the conversion time.
    pub fn conversion_time(&self) -> Option<DateTime<Utc>> {
        self.last().map(|tp| tp.timestamp)
    }
}

/// Validate every raw record, failing on the first malformed one.
pub fn validate_records(records: Vec<TouchpointRecord>) -> TouchcreditResult<Vec<Touchpoint>> {
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| record.validate(index))
        .collect()
}

/// Group touchpoints by journey id. Journeys come back ordered by id.
pub fn group_journeys(touchpoints: &[Touchpoint]) -> Vec<Journey> {
    let mut grouped: BTreeMap<&str, Vec<Touchpoint>> = BTreeMap::new();
    for tp in touchpoints {
        grouped.entry(tp.journey_id.as_str()).or_default().push(tp.clone());
    }
    let journeys: Vec<Journey> = grouped
        .into_iter()
        .map(|(id, tps)| Journey::new(id, tps))
        .collect();
    debug!(
        touchpoints = touchpoints.len(),
        journeys = journeys.len(),
        "Grouped touchpoints into journeys"
    );
    journeys
}
