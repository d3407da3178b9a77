//! Synthetic journey feed for demos and tests. Seeded, so the same
//! configuration always yields the same touchpoints.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use touchcredit_core::config::MockConfig;
use touchcredit_core::{TouchcreditResult, Touchpoint, TouchpointRecord};
use tracing::info;

use crate::source::{DateWindow, JourneySource};

pub const CHANNELS: [&str; 6] = [
    "organic_search",
    "paid_search",
    "social",
    "email",
    "direct",
    "referral",
];

/// 2023-01-01T00:00:00Z; journeys start within the following 180 days.
const MOCK_EPOCH_SECS: i64 = 1_672_531_200;

const CAMPAIGNS: [Option<&str>; 5] = [
    Some("summer_sale"),
    Some("product_launch"),
    Some("brand_awareness"),
    Some("retargeting"),
    None,
];

pub struct MockSource {
    journeys: usize,
    seed: u64,
    conversion_rate: f64,
}

impl MockSource {
    pub fn new(config: &MockConfig) -> Self {
        Self {
            journeys: config.journeys,
            seed: config.seed,
            conversion_rate: config.conversion_rate,
        }
    }

    /// Generate the full feed, ignoring any date window.
    pub fn generate(&self) -> Vec<Touchpoint> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let epoch = DateTime::<Utc>::default() + Duration::seconds(MOCK_EPOCH_SECS);
        let mut touchpoints = Vec::new();

        for journey in 1..=self.journeys {
            let converts = rng.gen::<f64>() < self.conversion_rate;
            let count = rng.gen_range(1..9);
            let mut at = epoch + Duration::days(rng.gen_range(0..180));

            for i in 0..count {
                at += Duration::hours(rng.gen_range(1..24 * 7));
                let channel = *CHANNELS.choose(&mut rng).unwrap_or(&"direct");
                let campaign = CAMPAIGNS.choose(&mut rng).copied().flatten();
                let (source, medium) = source_and_medium(channel, &mut rng);

                // Only the closing touchpoint of a converting journey converts.
                let conversion = converts && i == count - 1;
                let value = if conversion {
                    rng.gen_range(50..=500) as f64
                } else {
                    0.0
                };

                let mut tp = Touchpoint::new(
                    format!("journey_{journey}"),
                    at,
                    channel,
                    conversion,
                    value,
                );
                tp.customer_id = Some(format!("cust_{}", journey % 500 + 1));
                tp.touchpoint_id = Some(format!("tp_{}_{}", journey, i + 1));
                tp.campaign = campaign.map(str::to_string);
                tp.source = Some(source.to_string());
                tp.medium = Some(medium.to_string());
                touchpoints.push(tp);
            }
        }
        touchpoints
    }
}

fn pick(options: &[&'static str], rng: &mut StdRng) -> &'static str {
    options.choose(rng).copied().unwrap_or(options[0])
}

fn source_and_medium(channel: &str, rng: &mut StdRng) -> (&'static str, &'static str) {
    match channel {
        "organic_search" => (pick(&["google", "bing", "yahoo"], rng), "organic"),
        "paid_search" => (pick(&["google", "bing", "yahoo"], rng), "cpc"),
        "social" => {
            let source = pick(&["facebook", "instagram", "twitter", "linkedin"], rng);
            (source, pick(&["organic", "paid"], rng))
        }
        "email" => ("email", pick(&["newsletter", "promotion", "transactional"], rng)),
        "direct" => ("(direct)", "(none)"),
        _ => (pick(&["partner_site", "blog", "news", "review_site"], rng), "referral"),
    }
}

impl JourneySource for MockSource {
    fn name(&self) -> &str {
        "mock"
    }

    fn fetch(&self, window: &DateWindow) -> TouchcreditResult<Vec<TouchpointRecord>> {
        let records: Vec<TouchpointRecord> = self
            .generate()
            .into_iter()
            .filter(|tp| window.contains(tp.timestamp))
            .map(TouchpointRecord::from)
            .collect();

        info!(
            journeys = self.journeys,
            seed = self.seed,
            records = records.len(),
            "Generated mock touchpoints"
        );
        Ok(records)
    }
}
