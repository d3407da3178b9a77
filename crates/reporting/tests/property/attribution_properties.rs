use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use touchcredit_core::{group_journeys, AttributionModel, ModelParams, PositionWeights, Touchpoint};
use touchcredit_reporting::attribution::{
    linear_credits, position_based_credits, time_decay_credits,
};
use touchcredit_reporting::{run_all_models, run_model, AttributionEngine};

const CHANNELS: [&str; 4] = ["email", "social", "direct", "referral"];
const TOLERANCE: f64 = 1e-6;

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap()
}

/// One journey: per-touchpoint (gap in minutes, channel index), whether it
/// converts, and its value.
fn arb_journey(id: usize) -> impl Strategy<Value = Vec<Touchpoint>> {
    (
        prop::collection::vec((0i64..20_000, 0usize..CHANNELS.len()), 1..10),
        any::<bool>(),
        0.0f64..1_000.0,
    )
        .prop_map(move |(steps, converts, value)| {
            let mut at = base();
            let last = steps.len() - 1;
            steps
                .into_iter()
                .enumerate()
                .map(|(i, (gap, channel))| {
                    at += Duration::minutes(gap);
                    let conversion = converts && i == last;
                    Touchpoint::new(
                        format!("j{id}"),
                        at,
                        CHANNELS[channel],
                        conversion,
                        if conversion { value } else { 0.0 },
                    )
                })
                .collect()
        })
}

fn arb_feed() -> impl Strategy<Value = Vec<Touchpoint>> {
    (1usize..8)
        .prop_flat_map(|n| (0..n).map(arb_journey).collect::<Vec<_>>())
        .prop_map(|journeys| journeys.into_iter().flatten().collect())
}

fn credited(credits: &[(&str, f64)]) -> f64 {
    credits.iter().map(|(_, v)| v).sum()
}

// ── Percentages sum to 100 whenever a model attributes anything ─────────

proptest! {
    #[test]
    fn percentages_sum_to_hundred(feed in arb_feed()) {
        let records = run_all_models(&feed, &ModelParams::default()).unwrap();
        for model in AttributionModel::ALL {
            let rows: Vec<_> = records.iter().filter(|r| r.model == model).collect();
            let total: f64 = rows.iter().map(|r| r.attributed_value).sum();
            let pct: f64 = rows.iter().map(|r| r.percentage).sum();
            if total > 0.0 {
                prop_assert!((pct - 100.0).abs() < TOLERANCE, "{}: {}", model, pct);
            } else {
                prop_assert!(rows.iter().all(|r| r.percentage == 0.0));
            }
        }
    }
}

// ── Linear conserves each journey's value ────────────────────────────────

proptest! {
    #[test]
    fn linear_conserves_value(tps in arb_journey(0)) {
        let journey = &group_journeys(&tps)[0];
        let credits = linear_credits(journey);
        if journey.is_converted() {
            prop_assert!((credited(&credits) - journey.conversion_value()).abs() < TOLERANCE);
        } else {
            prop_assert!(credits.is_empty());
        }
    }
}

// ── Time decay conserves value and favours later touchpoints ─────────────

proptest! {
    #[test]
    fn time_decay_conserves_and_is_monotone(
        tps in arb_journey(0),
        half_life in 0.5f64..30.0,
    ) {
        let journey = &group_journeys(&tps)[0];
        let credits = time_decay_credits(journey, half_life);
        if journey.is_converted() {
            prop_assert!((credited(&credits) - journey.conversion_value()).abs() < TOLERANCE);
            for pair in credits.windows(2) {
                prop_assert!(pair[0].1 <= pair[1].1 + TOLERANCE);
            }
        }
    }
}

// ── Position-based conserves value when the weights sum to one ───────────

proptest! {
    #[test]
    fn position_based_conserves_with_unit_weights(
        tps in arb_journey(0),
        first in 0.0f64..0.5,
        last in 0.0f64..0.5,
    ) {
        let weights = PositionWeights { first, middle: 1.0 - first - last, last };
        let journey = &group_journeys(&tps)[0];
        let credits = position_based_credits(journey, &weights);
        if journey.is_converted() && journey.len() != 2 {
            prop_assert!((credited(&credits) - journey.conversion_value()).abs() < TOLERANCE);
        }
        if journey.is_converted() && journey.len() == 2 {
            let expected = (first + last) * journey.conversion_value();
            prop_assert!((credited(&credits) - expected).abs() < TOLERANCE);
        }
    }
}

// ── First and last touch agree on single-touchpoint journeys ─────────────

proptest! {
    #[test]
    fn single_touch_first_equals_last(
        channel in 0usize..CHANNELS.len(),
        converts in any::<bool>(),
        value in 0.0f64..500.0,
    ) {
        let tps = vec![Touchpoint::new("solo", base(), CHANNELS[channel], converts, value)];
        let params = ModelParams::default();
        let first = run_model(AttributionModel::FirstTouch, &tps, &params).unwrap();
        let last = run_model(AttributionModel::LastTouch, &tps, &params).unwrap();
        prop_assert_eq!(first.len(), 1);
        prop_assert_eq!(&first[0].channel, &last[0].channel);
        prop_assert_eq!(first[0].attributed_value, last[0].attributed_value);
    }
}

// ── Parallel and sequential assembly agree ──────────────────────────────

proptest! {
    #[test]
    fn parallel_assembly_is_deterministic(feed in arb_feed()) {
        let journeys = group_journeys(&feed);
        let engine = AttributionEngine::new(ModelParams::default()).unwrap();
        let sequential = engine.assemble(&journeys);
        let parallel = engine.with_parallel(true).assemble(&journeys);
        prop_assert_eq!(sequential, parallel);
    }
}
