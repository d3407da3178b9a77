//! End-to-end flow: journey source → validation → every model → CSV.

use touchcredit_core::config::MockConfig;
use touchcredit_core::{validate_records, AttributionModel, ModelParams, TouchcreditError};
use touchcredit_journey::{DateWindow, FileSource, JourneySource, MockSource};
use touchcredit_reporting::{AttributionEngine, AttributionReport};

fn engine() -> AttributionEngine {
    AttributionEngine::new(ModelParams::default())
        .unwrap()
        .with_parallel(true)
}

#[test]
fn test_mock_feed_produces_complete_report() {
    let source = MockSource::new(&MockConfig::default());
    let records = source.fetch(&DateWindow::default()).unwrap();
    let touchpoints = validate_records(records).unwrap();

    let report = AttributionReport::build(&touchpoints, &engine());
    assert_eq!(report.journey_count, 1000);

    for (model, total) in report.model_totals() {
        assert!(total > 0.0, "{model} attributed nothing");
        let pct: f64 = report.records_for(model).map(|r| r.percentage).sum();
        assert!((pct - 100.0).abs() < 1e-6);
    }

    // Every mock channel shows up under first touch, converting or not.
    assert_eq!(report.records_for(AttributionModel::FirstTouch).count(), 6);

    // Mock journeys convert only on their last touchpoint, so first/last
    // touch, linear and time decay all distribute the same grand total.
    let totals = report.model_totals();
    for (_, total) in &totals[1..4] {
        assert!((total - totals[0].1).abs() < 1e-6);
    }
    // Two-touch journeys leak 20% under default position weights.
    assert!(totals[4].1 < totals[0].1);

    let csv = report.to_csv(Some(4));
    assert!(csv.starts_with("channel,conversion_value,model,percentage\n"));
    assert_eq!(csv.lines().count(), report.records.len() + 1);
}

#[test]
fn test_file_feed_with_null_channel() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("touchpoints.jsonl");
    std::fs::write(
        &path,
        concat!(
            r#"{"journey_id":"a","timestamp":"2023-04-01T09:00:00Z","channel":null,"conversion":false,"conversion_value":0}"#,
            "\n",
            r#"{"journey_id":"a","timestamp":"2023-04-02T09:00:00Z","channel":"email","conversion":true,"conversion_value":60}"#,
            "\n",
        ),
    )
    .unwrap();

    let records = FileSource::new(&path).fetch(&DateWindow::default()).unwrap();
    let touchpoints = validate_records(records).unwrap();
    let report = AttributionReport::build(&touchpoints, &engine());

    let pivot = report.pivot();
    assert_eq!(pivot.channels, vec!["email".to_string(), "unknown".to_string()]);
    assert_eq!(pivot.get("unknown", AttributionModel::FirstTouch), Some(100.0));
    assert_eq!(pivot.get("email", AttributionModel::Linear), Some(50.0));
}

#[test]
fn test_malformed_feed_fails_before_models_run() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("touchpoints.json");
    std::fs::write(
        &path,
        r#"[{"journey_id":"a","timestamp":"2023-04-01T09:00:00Z","channel":"email","conversion":true}]"#,
    )
    .unwrap();

    let records = FileSource::new(&path).fetch(&DateWindow::default()).unwrap();
    let err = validate_records(records).unwrap_err();
    assert!(matches!(
        err,
        TouchcreditError::MalformedTouchpoint { index: 0, field: "conversion_value" }
    ));
}
