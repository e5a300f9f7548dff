//! Integration tests for the derived views
//!
//! These tests run the summary, series, and column-inference views over
//! datasets built through the real consolidation path and validate the
//! presentation contracts end to end.

mod common;

use common::builders::{dataset, sample, t};
use fluxvis_rs::types::{ConsolidatedDataset, FieldValue, SampleRecord};
use fluxvis_rs::views::{infer_parameter_columns, plot_points, series_for, summarize};

#[test]
fn test_summary_reflects_latest_record_per_device() {
    let ds = dataset(vec![
        sample("satellite-1", t(0), 20.0),
        sample("satellite-1", t(10), 22.12345)
            .with_field("batteryVoltage", FieldValue::Number(3.70061))
            .with_field("hoursUptime", FieldValue::Number(5.27))
            .with_field("satId", FieldValue::Number(37.0)),
        sample("satellite-2", t(5), 19.0),
    ]);

    let rows = summarize(&ds);
    assert_eq!(rows.len(), 2);

    let first = &rows[0];
    assert_eq!(first.device, "satellite-1");
    assert_eq!(first.last_seen, "2025-10-22 10:10:00");
    assert_eq!(first.temperature, Some(22.12));
    assert_eq!(first.battery_voltage, Some(3.701));
    assert_eq!(first.hours_uptime, Some(5.3));
    assert_eq!(first.sat_id, Some(37.0));

    assert_eq!(rows[1].device, "satellite-2");
    assert_eq!(rows[1].battery_voltage, None);
}

#[test]
fn test_summary_updates_after_merge() {
    let ds = dataset(vec![sample("satellite-1", t(0), 20.0)]);
    assert_eq!(summarize(&ds)[0].temperature, Some(20.0));

    let merged = ds.merge(vec![sample("satellite-1", t(5), 21.5)]);
    assert_eq!(summarize(&merged)[0].temperature, Some(21.5));
    assert_eq!(summarize(&merged)[0].last_seen, "2025-10-22 10:05:00");

    // The older snapshot still summarizes its own state
    assert_eq!(summarize(&ds)[0].temperature, Some(20.0));
}

#[test]
fn test_series_and_plot_points_for_one_device() {
    let ds = dataset(vec![
        sample("satellite-1", t(10), 22.0),
        sample("satellite-1", t(0), 20.0),
        sample("satellite-2", t(5), 19.0),
    ]);

    let series = series_for(&ds, "satellite-1");
    assert_eq!(series.len(), 2);
    assert!(series[0].time < series[1].time);

    let points = plot_points(&series, "temperature");
    assert_eq!(points.len(), 2);
    assert_eq!(points[0], [t(0).timestamp() as f64, 20.0]);
    assert_eq!(points[1], [t(10).timestamp() as f64, 22.0]);
}

#[test]
fn test_column_inference_over_a_mixed_series() {
    let series = vec![
        SampleRecord::new("satellite-1", t(0))
            .with_field("temperature", FieldValue::Number(20.0))
            .with_field("release", FieldValue::Text("fw-2.1".to_string()))
            .with_field("automatedMode", FieldValue::Flag(true)),
        SampleRecord::new("satellite-1", t(5))
            .with_field("temperature", FieldValue::Number(21.0))
            .with_field("hall", FieldValue::Flag(false))
            .with_field("rssi", FieldValue::Number(-71.0)),
    ];

    // Text-only, identifier, and absent columns drop out; flags count as
    // numeric; unknown numeric columns trail the preferred ones
    assert_eq!(
        infer_parameter_columns(&series),
        vec!["temperature", "hall", "rssi"]
    );
}

#[test]
fn test_views_over_empty_dataset() {
    let empty = ConsolidatedDataset::new();
    assert!(summarize(&empty).is_empty());
    assert!(series_for(&empty, "satellite-1").is_empty());
    assert!(infer_parameter_columns(&[]).is_empty());
    assert!(plot_points(&[], "temperature").is_empty());
}

#[test]
fn test_unknown_device_selection_is_not_an_error() {
    let ds = dataset(vec![sample("satellite-1", t(0), 20.0)]);
    let series = series_for(&ds, "satellite-9");
    assert!(series.is_empty());
    assert!(plot_points(&series, "temperature").is_empty());
}
