//! Per-device time series for charting
//!
//! Extracts one device's chronological sample sequence from the
//! consolidated dataset and turns parameters into plot points. An unknown
//! device is a valid state (it may be selected before its first sample
//! arrives) and yields an empty series, never an error.

use crate::types::{ConsolidatedDataset, SampleRecord};

/// The full chronological sample sequence for one device
///
/// Order is inherited from the dataset invariant, but the records are
/// re-sorted defensively so the function is also correct over a record
/// slice of unknown provenance.
pub fn series_for(dataset: &ConsolidatedDataset, device: &str) -> Vec<SampleRecord> {
    let mut series: Vec<SampleRecord> = dataset
        .records()
        .iter()
        .filter(|r| r.device == device)
        .cloned()
        .collect();
    series.sort_by_key(|r| r.time);
    series
}

/// Plot points `[unix_seconds, value]` for one parameter of a series
///
/// Records where the parameter is absent or non-numeric are skipped, so a
/// partially present parameter plots as a sparser trace rather than as
/// zeros.
pub fn plot_points(series: &[SampleRecord], parameter: &str) -> Vec<[f64; 2]> {
    series
        .iter()
        .filter_map(|record| {
            record.numeric(parameter).map(|value| {
                let seconds = record.time.timestamp() as f64
                    + f64::from(record.time.timestamp_subsec_nanos()) / 1e9;
                [seconds, value]
            })
        })
        .collect()
}
