//! Per-device latest-status summary
//!
//! Derives one row per distinct device from the consolidated dataset: the
//! device's most recent record plus a formatted last-seen time. The summary
//! is recomputed fully on every read rather than incrementally maintained,
//! so it can never drift from the dataset.
//!
//! Numeric display fields are rounded for presentation (temperature 2
//! decimals, battery voltage 3, uptime 1); the rounding is display-only and
//! never feeds back into the stored dataset.

use serde::Serialize;

use crate::types::{ConsolidatedDataset, SampleRecord};

/// Display format for the last-seen column (UTC)
const LAST_SEEN_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One device's latest status
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceSummaryRow {
    /// Device identifier
    pub device: String,
    /// Most recent observation time, formatted in UTC
    pub last_seen: String,
    /// Satellite ID from the most recent record
    #[serde(rename = "satId")]
    pub sat_id: Option<f64>,
    /// Temperature in °C, rounded to 2 decimals
    pub temperature: Option<f64>,
    /// Battery voltage in V, rounded to 3 decimals
    #[serde(rename = "batteryVoltage")]
    pub battery_voltage: Option<f64>,
    /// Uptime in hours, rounded to 1 decimal
    #[serde(rename = "hoursUptime")]
    pub hours_uptime: Option<f64>,
}

impl DeviceSummaryRow {
    /// Build a row from a device's most recent record
    fn from_record(record: &SampleRecord) -> Self {
        Self {
            device: record.device.clone(),
            last_seen: record.time.format(LAST_SEEN_FORMAT).to_string(),
            sat_id: record.numeric("satId"),
            temperature: record.numeric("temperature").map(|v| round_to(v, 2)),
            battery_voltage: record.numeric("batteryVoltage").map(|v| round_to(v, 3)),
            hours_uptime: record.numeric("hoursUptime").map(|v| round_to(v, 1)),
        }
    }
}

/// Derive the per-device summary, one row per distinct device
///
/// Rows come out in ascending device order. The dataset invariant rules out
/// duplicate `(device, time)` keys, so the most recent record per device is
/// unambiguous; should malformed input ever carry duplicates, the last
/// record in sorted order wins, which is deterministic.
pub fn summarize(dataset: &ConsolidatedDataset) -> Vec<DeviceSummaryRow> {
    let records = dataset.records();
    let mut rows = Vec::new();

    for (i, record) in records.iter().enumerate() {
        let is_last_of_device = match records.get(i + 1) {
            Some(next) => next.device != record.device,
            None => true,
        };
        if is_last_of_device {
            rows.push(DeviceSummaryRow::from_record(record));
        }
    }

    rows
}

/// Round to a fixed number of decimals, for display only
fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}
