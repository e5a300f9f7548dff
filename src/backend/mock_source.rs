//! Mock data source for running without a live InfluxDB instance
//!
//! This module provides a synthetic [`RangeFetcher`] that generates tracker
//! records on a fixed cadence, for demos and for exercising the full poll
//! path offline. Values follow simple deterministic patterns per device
//! (sine temperature, declining battery voltage, incrementing counter) so
//! charts look plausible and merges are reproducible.
//!
//! # Enabling
//!
//! The mock source is only available when the `mock-source` feature is
//! enabled:
//!
//! ```bash
//! cargo run --features mock-source
//! ```

use chrono::{DateTime, Duration as ChronoDuration, Utc};

use crate::backend::fetcher::{FetchStats, RangeFetcher};
use crate::error::Result;
use crate::types::{FieldValue, RawRecord};

/// Cap on generated ticks per fetch, guards against a far-past start time
const MAX_TICKS_PER_FETCH: usize = 10_000;

/// Synthetic tracker data source
pub struct MockSource {
    /// Device identifiers to emit records for
    devices: Vec<String>,
    /// First tick timestamp
    start_time: DateTime<Utc>,
    /// Seconds between ticks
    cadence_secs: i64,
    /// Statistics
    stats: FetchStats,
}

impl MockSource {
    /// Create a mock source emitting for `device_count` satellite devices
    pub fn new(start_time: DateTime<Utc>, device_count: usize, cadence_secs: i64) -> Self {
        let devices = (1..=device_count.max(1))
            .map(|i| format!("satellite-{}", i))
            .collect();
        Self {
            devices,
            start_time,
            cadence_secs: cadence_secs.max(1),
            stats: FetchStats::default(),
        }
    }

    /// Record for one device at tick `k`
    fn record_at(&self, device: &str, device_idx: usize, k: i64, time: DateTime<Utc>) -> RawRecord {
        let phase = k as f64 / 10.0 + device_idx as f64;
        let uptime_h = (k * self.cadence_secs) as f64 / 3600.0;
        let battery = (4.1 - 0.0005 * k as f64).max(3.3);

        let mut raw = RawRecord::new(device, time)
            .with_field("version", FieldValue::Number(3.0))
            .with_field("release", FieldValue::Text("fw-2.1".to_string()))
            .with_field("counter", FieldValue::Number(k as f64))
            .with_field("hoursUptime", FieldValue::Number(uptime_h))
            .with_field("satId", FieldValue::Number(37.0 + device_idx as f64))
            .with_field(
                "temperature",
                FieldValue::Number(20.0 + 2.0 * phase.sin()),
            )
            .with_field(
                "pressure",
                FieldValue::Number(1013.0 + 3.0 * (phase / 2.0).cos()),
            )
            .with_field("humidity", FieldValue::Number(40.0 + 5.0 * phase.cos()))
            .with_field("batteryVoltage", FieldValue::Number(battery))
            .with_field("hall", FieldValue::Flag(k % 7 == 0))
            .with_field("userButton", FieldValue::Flag(false))
            .with_field("automatedMode", FieldValue::Flag(true));

        // Sparse field, present every third tick only
        if k % 3 == 0 {
            raw = raw.with_field("booleanData", FieldValue::Flag(k % 2 == 0));
        }
        raw
    }
}

impl RangeFetcher for MockSource {
    fn fetch_since(&mut self, lower_bound: Option<DateTime<Utc>>) -> Result<Vec<RawRecord>> {
        let from = lower_bound.unwrap_or(self.start_time);
        let now = Utc::now();

        let mut records = Vec::new();
        let mut k = if from <= self.start_time {
            0
        } else {
            // First tick at or after `from` (inclusive lower bound)
            let elapsed = (from - self.start_time).num_seconds();
            (elapsed + self.cadence_secs - 1) / self.cadence_secs
        };

        let mut ticks = 0;
        loop {
            let time = self.start_time + ChronoDuration::seconds(k * self.cadence_secs);
            if time > now || ticks >= MAX_TICKS_PER_FETCH {
                break;
            }
            for (idx, device) in self.devices.iter().enumerate() {
                records.push(self.record_at(device, idx, k, time));
            }
            k += 1;
            ticks += 1;
        }

        self.stats.record_success(records.len(), 0);
        Ok(records)
    }

    fn describe(&self) -> String {
        format!(
            "mock source ({} devices, {}s cadence)",
            self.devices.len(),
            self.cadence_secs
        )
    }

    fn stats(&self) -> &FetchStats {
        &self.stats
    }
}
