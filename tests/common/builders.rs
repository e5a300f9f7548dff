//! Builders for records, datasets, and a scripted fetcher

use chrono::{DateTime, TimeZone, Utc};
use std::collections::VecDeque;

use fluxvis_rs::backend::{FetchStats, RangeFetcher};
use fluxvis_rs::error::{FluxVisError, Result};
use fluxvis_rs::types::{ConsolidatedDataset, FieldValue, RawRecord, SampleRecord};

/// Timestamp helper: minutes past a fixed base time
pub fn t(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 22, 10, minute, 0).unwrap()
}

/// A raw record carrying a temperature value
pub fn raw(device: &str, time: DateTime<Utc>, temperature: f64) -> RawRecord {
    RawRecord::new(device, time).with_field("temperature", FieldValue::Number(temperature))
}

/// A sample record carrying a temperature value
pub fn sample(device: &str, time: DateTime<Utc>, temperature: f64) -> SampleRecord {
    SampleRecord::new(device, time).with_field("temperature", FieldValue::Number(temperature))
}

/// A dataset over the given samples
pub fn dataset(records: Vec<SampleRecord>) -> ConsolidatedDataset {
    ConsolidatedDataset::from_unsorted(records)
}

/// One scripted outcome for a fetch call
pub enum FetchOutcome {
    Records(Vec<RawRecord>),
    Unavailable(&'static str),
    QueryError(&'static str),
}

/// A [`RangeFetcher`] that replays a fixed script of fetch outcomes
///
/// Each `fetch_since` call consumes the next outcome; an exhausted script
/// returns empty batches. The lower bounds seen by each call are recorded
/// for assertions.
pub struct ScriptedFetcher {
    script: VecDeque<FetchOutcome>,
    pub calls: Vec<Option<DateTime<Utc>>>,
    stats: FetchStats,
}

impl ScriptedFetcher {
    pub fn new(script: Vec<FetchOutcome>) -> Self {
        Self {
            script: script.into(),
            calls: Vec::new(),
            stats: FetchStats::default(),
        }
    }
}

impl RangeFetcher for ScriptedFetcher {
    fn fetch_since(&mut self, lower_bound: Option<DateTime<Utc>>) -> Result<Vec<RawRecord>> {
        self.calls.push(lower_bound);
        match self.script.pop_front() {
            Some(FetchOutcome::Records(records)) => {
                self.stats.record_success(records.len(), 1);
                Ok(records)
            }
            Some(FetchOutcome::Unavailable(msg)) => {
                self.stats.record_failure(1);
                Err(FluxVisError::SourceUnavailable(msg.to_string()))
            }
            Some(FetchOutcome::QueryError(msg)) => {
                self.stats.record_failure(1);
                Err(FluxVisError::QueryFailure(msg.to_string()))
            }
            None => {
                self.stats.record_success(0, 1);
                Ok(Vec::new())
            }
        }
    }

    fn describe(&self) -> String {
        "scripted fetcher".to_string()
    }

    fn stats(&self) -> &FetchStats {
        &self.stats
    }
}
