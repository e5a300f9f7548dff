//! Core data types for FluxVis-RS
//!
//! This module contains the fundamental data structures used throughout
//! the crate for representing telemetry samples and the consolidated
//! in-memory dataset.
//!
//! # Main Types
//!
//! - [`FieldValue`] - One named measurement value (numeric, text, or flag)
//! - [`RawRecord`] - A record as returned by the data source, identity fields optional
//! - [`SampleRecord`] - A validated observation keyed by `(device, time)`
//! - [`ConsolidatedDataset`] - The sorted, key-unique snapshot all views read from
//!
//! # Identity and ordering
//!
//! Two records with the same `(device, time)` key are the same observation;
//! consolidation keeps exactly one (last-write-wins, with the record that
//! arrived later in the input winning among equals). Datasets are globally
//! sorted ascending by `(device, time)` and that order holds after every
//! merge, not just at read time.
//!
//! # Missing parameters
//!
//! A parameter a record does not carry is simply absent from its field map.
//! Absence is never encoded as zero; [`SampleRecord::numeric`] returns
//! `None` for both absent and non-numeric values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{FluxVisError, Result};

/// Fields emitted by the tracker decoder, in canonical order
///
/// Unknown field names are tolerated and carried through; this list drives
/// the Flux `keep` columns and the nullable members of the JSON record form.
pub const KNOWN_FIELDS: &[&str] = &[
    "version",
    "release",
    "counter",
    "hoursUptime",
    "almanacValidFrom",
    "satId",
    "temperature",
    "pressure",
    "humidity",
    "batteryVoltage",
    "booleanData",
    "hall",
    "userButton",
    "automatedMode",
];

/// A single named measurement value
///
/// The data source pivots fields into columns, so a value can arrive as a
/// number, a boolean flag, or free text. Absent values are represented by
/// the field not being present at all, never by a sentinel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Boolean flag (e.g. `hall`, `userButton`)
    Flag(bool),
    /// Numeric measurement
    Number(f64),
    /// Categorical / free-text value
    Text(String),
}

impl FieldValue {
    /// Numeric interpretation used for charting and parameter inference
    ///
    /// Flags map to 0.0/1.0 so they can be plotted as step traces. Text that
    /// happens to parse as a number counts as numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Flag(b) => Some(if *b { 1.0 } else { 0.0 }),
            FieldValue::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }

    /// Classify a raw string value from the wire
    ///
    /// `true`/`false` become flags, anything parseable becomes a number,
    /// everything else stays text.
    pub fn parse(raw: &str) -> FieldValue {
        let trimmed = raw.trim();
        match trimmed {
            "true" => FieldValue::Flag(true),
            "false" => FieldValue::Flag(false),
            _ => match trimmed.parse::<f64>() {
                Ok(n) => FieldValue::Number(n),
                Err(_) => FieldValue::Text(trimmed.to_string()),
            },
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Flag(b) => write!(f, "{}", b),
            FieldValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// A record as returned by the data source, before validation
///
/// Identity fields are optional because the source may emit rows without a
/// timestamp or device tag; those fail conversion to [`SampleRecord`]
/// individually and are skipped, never aborting the batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    /// Device identifier, if present
    pub device: Option<String>,
    /// Source timestamp, already timezone-normalized to UTC
    pub time: Option<DateTime<Utc>>,
    /// Field name to value; partially present fields are expected
    pub fields: BTreeMap<String, FieldValue>,
}

impl RawRecord {
    /// Create a raw record with identity fields set
    pub fn new(device: impl Into<String>, time: DateTime<Utc>) -> Self {
        Self {
            device: Some(device.into()),
            time: Some(time),
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field insertion
    pub fn with_field(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.fields.insert(name.into(), value);
        self
    }
}

/// A validated observation: one device, one instant, named parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRecord {
    /// Device identifier, non-empty
    pub device: String,
    /// Observation timestamp (UTC)
    pub time: DateTime<Utc>,
    /// Parameter name to value; missing parameters are absent, not zero
    #[serde(flatten)]
    pub fields: BTreeMap<String, FieldValue>,
}

impl SampleRecord {
    /// Create a record with no parameters set
    pub fn new(device: impl Into<String>, time: DateTime<Utc>) -> Self {
        Self {
            device: device.into(),
            time,
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field insertion
    pub fn with_field(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    /// The identity key of this observation
    pub fn key(&self) -> (&str, DateTime<Utc>) {
        (&self.device, self.time)
    }

    /// Look up a parameter value
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Numeric value of a parameter, `None` when absent or non-numeric
    pub fn numeric(&self, name: &str) -> Option<f64> {
        self.fields.get(name).and_then(FieldValue::as_f64)
    }

    /// JSON record form for the presentation layer
    ///
    /// Every known field appears as a nullable member (`null` when absent);
    /// unknown fields carried by the record are included as-is. `time` is an
    /// RFC 3339 UTC string.
    pub fn to_json_row(&self) -> serde_json::Value {
        let mut row = serde_json::Map::new();
        row.insert("device".to_string(), serde_json::json!(self.device));
        row.insert(
            "time".to_string(),
            serde_json::json!(self
                .time
                .to_rfc3339_opts(chrono::SecondsFormat::Micros, true)),
        );
        for name in KNOWN_FIELDS {
            let value = match self.fields.get(*name) {
                Some(v) => serde_json::to_value(v).unwrap_or(serde_json::Value::Null),
                None => serde_json::Value::Null,
            };
            row.insert((*name).to_string(), value);
        }
        for (name, value) in &self.fields {
            if !KNOWN_FIELDS.contains(&name.as_str()) {
                row.insert(
                    name.clone(),
                    serde_json::to_value(value).unwrap_or(serde_json::Value::Null),
                );
            }
        }
        serde_json::Value::Object(row)
    }
}

impl TryFrom<RawRecord> for SampleRecord {
    type Error = FluxVisError;

    fn try_from(raw: RawRecord) -> Result<Self> {
        let time = raw
            .time
            .ok_or_else(|| FluxVisError::MalformedRecord("record without timestamp".to_string()))?;
        let device = match raw.device {
            Some(d) if !d.is_empty() => d,
            _ => {
                return Err(FluxVisError::MalformedRecord(format!(
                    "record at {} without device identifier",
                    time
                )))
            }
        };
        Ok(SampleRecord {
            device,
            time,
            fields: raw.fields,
        })
    }
}

/// The consolidated in-memory dataset
///
/// An ordered collection of [`SampleRecord`], globally sorted ascending by
/// `(device, time)` with no duplicate keys. Instances are immutable once
/// built; consolidation produces a new dataset value rather than mutating in
/// place, so a reader holding an old snapshot never observes a half-merged
/// state. The dataset is a rebuildable cache, not a durable log.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConsolidatedDataset {
    records: Vec<SampleRecord>,
}

impl ConsolidatedDataset {
    /// Create an empty dataset
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dataset from records in arbitrary order
    ///
    /// Sorts by `(device, time)` and collapses duplicate keys keeping the
    /// record that appeared later in the input (stable sort preserves input
    /// order among equal keys, so the freshly fetched copy wins on merge).
    pub fn from_unsorted(mut records: Vec<SampleRecord>) -> Self {
        records.sort_by(|a, b| a.key().cmp(&b.key()));
        let mut deduped: Vec<SampleRecord> = Vec::with_capacity(records.len());
        for record in records {
            match deduped.last() {
                Some(last) if last.key() == record.key() => {
                    *deduped.last_mut().unwrap() = record;
                }
                _ => deduped.push(record),
            }
        }
        Self { records: deduped }
    }

    /// Merge freshly fetched records into this dataset
    ///
    /// Pure with respect to `self`: returns a new dataset, leaving the
    /// current snapshot untouched. Incoming records win on key collision.
    pub fn merge(&self, incoming: Vec<SampleRecord>) -> Self {
        if incoming.is_empty() {
            return self.clone();
        }
        let mut combined = self.records.clone();
        combined.extend(incoming);
        Self::from_unsorted(combined)
    }

    /// The maximum timestamp present, used as the next incremental lower bound
    pub fn watermark(&self) -> Option<DateTime<Utc>> {
        self.records.iter().map(|r| r.time).max()
    }

    /// All records in `(device, time)` order
    pub fn records(&self) -> &[SampleRecord] {
        &self.records
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the dataset holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct device identifiers in ascending order
    pub fn devices(&self) -> Vec<&str> {
        let mut devices: Vec<&str> = Vec::new();
        for record in &self.records {
            if devices.last() != Some(&record.device.as_str()) {
                devices.push(&record.device);
            }
        }
        devices
    }

    /// JSON record form of the whole dataset for the presentation layer
    pub fn to_json_rows(&self) -> Vec<serde_json::Value> {
        self.records.iter().map(SampleRecord::to_json_row).collect()
    }
}
