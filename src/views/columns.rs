//! Parameter column inference for charting
//!
//! Decides which parameters of a device series are plottable: a column
//! qualifies when at least one record in the series carries a value with a
//! numeric interpretation. Columns that never parse as numeric across the
//! whole series (always absent, or always free text) are excluded, as are
//! the fixed identifier columns.
//!
//! The output order is a presentation contract consumed by the charting
//! layer: canonical preferred columns first (those present), then any other
//! qualifying names in first-encountered order. It is deterministic for a
//! given input.

use std::collections::BTreeSet;

use crate::types::SampleRecord;

/// Columns never offered for charting regardless of content
pub const NON_PARAM_COLUMNS: &[&str] = &["time", "device", "automatedMode"];

/// Canonical preferred chart order
pub const PREFERRED_COLUMNS: &[&str] = &[
    "temperature",
    "pressure",
    "humidity",
    "batteryVoltage",
    "hoursUptime",
    "counter",
    "satId",
    "version",
    "release",
    "almanacValidFrom",
    "booleanData",
    "hall",
    "userButton",
];

/// Infer the plottable parameter columns of a device series
pub fn infer_parameter_columns(records: &[SampleRecord]) -> Vec<String> {
    let mut qualifying: BTreeSet<&str> = BTreeSet::new();
    let mut encounter_order: Vec<&str> = Vec::new();

    for record in records {
        for (name, value) in &record.fields {
            if NON_PARAM_COLUMNS.contains(&name.as_str()) {
                continue;
            }
            if value.as_f64().is_some() && qualifying.insert(name.as_str()) {
                encounter_order.push(name.as_str());
            }
        }
    }

    let mut columns: Vec<String> = PREFERRED_COLUMNS
        .iter()
        .filter(|name| qualifying.contains(**name))
        .map(|name| name.to_string())
        .collect();

    for name in encounter_order {
        if !PREFERRED_COLUMNS.contains(&name) {
            columns.push(name.to_string());
        }
    }

    columns
}
