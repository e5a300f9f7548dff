//! InfluxDB backend for range fetching
//!
//! This module provides the real data-source implementation of
//! [`RangeFetcher`] against the InfluxDB 2.x Flux query API.
//!
//! # Query shape
//!
//! Every fetch runs the same pipeline, differing only in the range start:
//!
//! ```flux
//! from(bucket: "dashboard-practise")
//!   |> range(start: time(v: "2025-10-22T06:17:00Z"))
//!   |> filter(fn: (r) => r._measurement == "tracker_data")
//!   |> pivot(rowKey:["_time"], columnKey: ["_field"], valueColumn: "_value")
//!   |> keep(columns: ["_time","device",...])
//! ```
//!
//! The pivot turns one row per field into one row per `(device, _time)` with
//! the fields as columns, which is exactly the shape of [`RawRecord`].
//!
//! # Error mapping
//!
//! Transport-level failures (connect, TLS, timeout) and auth rejections map
//! to [`FluxVisError::SourceUnavailable`]; any other non-success status and
//! in-band Flux errors map to [`FluxVisError::QueryFailure`]. Requests carry
//! a client-level timeout so a hanging source cannot stall the poll cycle.

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use std::time::Instant;

use crate::backend::annotated_csv::parse_annotated_csv;
use crate::backend::fetcher::{FetchStats, RangeFetcher};
use crate::config::SourceConfig;
use crate::error::{FluxVisError, Result};
use crate::types::{RawRecord, KNOWN_FIELDS};

/// InfluxDB 2.x implementation of [`RangeFetcher`]
#[derive(Debug)]
pub struct InfluxSource {
    /// Connection parameters
    config: SourceConfig,
    /// Start boundary used when no watermark is supplied
    start_time: DateTime<Utc>,
    /// HTTP client, carries the per-request timeout
    client: Client,
    /// Statistics
    stats: FetchStats,
}

impl InfluxSource {
    /// Create a new InfluxDB source
    pub fn new(config: SourceConfig, start_time: DateTime<Utc>) -> Result<Self> {
        if !config.has_credentials() {
            return Err(FluxVisError::Config(
                "InfluxDB url, org, and token must be set (INFLUX_URL / INFLUX_ORG / INFLUX_TOKEN)"
                    .to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| FluxVisError::SourceUnavailable(format!("HTTP client setup: {}", e)))?;

        Ok(Self {
            config,
            start_time,
            client,
            stats: FetchStats::default(),
        })
    }

    /// The Flux array literal for the `keep` stage: `_time`, `device`, and
    /// every known field
    fn keep_columns_literal() -> String {
        let mut columns = vec!["\"_time\"".to_string(), "\"device\"".to_string()];
        columns.extend(KNOWN_FIELDS.iter().map(|f| format!("\"{}\"", f)));
        format!("[{}]", columns.join(","))
    }

    /// Build the Flux query for a fetch starting at `start`
    fn build_query(&self, start: DateTime<Utc>) -> String {
        format!(
            r#"from(bucket: "{bucket}")
  |> range(start: time(v: "{start}"))
  |> filter(fn: (r) => r._measurement == "{measurement}")
  |> pivot(rowKey:["_time"], columnKey: ["_field"], valueColumn: "_value")
  |> keep(columns: {keep})
"#,
            bucket = self.config.bucket,
            start = start.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            measurement = self.config.measurement,
            keep = Self::keep_columns_literal(),
        )
    }

    /// Run one query and parse the response
    fn query(&self, flux: &str) -> Result<Vec<RawRecord>> {
        let url = format!("{}/api/v2/query", self.config.url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .query(&[("org", self.config.org.as_str())])
            .header("Authorization", format!("Token {}", self.config.token))
            .header("Content-Type", "application/vnd.flux")
            .header("Accept", "application/csv")
            .body(flux.to_string())
            .send()
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    FluxVisError::SourceUnavailable(e.to_string())
                } else {
                    FluxVisError::Http(e)
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| FluxVisError::SourceUnavailable(e.to_string()))?;

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(FluxVisError::SourceUnavailable(format!(
                "authentication rejected ({})",
                status
            )));
        }
        if !status.is_success() {
            return Err(FluxVisError::QueryFailure(format!(
                "{}: {}",
                status,
                body.lines().next().unwrap_or("").trim()
            )));
        }

        parse_annotated_csv(&body)
    }
}

impl RangeFetcher for InfluxSource {
    fn fetch_since(&mut self, lower_bound: Option<DateTime<Utc>>) -> Result<Vec<RawRecord>> {
        let start = lower_bound.unwrap_or(self.start_time);
        let flux = self.build_query(start);
        tracing::debug!(%start, "querying influxdb");

        let began = Instant::now();
        let result = self.query(&flux);
        let elapsed_ms = began.elapsed().as_millis() as u64;

        match &result {
            Ok(records) => self.stats.record_success(records.len(), elapsed_ms),
            Err(_) => self.stats.record_failure(elapsed_ms),
        }
        result
    }

    fn describe(&self) -> String {
        format!(
            "influxdb {} bucket={} measurement={}",
            self.config.url, self.config.bucket, self.config.measurement
        )
    }

    fn stats(&self) -> &FetchStats {
        &self.stats
    }
}
