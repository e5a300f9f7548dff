//! RangeFetcher trait for unified data-source access
//!
//! This module provides a common trait for all data-source implementations,
//! enabling both the real InfluxDB transport and mock/scripted sources for
//! testing. The engine is agnostic to the transport and query language; it
//! only requires range semantics (fetch everything at or after a lower
//! bound) and a stable field-naming contract matching the known field set.

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::types::RawRecord;

/// Statistics for fetch operations
///
/// Tracks success rates, record throughput, and timing for fetch cycles.
#[derive(Debug, Clone, Default)]
pub struct FetchStats {
    /// Total number of successful fetches
    pub successful_fetches: u64,
    /// Total number of failed fetches
    pub failed_fetches: u64,
    /// Total records returned across all fetches
    pub records_fetched: u64,
    /// Records returned by the last fetch
    pub last_fetch_records: usize,
    /// Duration of the last fetch in milliseconds
    pub last_fetch_ms: u64,
    /// Total fetch time in milliseconds
    pub total_fetch_ms: u64,
}

impl FetchStats {
    /// Record a successful fetch
    pub fn record_success(&mut self, records: usize, elapsed_ms: u64) {
        self.successful_fetches += 1;
        self.records_fetched += records as u64;
        self.last_fetch_records = records;
        self.last_fetch_ms = elapsed_ms;
        self.total_fetch_ms += elapsed_ms;
    }

    /// Record a failed fetch
    pub fn record_failure(&mut self, elapsed_ms: u64) {
        self.failed_fetches += 1;
        self.last_fetch_ms = elapsed_ms;
        self.total_fetch_ms += elapsed_ms;
    }

    /// Calculate success rate as percentage
    pub fn success_rate(&self) -> f64 {
        let total = self.successful_fetches + self.failed_fetches;
        if total == 0 {
            100.0
        } else {
            (self.successful_fetches as f64 / total as f64) * 100.0
        }
    }

    /// Calculate average fetch time in milliseconds
    pub fn avg_fetch_ms(&self) -> f64 {
        let total = self.successful_fetches + self.failed_fetches;
        if total == 0 {
            0.0
        } else {
            self.total_fetch_ms as f64 / total as f64
        }
    }

    /// Reset all statistics
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Unified interface for time-series data sources
///
/// Implementations must be `Send` to allow use from the poll worker thread.
/// An empty result is a valid "no data yet" state, not an error.
///
/// # Example
///
/// ```ignore
/// fn poll(fetcher: &mut dyn RangeFetcher, since: Option<DateTime<Utc>>) {
///     match fetcher.fetch_since(since) {
///         Ok(records) => println!("{} new records", records.len()),
///         Err(e) => eprintln!("fetch degraded: {}", e),
///     }
/// }
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait RangeFetcher: Send {
    /// Fetch all records at or after the given lower bound
    ///
    /// `None` means "from the configured start epoch" (the bootstrap fetch).
    /// The lower bound is **inclusive**: the source may legitimately
    /// re-return the boundary record, and consolidation deduplicates it.
    /// Relying on exact exclusive boundary semantics from an external
    /// time-series backend is not safe; idempotent re-fetch is.
    fn fetch_since(&mut self, lower_bound: Option<DateTime<Utc>>) -> Result<Vec<RawRecord>>;

    /// Human-readable description of the source, for logs
    fn describe(&self) -> String;

    /// Get fetch operation statistics
    fn stats(&self) -> &FetchStats;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_stats_success_rate() {
        let mut stats = FetchStats::default();
        assert_eq!(stats.success_rate(), 100.0);

        stats.record_success(10, 20);
        stats.record_success(0, 15);
        stats.record_failure(5);

        assert_eq!(stats.successful_fetches, 2);
        assert_eq!(stats.failed_fetches, 1);
        assert_eq!(stats.records_fetched, 10);
        assert!((stats.success_rate() - 66.666).abs() < 0.01);
    }

    #[test]
    fn test_fetch_stats_avg() {
        let mut stats = FetchStats::default();
        assert_eq!(stats.avg_fetch_ms(), 0.0);
        stats.record_success(1, 30);
        stats.record_failure(10);
        assert_eq!(stats.avg_fetch_ms(), 20.0);
        stats.reset();
        assert_eq!(stats.total_fetch_ms, 0);
    }
}
