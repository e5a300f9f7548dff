//! Incremental synchronization engine
//!
//! This module owns the fetch-normalize-merge cycle that keeps the
//! consolidated dataset current:
//!
//! - [`SyncEngine::bootstrap`] - full fetch from the configured start epoch
//! - [`SyncEngine::advance`] - incremental fetch from the dataset watermark
//!
//! The engine holds no dataset state between calls; callers pass the
//! previous snapshot back in and receive a new one, making `advance` a pure
//! merge function over (previous state, freshly fetched delta). Snapshots
//! are `Arc`-wrapped and never mutated, so readers holding an old reference
//! are unaffected by later cycles.
//!
//! # Degraded operation
//!
//! Fetch failures never propagate: `bootstrap` returns an empty dataset and
//! `advance` returns its input unchanged (the same `Arc`, pointer-equal).
//! The system keeps serving the last-known-good dataset through outages
//! indefinitely. Individual malformed records (missing timestamp or device)
//! are skipped with a logged warning and never abort the batch.
//!
//! # Why an inclusive lower bound
//!
//! The incremental fetch asks for `time >= watermark` rather than `>`.
//! Time-series backends commonly have sub-second or boundary-inclusive range
//! semantics that make exact exclusive bounds unreliable; re-fetching the
//! boundary record and letting key-based dedup absorb it is simpler and
//! strictly safer.

use std::sync::Arc;

use crate::backend::fetcher::{FetchStats, RangeFetcher};
use crate::types::{ConsolidatedDataset, RawRecord, SampleRecord};

/// The incremental sync engine
///
/// Wraps a [`RangeFetcher`] with the normalization pipeline shared by
/// bootstrap and advance: conversion of raw records (dropping malformed ones
/// per-record) and the device-prefix filter.
pub struct SyncEngine {
    /// Data source
    fetcher: Box<dyn RangeFetcher>,
    /// Only devices starting with this prefix are retained; empty disables
    device_prefix: String,
}

impl SyncEngine {
    /// Create an engine over the given fetcher
    pub fn new(fetcher: Box<dyn RangeFetcher>, device_prefix: impl Into<String>) -> Self {
        Self {
            fetcher,
            device_prefix: device_prefix.into(),
        }
    }

    /// Fetch everything from the start epoch and build the initial dataset
    ///
    /// On fetch failure the error is logged and an empty dataset is
    /// returned; the system stays live with zero data rather than failing
    /// the caller.
    pub fn bootstrap(&mut self) -> Arc<ConsolidatedDataset> {
        match self.fetcher.fetch_since(None) {
            Ok(raw) => {
                let records = self.normalize(raw);
                let dataset = ConsolidatedDataset::from_unsorted(records);
                tracing::info!(
                    records = dataset.len(),
                    devices = dataset.devices().len(),
                    "bootstrap complete"
                );
                Arc::new(dataset)
            }
            Err(e) => {
                // Fetch-boundary errors are an expected degraded state;
                // anything else escaping the fetcher is a bug worth noise
                if e.is_fetch_error() {
                    tracing::warn!("bootstrap fetch failed, starting empty: {}", e);
                } else {
                    tracing::error!("unexpected bootstrap error, starting empty: {}", e);
                }
                Arc::new(ConsolidatedDataset::new())
            }
        }
    }

    /// Merge newly arrived records into `current` and return the next snapshot
    ///
    /// An empty `current` behaves as [`bootstrap`](Self::bootstrap).
    /// Otherwise the fetch lower bound is the dataset watermark (inclusive),
    /// and the result is `current` with the normalized delta merged in. On
    /// fetch failure `current` is returned unchanged; a transient outage
    /// must never corrupt or drop existing data.
    pub fn advance(&mut self, current: &Arc<ConsolidatedDataset>) -> Arc<ConsolidatedDataset> {
        let Some(watermark) = current.watermark() else {
            return self.bootstrap();
        };

        match self.fetcher.fetch_since(Some(watermark)) {
            Ok(raw) => {
                let fetched = raw.len();
                let records = self.normalize(raw);
                if records.is_empty() {
                    tracing::debug!(fetched, "no new records this cycle");
                    return Arc::clone(current);
                }
                let next = current.merge(records);
                tracing::debug!(
                    fetched,
                    merged = next.len() - current.len(),
                    total = next.len(),
                    "advance complete"
                );
                Arc::new(next)
            }
            Err(e) => {
                if e.is_fetch_error() {
                    tracing::warn!("advance fetch failed, keeping current dataset: {}", e);
                } else {
                    tracing::error!("unexpected advance error, keeping current dataset: {}", e);
                }
                Arc::clone(current)
            }
        }
    }

    /// Convert raw records, dropping malformed ones and applying the
    /// device-prefix filter
    fn normalize(&self, raw: Vec<RawRecord>) -> Vec<SampleRecord> {
        raw.into_iter()
            .filter_map(|r| match SampleRecord::try_from(r) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!("skipping record: {}", e);
                    None
                }
            })
            .filter(|r| self.device_prefix.is_empty() || r.device.starts_with(&self.device_prefix))
            .collect()
    }

    /// Fetch statistics of the underlying source
    pub fn fetch_stats(&self) -> &FetchStats {
        self.fetcher.stats()
    }

    /// Description of the underlying source, for logs
    pub fn source_description(&self) -> String {
        self.fetcher.describe()
    }
}
