//! Poll worker loop
//!
//! This module contains the scheduler loop that runs in a separate thread
//! and drives the sync engine. One worker is the sole writer of the
//! dataset; it publishes each new snapshot as an immutable `Arc` value, so
//! concurrent readers hold whatever snapshot they last received and never
//! observe a half-merged state.
//!
//! # Scheduling
//!
//! The worker waits on the command channel with the next poll tick as a
//! deadline, so shutdown and manual refresh stay responsive between the
//! (long, default 30 s) poll intervals. A poll cycle is atomic from the
//! dataset's point of view: it either replaces the snapshot or leaves the
//! prior snapshot untouched.

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::backend::{BackendCommand, BackendMessage};
use crate::error::{FluxVisError, Result};
use crate::sync::SyncEngine;
use crate::types::ConsolidatedDataset;

/// The worker that runs the poll loop
pub struct PollWorker {
    /// Sync engine over the configured fetcher
    engine: SyncEngine,
    /// Current poll interval
    poll_interval: Duration,
    /// Command receiver
    command_rx: Receiver<BackendCommand>,
    /// Message sender
    message_tx: Sender<BackendMessage>,
    /// Last published snapshot
    current: Arc<ConsolidatedDataset>,
}

impl PollWorker {
    /// Create a new poll worker
    pub fn new(
        engine: SyncEngine,
        poll_interval: Duration,
        command_rx: Receiver<BackendCommand>,
        message_tx: Sender<BackendMessage>,
    ) -> Self {
        Self {
            engine,
            poll_interval,
            command_rx,
            message_tx,
            current: Arc::new(ConsolidatedDataset::new()),
        }
    }

    /// Run the poll loop until shutdown or channel disconnect
    pub fn run(&mut self) {
        tracing::info!(
            source = %self.engine.source_description(),
            interval_secs = self.poll_interval.as_secs(),
            "poll worker started"
        );

        // Initial cycle; an empty current dataset makes this the bootstrap
        self.poll();
        let mut next_poll = Instant::now() + self.poll_interval;

        loop {
            match self.command_rx.recv_deadline(next_poll) {
                Ok(BackendCommand::Shutdown) => break,
                Ok(BackendCommand::RefreshNow) => {
                    self.poll();
                    next_poll = Instant::now() + self.poll_interval;
                }
                Ok(BackendCommand::SetPollInterval(interval)) => {
                    tracing::info!(interval_secs = interval.as_secs(), "poll interval changed");
                    self.poll_interval = interval;
                    next_poll = Instant::now() + interval;
                }
                Err(RecvTimeoutError::Timeout) => {
                    self.poll();
                    next_poll = Instant::now() + self.poll_interval;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        if let Err(e) = self.publish(BackendMessage::Shutdown) {
            tracing::debug!("frontend already gone at shutdown: {}", e);
        }
        tracing::info!("poll worker stopped");
    }

    /// Run one poll cycle and publish the result
    ///
    /// A gone frontend is not fatal to the worker; publish failures are
    /// logged and the loop keeps consolidating until told to stop.
    fn poll(&mut self) {
        let next = self.engine.advance(&self.current);

        // A failed bootstrap yields a fresh-but-empty dataset; treat it as
        // unchanged so outages do not republish empty snapshots every tick
        let changed =
            !Arc::ptr_eq(&next, &self.current) && !(next.is_empty() && self.current.is_empty());
        if changed {
            if let Err(e) = self.publish(BackendMessage::Snapshot(Arc::clone(&next))) {
                tracing::warn!("dropping snapshot: {}", e);
            }
        }
        if let Err(e) = self.publish(BackendMessage::Stats(self.engine.fetch_stats().clone())) {
            tracing::warn!("dropping fetch stats: {}", e);
        }

        self.current = next;
    }

    /// Send a message to the frontend
    fn publish(&self, message: BackendMessage) -> Result<()> {
        self.message_tx
            .send(message)
            .map_err(|e| FluxVisError::Channel(e.to_string()))
    }

    /// The snapshot the worker currently holds
    pub fn dataset(&self) -> &Arc<ConsolidatedDataset> {
        &self.current
    }
}
