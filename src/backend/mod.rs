//! Backend module for periodic data-source polling
//!
//! This module runs the fetch-merge cycle in a separate thread so readers
//! of the dataset are never blocked by a slow source. It uses crossbeam
//! channels for thread-safe communication with the consuming side.
//!
//! # Architecture
//!
//! - [`BackendCommand`] - Messages sent to the worker (refresh, interval, shutdown)
//! - [`BackendMessage`] - Messages sent from the worker (snapshots, stats)
//! - [`FrontendHandle`] - Consumer-side handle for commands and messages
//! - [`SyncBackend`] - Entry point that owns the channels and runs the worker
//!
//! # Components
//!
//! - [`RangeFetcher`] - Trait boundary to the time-series source
//! - [`InfluxSource`] - Real InfluxDB 2.x implementation
//! - [`MockSource`] - Synthetic source for offline runs (feature-gated)
//! - [`PollWorker`] - The scheduler loop driving bootstrap/advance
//!
//! # Example
//!
//! ```ignore
//! use fluxvis_rs::backend::{BackendMessage, SyncBackend};
//! use fluxvis_rs::config::AppConfig;
//!
//! let config = AppConfig::load_or_default();
//! let fetcher = /* Box<dyn RangeFetcher> */;
//! let (backend, frontend) = SyncBackend::new(&config, fetcher);
//!
//! std::thread::spawn(move || backend.run());
//!
//! while let Some(msg) = frontend.recv() {
//!     if let BackendMessage::Snapshot(dataset) = msg {
//!         println!("{} records", dataset.len());
//!     }
//! }
//! ```

pub mod annotated_csv;
pub mod fetcher;
pub mod influx;
#[cfg(feature = "mock-source")]
pub mod mock_source;
pub mod worker;

pub use annotated_csv::parse_annotated_csv;
pub use fetcher::{FetchStats, RangeFetcher};
pub use influx::InfluxSource;
#[cfg(feature = "mock-source")]
pub use mock_source::MockSource;
pub use worker::PollWorker;

use crate::config::AppConfig;
use crate::sync::SyncEngine;
use crate::types::ConsolidatedDataset;
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::Arc;
use std::time::Duration;

/// Message sent to the poll worker
#[derive(Debug, Clone)]
pub enum BackendCommand {
    /// Run a poll cycle now instead of waiting for the next tick
    RefreshNow,
    /// Change the poll interval
    SetPollInterval(Duration),
    /// Shut down the worker
    Shutdown,
}

/// Message sent from the poll worker
#[derive(Debug, Clone)]
pub enum BackendMessage {
    /// A new consolidated snapshot; immutable, safe to hold across cycles
    Snapshot(Arc<ConsolidatedDataset>),
    /// Fetch statistics after a poll cycle
    Stats(FetchStats),
    /// The worker is shutting down
    Shutdown,
}

/// Consumer-side handle for the backend
pub struct FrontendHandle {
    /// Receiver for backend messages
    pub receiver: Receiver<BackendMessage>,
    /// Sender for commands to the backend
    pub command_sender: Sender<BackendCommand>,
}

impl FrontendHandle {
    /// Block until the next message, `None` when the worker is gone
    pub fn recv(&self) -> Option<BackendMessage> {
        self.receiver.recv().ok()
    }

    /// Try to receive a message without blocking
    pub fn try_recv(&self) -> Option<BackendMessage> {
        self.receiver.try_recv().ok()
    }

    /// Receive all pending messages
    pub fn drain(&self) -> Vec<BackendMessage> {
        let mut messages = Vec::new();
        while let Ok(msg) = self.receiver.try_recv() {
            messages.push(msg);
        }
        messages
    }

    /// Send a command to the backend
    pub fn send_command(&self, cmd: BackendCommand) -> bool {
        self.command_sender.send(cmd).is_ok()
    }

    /// Request an immediate poll cycle
    pub fn refresh_now(&self) {
        let _ = self.command_sender.send(BackendCommand::RefreshNow);
    }

    /// Change the poll interval
    pub fn set_poll_interval(&self, interval: Duration) {
        let _ = self
            .command_sender
            .send(BackendCommand::SetPollInterval(interval));
    }

    /// Request shutdown
    pub fn shutdown(&self) {
        let _ = self.command_sender.send(BackendCommand::Shutdown);
    }
}

/// The sync backend that runs in a separate thread
pub struct SyncBackend {
    /// Engine over the configured fetcher
    engine: SyncEngine,
    /// Poll interval
    poll_interval: Duration,
    /// Receiver for commands
    command_receiver: Receiver<BackendCommand>,
    /// Sender for messages
    message_sender: Sender<BackendMessage>,
}

impl SyncBackend {
    /// Create a new backend with communication channels
    pub fn new(config: &AppConfig, fetcher: Box<dyn RangeFetcher>) -> (Self, FrontendHandle) {
        let (cmd_tx, cmd_rx) = bounded(64);
        // Bounded for backpressure; snapshots are Arc clones, so even a slow
        // consumer costs pointers, not dataset copies
        let (msg_tx, msg_rx) = bounded(256);

        let backend = Self {
            engine: SyncEngine::new(fetcher, config.sync.device_prefix.clone()),
            poll_interval: config.sync.poll_interval(),
            command_receiver: cmd_rx,
            message_sender: msg_tx,
        };

        let frontend = FrontendHandle {
            receiver: msg_rx,
            command_sender: cmd_tx,
        };

        (backend, frontend)
    }

    /// Run the poll loop until shutdown
    pub fn run(self) {
        let mut worker = PollWorker::new(
            self.engine,
            self.poll_interval,
            self.command_receiver,
            self.message_sender,
        );
        worker.run();
    }
}
