//! # FluxVis-RS: Incremental Time-Series Consolidation
//!
//! A polling consolidation engine for InfluxDB 2.x time-series data. A
//! backend thread periodically fetches new samples via the Flux query API,
//! merges them into an immutable in-memory dataset keyed by
//! `(device, time)`, and publishes each snapshot over a channel. Derived
//! views (per-device latest status, chart series) are pure functions of a
//! snapshot.
//!
//! ## Architecture
//!
//! - **Backend**: Polls the source in a separate thread on a fixed interval
//! - **Sync**: Bootstrap/advance cycle with watermark-based incremental fetch
//! - **Views**: Summary table, per-device series, parameter column inference
//! - **Communication**: Crossbeam channels for thread-safe snapshot handoff
//!
//! ## Configuration
//!
//! Configuration is stored in the platform-appropriate config directory
//! under `dev.fluxvis.fluxvis-rs`:
//!
//! - **Linux**: `~/.config/dev.fluxvis.fluxvis-rs/`
//! - **macOS**: `~/Library/Application Support/dev.fluxvis.fluxvis-rs/`
//! - **Windows**: `%APPDATA%\dev.fluxvis.fluxvis-rs\`
//!
//! Source credentials may be overridden with the `INFLUX_URL`,
//! `INFLUX_TOKEN`, and `INFLUX_ORG` environment variables.
//!
//! ## Example
//!
//! ```ignore
//! use fluxvis_rs::{
//!     backend::{BackendMessage, InfluxSource, SyncBackend},
//!     config::AppConfig,
//!     views,
//! };
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = AppConfig::load_or_default();
//!     let source = InfluxSource::new(config.source.clone(), config.sync.start_time)?;
//!     let (backend, frontend) = SyncBackend::new(&config, Box::new(source));
//!
//!     std::thread::spawn(move || backend.run());
//!
//!     while let Some(msg) = frontend.recv() {
//!         if let BackendMessage::Snapshot(dataset) = msg {
//!             for row in views::summarize(&dataset) {
//!                 println!("{}: last seen {}", row.device, row.last_seen);
//!             }
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod sync;
pub mod types;
pub mod views;

// Re-export commonly used types
pub use backend::{BackendCommand, BackendMessage, FrontendHandle, RangeFetcher, SyncBackend};
pub use config::AppConfig;
pub use error::{FluxVisError, Result};
pub use sync::SyncEngine;
pub use types::{ConsolidatedDataset, FieldValue, RawRecord, SampleRecord};
