//! Derived read views over the consolidated dataset
//!
//! Views are pure functions of a snapshot: they never mutate the dataset
//! and are recomputed on demand, so they cannot drift from the data they
//! present.
//!
//! - [`summary`] - per-device latest-status rows
//! - [`series`] - per-device chronological series and plot points
//! - [`columns`] - inference of plottable parameter columns

pub mod columns;
pub mod series;
pub mod summary;

pub use columns::{infer_parameter_columns, NON_PARAM_COLUMNS, PREFERRED_COLUMNS};
pub use series::{plot_points, series_for};
pub use summary::{summarize, DeviceSummaryRow};
