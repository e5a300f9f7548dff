//! Error handling for FluxVis-RS
//!
//! This module defines custom error types and a Result alias for use
//! throughout the crate.
//!
//! Fetch-side failures are split into [`FluxVisError::SourceUnavailable`]
//! (cannot reach or authenticate against the backend) and
//! [`FluxVisError::QueryFailure`] (the backend rejected or failed the query).
//! The sync engine catches both at the fetch boundary and degrades to
//! "no new data this cycle"; neither is ever fatal. An empty fetch result is
//! a valid state, not an error.

use thiserror::Error;

/// Main error type for FluxVis-RS operations
#[derive(Error, Debug)]
pub enum FluxVisError {
    /// The data source could not be reached (connection, TLS, auth, timeout)
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    /// The data source rejected or failed the query
    #[error("Query failure: {0}")]
    QueryFailure(String),

    /// A fetched record is missing a required identity field
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors related to channel communication
    #[error("Channel error: {0}")]
    Channel(String),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<FluxVisError>,
    },
}

impl FluxVisError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        FluxVisError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// True for the fetch-boundary errors the sync engine absorbs
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            FluxVisError::SourceUnavailable(_)
                | FluxVisError::QueryFailure(_)
                | FluxVisError::Http(_)
        )
    }
}

/// Result type alias for FluxVis-RS operations
pub type Result<T> = std::result::Result<T, FluxVisError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}
