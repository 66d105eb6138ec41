//! Error type definitions for the channel guide service

use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Upstream source errors that were not absorbed by the caller
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// The intermediary page for a stream could not be fetched
    #[error("Stream resolution failed for {route}: {source}")]
    ResolutionFailure {
        route: String,
        #[source]
        source: SourceError,
    },

    /// The intermediary page was fetched but carried no stream URL
    #[error("No stream available for {route}")]
    StreamUnavailable { route: String },

    /// Resource not found errors
    #[error("Not found: {resource} with id {id}")]
    NotFound { resource: String, id: String },

    /// Configuration and catalog errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Errors raised while fetching from an upstream host
#[derive(Error, Debug)]
pub enum SourceError {
    /// The fetch did not finish in time
    #[error("Connection timeout: {url}")]
    Timeout { url: String },

    /// The upstream answered with a non-success status
    #[error("HTTP error: {status} - {url}")]
    Http { status: u16, url: String },

    /// Transport-level failures (DNS, connect, TLS, body read)
    #[error("Request failed: {url} - {message}")]
    Request { url: String, message: String },
}

impl AppError {
    /// Create a not found error
    pub fn not_found<R: Into<String>, I: Into<String>>(resource: R, id: I) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Wrap a failed page fetch for the given stream route
    pub fn resolution_failure<S: Into<String>>(route: S, source: SourceError) -> Self {
        Self::ResolutionFailure {
            route: route.into(),
            source,
        }
    }
}

impl SourceError {
    /// URL the failed fetch was aimed at
    pub fn url(&self) -> &str {
        match self {
            Self::Timeout { url } | Self::Http { url, .. } | Self::Request { url, .. } => url,
        }
    }

    /// Whether the failure was a timeout rather than an answer from upstream
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
