//! Centralized error handling for the channel guide service
//!
//! Library code returns [`AppError`] (or the narrower [`SourceError`] for
//! upstream fetches); the binary wraps everything in `anyhow` at the edge.
//!
//! # Error Categories
//!
//! - **Source Errors**: upstream page and guide fetches (timeouts, HTTP status, transport)
//! - **Resolution Errors**: a stream page could not be fetched or held no stream URL
//! - **Configuration Errors**: invalid settings or catalog definitions, fatal at start-up
//!
//! # Usage
//!
//! ```rust
//! use channel_guide::errors::{AppError, AppResult};
//!
//! fn lookup(route: &str) -> AppResult<()> {
//!     Err(AppError::not_found("channel route", route))
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for upstream fetch Results
pub type SourceResult<T> = Result<T, SourceError>;
