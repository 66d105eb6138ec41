//! Utility modules for the channel guide service

pub mod http_client;
pub mod url;

// Re-export commonly used types for convenience
pub use http_client::{HttpFetcher, StandardHttpClient};
pub use url::UrlUtils;
