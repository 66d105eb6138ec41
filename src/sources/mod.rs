//! Upstream sources
//!
//! Everything that reaches out to third-party hosts on behalf of a request
//! lives here or in [`crate::proxy::epg_generator`].

pub mod stream_resolver;

pub use stream_resolver::{StreamMarkers, StreamResolver, extract_stream_url};
