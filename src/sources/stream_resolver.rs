//! Live stream resolution
//!
//! Some channels do not publish a stable stream address. Their player page
//! embeds the current HLS URL as a string literal, e.g.
//!
//! ```text
//! player.setup({ file: "https://cdn.example.com/live/playlist.m3u8?t=171", autostart: true });
//! ```
//!
//! [`StreamResolver`] fetches that page and pulls the quoted value out of the
//! first line carrying both the file marker and the media-format marker.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::ResolverConfig;
use crate::errors::SourceResult;
use crate::models::StreamFetcher;
use crate::utils::http_client::HttpFetcher;
use crate::utils::url::UrlUtils;

/// Tokens a page line must contain to be treated as the stream declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamMarkers {
    pub file: String,
    pub format: String,
}

impl From<&ResolverConfig> for StreamMarkers {
    fn from(config: &ResolverConfig) -> Self {
        Self {
            file: config.file_marker.clone(),
            format: config.format_marker.clone(),
        }
    }
}

impl Default for StreamMarkers {
    fn default() -> Self {
        Self::from(&ResolverConfig::default())
    }
}

/// Extract the stream URL from an intermediary page body.
///
/// Scans line by line; on the first line holding both markers and a
/// non-empty double-quoted value, returns the text between its first and
/// second `"`. Lines with both markers but no complete quoted value are
/// skipped.
pub fn extract_stream_url(body: &str, markers: &StreamMarkers) -> Option<String> {
    body.lines()
        .filter(|line| line.contains(&markers.file) && line.contains(&markers.format))
        .find_map(first_quoted_value)
}

fn first_quoted_value(line: &str) -> Option<String> {
    let (_, rest) = line.split_once('"')?;
    let (value, _) = rest.split_once('"')?;
    (!value.is_empty()).then(|| value.to_string())
}

/// Resolves a channel's current stream URL from its intermediary page
pub struct StreamResolver {
    client: Arc<dyn HttpFetcher>,
    markers: StreamMarkers,
}

impl StreamResolver {
    pub fn new(client: Arc<dyn HttpFetcher>, markers: StreamMarkers) -> Self {
        Self { client, markers }
    }

    /// Fetch the page for `fetcher` and extract its stream URL.
    ///
    /// `Ok(None)` means the page was reachable but carried no stream; fetch
    /// failures are returned as errors for the caller to map.
    pub async fn resolve(&self, fetcher: &StreamFetcher) -> SourceResult<Option<String>> {
        debug!(
            route = %fetcher.route_name,
            page = %UrlUtils::obfuscate_credentials(&fetcher.url),
            "Resolving stream URL"
        );

        let body = self.client.fetch_text(&fetcher.url).await?;

        match extract_stream_url(&body, &self.markers) {
            Some(stream_url) => {
                info!(
                    route = %fetcher.route_name,
                    stream = %UrlUtils::obfuscate_credentials(&stream_url),
                    "Resolved stream URL"
                );
                Ok(Some(stream_url))
            }
            None => {
                warn!(
                    route = %fetcher.route_name,
                    page_bytes = body.len(),
                    "No stream URL found on intermediary page"
                );
                Ok(None)
            }
        }
    }
}
