//! XMLTV guide aggregation
//!
//! The guide for a region is the XMLTV envelope around two kinds of content:
//! a `<channel>` header per listed channel, written from the catalog, and one
//! programme fragment per channel fetched from the upstream guide source and
//! passed through untouched. Upstream fetches run concurrently with a fixed
//! upper bound, and fragments are appended in the order they complete.

use futures::stream::{self, StreamExt};
use quick_xml::escape::escape;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::EpgConfig;
use crate::errors::{SourceError, SourceResult};
use crate::models::Channel;
use crate::utils::http_client::HttpFetcher;
use crate::utils::url::UrlUtils;

const XMLTV_HEADER: &str =
    "<?xml version=\"1.0\" encoding=\"utf-8\" ?>\n<!DOCTYPE tv SYSTEM \"xmltv.dtd\">\n<tv>";
const XMLTV_FOOTER: &str = "</tv>";

/// Builds XMLTV documents from the catalog and upstream guide fragments
pub struct EpgAggregator {
    client: Arc<dyn HttpFetcher>,
    url_template: Option<String>,
    max_concurrent_fetches: usize,
    fetch_timeout: Duration,
}

impl EpgAggregator {
    pub fn new(client: Arc<dyn HttpFetcher>, config: &EpgConfig) -> Self {
        Self {
            client,
            url_template: config.url_template.clone(),
            max_concurrent_fetches: config.max_concurrent_fetches.max(1),
            fetch_timeout: config.fetch_timeout,
        }
    }

    /// Upstream guide location for `channel`: its own `epg_url`, else the template
    pub fn source_url(&self, channel: &Channel) -> Option<String> {
        if let Some(url) = &channel.epg_url {
            return Some(url.clone());
        }

        self.url_template.as_ref().map(|template| {
            template
                .replace("{channel_id}", &channel.channel_id.to_string())
                .replace("{name}", &urlencoding::encode(&channel.name))
        })
    }

    /// Build the guide document for `channels`.
    ///
    /// Channel headers come first in the iterator's order; programme
    /// fragments follow in completion order. A fetch that fails or times out
    /// is logged and left out, it never fails the document.
    pub async fn build_guide<'a, I>(&self, channels: I) -> GuideDocument
    where
        I: Iterator<Item = &'a Channel> + Clone,
    {
        let started = Instant::now();
        let mut body = String::from(XMLTV_HEADER);

        let mut channel_count = 0usize;
        for channel in channels.clone() {
            body.push_str(&channel_header(channel));
            channel_count += 1;
        }

        let jobs: Vec<(u32, String)> = channels
            .filter_map(|channel| {
                self.source_url(channel)
                    .map(|url| (channel.channel_id, url))
            })
            .collect();

        let mut completed = stream::iter(jobs)
            .map(|(channel_id, url)| self.fetch_fragment(channel_id, url))
            .buffer_unordered(self.max_concurrent_fetches);

        let mut fetched = 0usize;
        let mut failed = 0usize;
        while let Some((channel_id, result)) = completed.next().await {
            match result {
                Ok(fragment) => {
                    debug!(channel_id, bytes = fragment.len(), "EPG fragment received");
                    body.push_str(&fragment);
                    fetched += 1;
                }
                Err(e) => {
                    warn!(
                        channel_id,
                        url = %e.url(),
                        timeout = e.is_timeout(),
                        error = %e,
                        "EPG fetch failed, omitting programme data"
                    );
                    failed += 1;
                }
            }
        }

        body.push_str(XMLTV_FOOTER);

        info!(
            channels = channel_count,
            fetched,
            failed,
            duration_ms = started.elapsed().as_millis(),
            "EPG guide assembled"
        );
        GuideDocument {
            body,
            fetched,
            failed,
        }
    }

    async fn fetch_fragment(&self, channel_id: u32, url: String) -> (u32, SourceResult<String>) {
        let result = match tokio::time::timeout(self.fetch_timeout, self.client.fetch_text(&url))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(SourceError::Timeout {
                url: UrlUtils::obfuscate_credentials(&url),
            }),
        };
        (channel_id, result)
    }
}

/// An assembled guide and how its upstream fetches went
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuideDocument {
    pub body: String,
    pub fetched: usize,
    pub failed: usize,
}

impl GuideDocument {
    /// At least one channel's programme data is missing because its fetch failed
    pub fn is_degraded(&self) -> bool {
        self.failed > 0
    }
}

/// `<channel>` element for the guide header
pub fn channel_header(channel: &Channel) -> String {
    let mut header = format!(
        "<channel id=\"{}\"><display-name>{}</display-name>",
        channel.channel_id,
        escape(channel.name.as_str())
    );
    if !channel.logo.is_empty() {
        header.push_str(&format!("<icon src=\"{}\" />", escape(channel.logo.as_str())));
    }
    header.push_str("</channel>");
    header
}
