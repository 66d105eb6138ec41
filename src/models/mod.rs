use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Region tag a channel is available in (`eu`, `us`, ...).
///
/// Tags are stored lower-case so lookups from URL paths are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Region(String);

impl Region {
    pub fn new(tag: impl AsRef<str>) -> Self {
        Self(tag.as_ref().trim().to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Region {
    fn from(tag: String) -> Self {
        Self::new(tag)
    }
}

impl From<&str> for Region {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

impl From<Region> for String {
    fn from(region: Region) -> Self {
        region.0
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where to find the live stream for a channel that has no fixed URL.
///
/// The stream address is scraped from `url` on demand and served under
/// `/channel/{route_name}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamFetcher {
    pub route_name: String,
    pub url: String,
}

/// Static catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub channel_id: u32,
    pub name: String,
    #[serde(default)]
    pub logo: String,
    pub regions: BTreeSet<Region>,
    /// Direct playback URL, used when no stream fetcher is configured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_fetcher: Option<StreamFetcher>,
    /// Upstream guide fragment for this channel, overriding the configured template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epg_url: Option<String>,
}

impl Channel {
    pub fn available_in(&self, region: &Region) -> bool {
        self.regions.contains(region)
    }

    /// Route name for channels whose stream is resolved on demand
    pub fn route_name(&self) -> Option<&str> {
        self.stream_fetcher
            .as_ref()
            .map(|fetcher| fetcher.route_name.as_str())
    }
}

/// Per-request projection of a channel used when rendering listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayItem {
    pub channel_id: u32,
    pub name: String,
    pub url: String,
    pub logo: String,
}

impl DisplayItem {
    /// Build the listing entry for `channel`.
    ///
    /// Resolver-backed channels point at this service's `/channel/{route}`
    /// endpoint under `base_url`; the rest use their direct URL.
    pub fn from_channel(channel: &Channel, base_url: &str) -> Self {
        let url = match &channel.stream_fetcher {
            Some(fetcher) => format!(
                "{}/channel/{}",
                base_url.trim_end_matches('/'),
                fetcher.route_name
            ),
            None => channel.url.clone().unwrap_or_default(),
        };

        Self {
            channel_id: channel.channel_id,
            name: channel.name.clone(),
            url,
            logo: channel.logo.clone(),
        }
    }
}
