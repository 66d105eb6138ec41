//! Static channel catalog
//!
//! The catalog is read once at start-up, either from the copy embedded in the
//! binary or from a TOML file named in the configuration, validated, and then
//! shared read-only between requests.

use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{info, warn};

use crate::errors::{AppError, AppResult};
use crate::models::{Channel, Region};

pub mod filter;

pub use filter::filter_by_region;

const EMBEDDED_CATALOG: &str = include_str!("../../data/catalog.toml");

static ROUTE_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("route name pattern is valid"));

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    channels: Vec<Channel>,
}

/// Immutable list of known channels
#[derive(Debug, Clone)]
pub struct Catalog {
    channels: Vec<Channel>,
}

impl Catalog {
    /// Validate and wrap an already-built channel list
    pub fn new(channels: Vec<Channel>) -> AppResult<Self> {
        validate_channels(&channels)?;
        Ok(Self { channels })
    }

    /// The catalog compiled into the binary
    pub fn embedded() -> AppResult<Self> {
        Self::from_toml_str(EMBEDDED_CATALOG)
    }

    pub fn from_toml_str(contents: &str) -> AppResult<Self> {
        let file: CatalogFile = toml::from_str(contents)
            .map_err(|e| AppError::configuration(format!("Invalid catalog: {e}")))?;
        Self::new(file.channels)
    }

    /// Load from `path`, or the embedded catalog when no path is configured
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let catalog = match path {
            Some(path) => {
                let contents = std::fs::read_to_string(path).map_err(|e| {
                    AppError::configuration(format!(
                        "Failed to read catalog {}: {e}",
                        path.display()
                    ))
                })?;
                Self::from_toml_str(&contents)?
            }
            None => Self::embedded()?,
        };

        info!(
            channels = catalog.len(),
            source = %path.map_or_else(|| "embedded".to_string(), |p| p.display().to_string()),
            "Channel catalog loaded"
        );
        Ok(catalog)
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Channels available in `region`, in catalog order
    pub fn filter<'a>(
        &'a self,
        region: &'a Region,
    ) -> impl Iterator<Item = &'a Channel> + Clone + 'a {
        filter_by_region(&self.channels, region)
    }
}

fn validate_channels(channels: &[Channel]) -> AppResult<()> {
    let mut seen_ids = HashSet::new();

    for channel in channels {
        if !seen_ids.insert(channel.channel_id) {
            return Err(AppError::configuration(format!(
                "Duplicate channel_id {} ({})",
                channel.channel_id, channel.name
            )));
        }

        match (&channel.url, &channel.stream_fetcher) {
            (None, None) => {
                return Err(AppError::configuration(format!(
                    "Channel {} has neither a url nor a stream_fetcher",
                    channel.name
                )));
            }
            (Some(url), _) => ensure_url(&channel.name, "url", url)?,
            (None, Some(_)) => {}
        }

        if let Some(fetcher) = &channel.stream_fetcher {
            if !ROUTE_NAME_PATTERN.is_match(&fetcher.route_name) {
                return Err(AppError::configuration(format!(
                    "Channel {} has route name '{}' which is not URL-safe",
                    channel.name, fetcher.route_name
                )));
            }
            ensure_url(&channel.name, "stream_fetcher.url", &fetcher.url)?;
        }

        if let Some(epg_url) = &channel.epg_url {
            ensure_url(&channel.name, "epg_url", epg_url)?;
        }

        if channel.regions.is_empty() {
            warn!("Channel {} has no regions and will never be listed", channel.name);
        }
    }

    Ok(())
}

fn ensure_url(channel: &str, field: &str, value: &str) -> AppResult<()> {
    url::Url::parse(value).map(|_| ()).map_err(|e| {
        AppError::configuration(format!("Channel {channel} has invalid {field} '{value}': {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_catalog_is_valid() {
        let catalog = Catalog::embedded().unwrap();
        assert!(!catalog.is_empty());

        let eu = Region::new("eu");
        assert!(catalog.filter(&eu).count() > 0);
        assert!(
            catalog
                .filter(&eu)
                .any(|channel| channel.epg_url.is_some()),
            "default region has no guide source"
        );
    }

    #[test]
    fn test_duplicate_channel_ids_rejected() {
        let err = Catalog::from_toml_str(
            r#"
[[channels]]
channel_id = 1
name = "One"
regions = ["eu"]
url = "https://streams.example.com/one.m3u8"

[[channels]]
channel_id = 1
name = "Also One"
regions = ["eu"]
url = "https://streams.example.com/also-one.m3u8"
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Duplicate channel_id 1"));
    }

    #[test]
    fn test_unsafe_route_name_rejected() {
        let err = Catalog::from_toml_str(
            r#"
[[channels]]
channel_id = 1
name = "One"
regions = ["eu"]
stream_fetcher = { route_name = "one/two", url = "https://www.example.com/live" }
"#,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Configuration { .. }));
    }

    #[test]
    fn test_channel_without_playback_rejected() {
        let err = Catalog::from_toml_str(
            r#"
[[channels]]
channel_id = 1
name = "Nowhere"
regions = ["eu"]
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("neither a url nor a stream_fetcher"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.toml");
        std::fs::write(
            &path,
            r#"
[[channels]]
channel_id = 10
name = "Local"
regions = ["us"]
url = "https://streams.example.com/local.m3u8"
"#,
        )
        .unwrap();

        let catalog = Catalog::load(Some(&path)).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.channels()[0].name, "Local");
    }

    #[test]
    fn test_load_missing_file_is_configuration_error() {
        let err = Catalog::load(Some(Path::new("/nonexistent/catalog.toml"))).unwrap_err();
        assert!(matches!(err, AppError::Configuration { .. }));
    }
}
