use anyhow::Result;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::errors::{AppError, AppResult};
use crate::utils::url::UrlUtils;

pub mod defaults;
pub mod duration_serde;

use defaults::*;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default)]
    pub epg: EpgConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public base URL used for playlist links; derived from the request when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// Outbound HTTP client settings shared by stream resolution and EPG fetches
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_connect_timeout", with = "duration_serde::duration")]
    pub connect_timeout: Duration,
    #[serde(default = "default_request_timeout", with = "duration_serde::duration")]
    pub request_timeout: Duration,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

/// Markers a line of an intermediary page must carry to hold the stream URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    #[serde(default = "default_file_marker")]
    pub file_marker: String,
    #[serde(default = "default_format_marker")]
    pub format_marker: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpgConfig {
    /// Upstream guide location for channels without their own `epg_url`.
    /// `{channel_id}` and `{name}` are substituted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_template: Option<String>,
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,
    #[serde(default = "default_epg_fetch_timeout", with = "duration_serde::duration")]
    pub fetch_timeout: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_epg_ttl", with = "duration_serde::duration")]
    pub epg_ttl: Duration,
    #[serde(default = "default_stream_ttl", with = "duration_serde::duration")]
    pub stream_ttl: Duration,
    /// TTL for a guide with missing programme data; `0s` disables caching it
    #[serde(default = "default_degraded_epg_ttl", with = "duration_serde::duration")]
    pub degraded_epg_ttl: Duration,
    #[serde(default = "default_cache_max_entries")]
    pub max_entries: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Catalog TOML file; the embedded catalog is used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(default = "default_region")]
    pub default_region: String,
}

// Web defaults
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

// HTTP defaults
fn default_connect_timeout() -> Duration {
    DEFAULT_CONNECT_TIMEOUT
}

fn default_request_timeout() -> Duration {
    DEFAULT_REQUEST_TIMEOUT
}

// Resolver defaults
fn default_file_marker() -> String {
    DEFAULT_FILE_MARKER.to_string()
}

fn default_format_marker() -> String {
    DEFAULT_FORMAT_MARKER.to_string()
}

// EPG defaults
fn default_max_concurrent_fetches() -> usize {
    DEFAULT_MAX_CONCURRENT_FETCHES
}

fn default_epg_fetch_timeout() -> Duration {
    DEFAULT_EPG_FETCH_TIMEOUT
}

// Cache defaults
fn default_epg_ttl() -> Duration {
    DEFAULT_EPG_TTL
}

fn default_stream_ttl() -> Duration {
    DEFAULT_STREAM_TTL
}

fn default_degraded_epg_ttl() -> Duration {
    DEFAULT_DEGRADED_EPG_TTL
}

fn default_cache_max_entries() -> usize {
    DEFAULT_CACHE_MAX_ENTRIES
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            base_url: None,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: default_connect_timeout(),
            request_timeout: default_request_timeout(),
            user_agent: None,
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            file_marker: default_file_marker(),
            format_marker: default_format_marker(),
        }
    }
}

impl Default for EpgConfig {
    fn default() -> Self {
        Self {
            url_template: None,
            max_concurrent_fetches: default_max_concurrent_fetches(),
            fetch_timeout: default_epg_fetch_timeout(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            epg_ttl: default_epg_ttl(),
            stream_ttl: default_stream_ttl(),
            degraded_epg_ttl: default_degraded_epg_ttl(),
            max_entries: default_cache_max_entries(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: None,
            default_region: default_region(),
        }
    }
}

impl HttpConfig {
    /// User agent sent on every outbound request
    pub fn user_agent(&self) -> String {
        self.user_agent.clone().unwrap_or_else(|| {
            format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
        })
    }
}

impl Config {
    /// Layer defaults, the TOML file (if present) and `CHANNEL_GUIDE_*` environment overrides
    pub fn load_from_file(config_file: &str) -> Result<Self> {
        if !Path::new(config_file).exists() {
            info!("Config file {} not found, using defaults", config_file);
        }

        let config: Config = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.epg.max_concurrent_fetches == 0 {
            return Err(AppError::configuration(
                "epg.max_concurrent_fetches must be at least 1",
            ));
        }
        if self.cache.max_entries == 0 {
            return Err(AppError::configuration("cache.max_entries must be at least 1"));
        }
        if self.resolver.file_marker.is_empty() || self.resolver.format_marker.is_empty() {
            return Err(AppError::configuration("resolver markers must not be empty"));
        }
        if let Some(base_url) = &self.web.base_url
            && !UrlUtils::is_valid(base_url)
        {
            return Err(AppError::configuration(format!(
                "web.base_url is not a valid URL: {base_url}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.epg.max_concurrent_fetches, 5);
        assert_eq!(config.cache.epg_ttl, Duration::from_secs(3600));
        assert_eq!(config.cache.stream_ttl, Duration::from_secs(60));
        assert!(config.cache.degraded_epg_ttl < config.cache.epg_ttl);
        assert_eq!(config.catalog.default_region, "eu");
    }

    #[test]
    fn test_load_from_file_merges_over_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[web]
port = 9191
base_url = "http://tv.local:9191"

[epg]
url_template = "https://guide.example.com/{{channel_id}}.xml"
fetch_timeout = "5s"

[cache]
stream_ttl = "2m"
degraded_epg_ttl = "0s"
"#
        )
        .unwrap();

        let config = Config::load_from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.web.port, 9191);
        assert_eq!(config.web.host, DEFAULT_HOST);
        assert_eq!(config.web.base_url.as_deref(), Some("http://tv.local:9191"));
        assert_eq!(
            config.epg.url_template.as_deref(),
            Some("https://guide.example.com/{channel_id}.xml")
        );
        assert_eq!(config.epg.fetch_timeout, Duration::from_secs(5));
        assert_eq!(config.epg.max_concurrent_fetches, 5);
        assert_eq!(config.cache.stream_ttl, Duration::from_secs(120));
        assert_eq!(config.cache.epg_ttl, DEFAULT_EPG_TTL);
        assert_eq!(config.cache.degraded_epg_ttl, Duration::ZERO);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let config = Config::load_from_file(path.to_str().unwrap()).unwrap();
        assert_eq!(config.web.port, DEFAULT_PORT);
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let mut config = Config::default();
        config.epg.max_concurrent_fetches = 0;
        assert!(matches!(
            config.validate(),
            Err(AppError::Configuration { .. })
        ));
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let mut config = Config::default();
        config.web.base_url = Some("not a url".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_user_agent() {
        let http = HttpConfig::default();
        assert!(http.user_agent().starts_with("channel-guide/"));
    }
}
