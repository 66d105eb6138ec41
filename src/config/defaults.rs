/// Configuration default values
///
/// This module contains all the default values for configuration options,
/// making them easily changeable in one central location.
use std::time::Duration;

// Web server defaults
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

// Outbound HTTP defaults
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// Stream page markers
pub const DEFAULT_FILE_MARKER: &str = "file";
pub const DEFAULT_FORMAT_MARKER: &str = "m3u8";

// EPG aggregation defaults
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 5;
pub const DEFAULT_EPG_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

// Response cache defaults
pub const DEFAULT_EPG_TTL: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_STREAM_TTL: Duration = Duration::from_secs(60);
pub const DEFAULT_DEGRADED_EPG_TTL: Duration = Duration::from_secs(60);
pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 256;

// Catalog defaults
pub const DEFAULT_REGION: &str = "eu";

// Environment variable prefix for overrides, e.g. CHANNEL_GUIDE_WEB__PORT=9000
pub const ENV_PREFIX: &str = "CHANNEL_GUIDE_";
