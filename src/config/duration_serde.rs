//! Serde helpers for human-readable durations in configuration.

use serde::de::{self, Visitor};
use serde::{Deserializer, Serializer};
use std::{fmt, time::Duration};

/// Duration as either whole seconds or a humantime string ("90s", "1h", "1h30m")
pub mod duration {
    use super::*;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let duration_str = humantime::format_duration(*duration).to_string();
        serializer.serialize_str(&duration_str)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DurationVisitor;

        impl Visitor<'_> for DurationVisitor {
            type Value = Duration;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str(
                    "a duration as seconds (number) or human-readable string (e.g., '60s', '5m', '1h')",
                )
            }

            fn visit_u64<E>(self, seconds: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Duration::from_secs(seconds))
            }

            fn visit_i64<E>(self, seconds: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                u64::try_from(seconds)
                    .map(Duration::from_secs)
                    .map_err(|_| de::Error::custom(format!("Duration cannot be negative: {seconds}")))
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                humantime::parse_duration(value)
                    .map_err(|e| de::Error::custom(format!("Invalid duration '{value}': {e}")))
            }
        }

        deserializer.deserialize_any(DurationVisitor)
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use std::time::Duration;

    #[derive(Debug, Serialize, Deserialize)]
    struct Holder {
        #[serde(with = "super::duration")]
        ttl: Duration,
    }

    #[test]
    fn test_parses_human_readable_strings() {
        let holder: Holder = toml::from_str(r#"ttl = "1h30m""#).unwrap();
        assert_eq!(holder.ttl, Duration::from_secs(5400));
    }

    #[test]
    fn test_parses_plain_seconds() {
        let holder: Holder = toml::from_str("ttl = 45").unwrap();
        assert_eq!(holder.ttl, Duration::from_secs(45));
    }

    #[test]
    fn test_rejects_negative_and_garbage() {
        assert!(toml::from_str::<Holder>("ttl = -5").is_err());
        assert!(toml::from_str::<Holder>(r#"ttl = "soon""#).is_err());
    }

    #[test]
    fn test_serializes_as_humantime() {
        let rendered = toml::to_string(&Holder {
            ttl: Duration::from_secs(60),
        })
        .unwrap();
        assert_eq!(rendered.trim(), r#"ttl = "1m""#);
    }
}
