use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

pub const DEFAULT_FEED_URL: &str =
    "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_day.geojson";
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 5 * 60 * 1000;

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid feed endpoint '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("invalid refresh interval: {0}ms")]
    InvalidInterval(u64),

    #[error("unreadable config: {reason}")]
    Parse { reason: String },
}

/// Feed endpoint that is known to be safe to hand to the HTTP capability.
/// Only [`FeedUrl::new`] builds one; shells send plain strings in
/// [`FeedConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeedUrl(String);

impl FeedUrl {
    pub fn new(url: impl Into<String>) -> Result<Self, ConfigError> {
        let url = url.into();
        let invalid = |reason: String| ConfigError::InvalidEndpoint {
            url: truncate_url(&url),
            reason,
        };

        let parsed = Url::parse(url.trim()).map_err(|e| invalid(e.to_string()))?;

        let scheme = parsed.scheme();
        if scheme != "http" && scheme != "https" {
            return Err(invalid(format!(
                "invalid scheme '{scheme}', only 'http' and 'https' are allowed"
            )));
        }
        if parsed.host_str().is_none() {
            return Err(invalid("URL must have a host".into()));
        }
        if !parsed.username().is_empty() || parsed.password().is_some() {
            return Err(invalid("credentials in URL are not allowed".into()));
        }

        Ok(Self(parsed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for FeedUrl {
    fn default() -> Self {
        Self(DEFAULT_FEED_URL.to_owned())
    }
}

impl std::fmt::Display for FeedUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn truncate_url(url: &str) -> String {
    match url.char_indices().nth(100) {
        Some((cut, _)) => format!("{}...", &url[..cut]),
        None => url.to_string(),
    }
}

/// Settings a shell may override at startup. Missing keys keep defaults.
///
/// Deserializing never checks values, so a bad endpoint still reaches
/// [`FeedConfig::validate`] and can fall back to defaults instead of
/// failing the whole event at the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub endpoint: String,
    pub refresh_interval_ms: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_FEED_URL.to_owned(),
            refresh_interval_ms: DEFAULT_REFRESH_INTERVAL_MS,
        }
    }
}

impl FeedConfig {
    /// Parses and validates a shell-supplied document.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<FeedSettings, ConfigError> {
        let endpoint = FeedUrl::new(self.endpoint.as_str())?;
        if self.refresh_interval_ms == 0 {
            return Err(ConfigError::InvalidInterval(self.refresh_interval_ms));
        }
        Ok(FeedSettings {
            endpoint,
            refresh_interval_ms: self.refresh_interval_ms,
        })
    }
}

/// A [`FeedConfig`] that passed validation. This is what the core runs on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSettings {
    pub endpoint: FeedUrl,
    pub refresh_interval_ms: u64,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            endpoint: FeedUrl::default(),
            refresh_interval_ms: DEFAULT_REFRESH_INTERVAL_MS,
        }
    }
}
