//! Client configuration.

use crate::{Error, Result};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Default API host.
pub const DEFAULT_BASE_URL: &str = "https://api.apify.com";

/// Settings consumed when building an [`ApifyClient`](crate::ApifyClient).
///
/// Deserializing rejects unknown fields, so a typo in a config file fails
/// loudly instead of being ignored.
///
/// # Examples
///
/// ```
/// use apify_client::ClientConfig;
///
/// let config = ClientConfig::from_json_str(r#"{"token": "abc", "max_retries": 2}"#).unwrap();
/// assert_eq!(config.max_retries, 2);
/// assert_eq!(config.base_url, "https://api.apify.com");
///
/// assert!(ClientConfig::from_json_str(r#"{"tokne": "abc"}"#).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// API host; `/v2` is appended unless already present.
    pub base_url: String,
    /// API token sent as the `token` query parameter.
    pub token: Option<String>,
    /// Retries after the first attempt.
    pub max_retries: usize,
    /// Base backoff before the first retry, in milliseconds.
    pub min_delay_between_retries_millis: u64,
    /// Per-attempt timeout, in seconds.
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            max_retries: crate::retry::DEFAULT_MAX_RETRIES,
            min_delay_between_retries_millis: crate::retry::DEFAULT_BASE_BACKOFF.as_millis() as u64,
            timeout_secs: 360,
        }
    }
}

impl ClientConfig {
    /// Parses a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigurationError`] on unknown fields, mismatched types
    /// or values rejected by [`ClientConfig::validate`].
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ClientConfig = serde_json::from_str(json)
            .map_err(|e| Error::ConfigurationError(format!("Invalid client config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the configuration before any network activity.
    pub fn validate(&self) -> Result<()> {
        self.api_url()?;

        if matches!(&self.token, Some(token) if token.trim().is_empty()) {
            return Err(Error::ConfigurationError(
                "token must not be empty when provided".to_string(),
            ));
        }
        if self.min_delay_between_retries_millis == 0 {
            return Err(Error::ConfigurationError(
                "min_delay_between_retries_millis must be greater than zero".to_string(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(Error::ConfigurationError(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// The API root: `base_url` with `/v2` appended, unless it already ends in `/v2`.
    pub fn api_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)?;
        if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
            return Err(Error::ConfigurationError(format!(
                "base_url must be an absolute http(s) URL, got `{}`",
                self.base_url
            )));
        }
        let path = url.path().trim_end_matches('/');
        let path = if path.ends_with("/v2") {
            path.to_string()
        } else {
            format!("{}/v2", path)
        };
        url.set_path(&path);
        Ok(url)
    }

    /// Base backoff as a [`Duration`].
    pub fn min_delay_between_retries(&self) -> Duration {
        Duration::from_millis(self.min_delay_between_retries_millis)
    }

    /// Per-attempt timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
