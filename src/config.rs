use std::time::Duration;

use crate::error::ConfigError;

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://envoyer.io/api";

/// Per-request timeout applied when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

pub const API_KEY_VAR: &str = "ENVOYER_API_KEY";
/// Older scripts read the credential from `API_KEY`; still honoured.
pub const LEGACY_API_KEY_VAR: &str = "API_KEY";
pub const BASE_URL_VAR: &str = "ENVOYER_BASE_URL";
pub const TIMEOUT_VAR: &str = "ENVOYER_TIMEOUT_SECS";

/// Connection settings for [`EnvoyerClient`](crate::EnvoyerClient).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl Config {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Read the configuration from the process environment.
    ///
    /// Fails with [`ConfigError::MissingCredential`] when neither
    /// `ENVOYER_API_KEY` nor `API_KEY` holds a non-blank value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = non_blank(API_KEY_VAR)
            .or_else(|| non_blank(LEGACY_API_KEY_VAR))
            .ok_or(ConfigError::MissingCredential { var: API_KEY_VAR })?;

        let mut config = Self::new(api_key.trim());

        if let Some(url) = non_blank(BASE_URL_VAR) {
            config.base_url = url;
        }
        if let Some(raw) = non_blank(TIMEOUT_VAR) {
            config.timeout = parse_timeout(&raw)?;
        }

        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Parse a whole, positive number of seconds.
pub fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidTimeout {
            value: raw.to_string(),
        }),
    }
}
