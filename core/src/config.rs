//! Client configuration.
//!
//! Values come from the environment so the same binary can point at the
//! hosted service or at a local mock server.

use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://anbo-restbeer.azurewebsites.net/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub const BASE_URL_ENV: &str = "CELLAR_API_URL";
pub const TIMEOUT_ENV: &str = "CELLAR_TIMEOUT_SECS";
pub const STALE_POLICY_ENV: &str = "CELLAR_STALE_POLICY";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("CELLAR_TIMEOUT_SECS must be a positive number of seconds, got {0:?}")]
    InvalidTimeout(String),
    #[error("CELLAR_STALE_POLICY must be `last-write-wins` or `discard-stale`, got {0:?}")]
    InvalidStalePolicy(String),
}

/// How list results that arrive out of order are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StalePolicy {
    /// Every completed fetch overwrites the list; the last to land wins.
    #[default]
    LastWriteWins,
    /// A fetch is dropped if a newer one was already applied, or the list
    /// was cleared after it was issued.
    DiscardStale,
}

impl std::str::FromStr for StalePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "last-write-wins" => Ok(StalePolicy::LastWriteWins),
            "discard-stale" => Ok(StalePolicy::DiscardStale),
            _ => Err(ConfigError::InvalidStalePolicy(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub stale_policy: StalePolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            stale_policy: StalePolicy::default(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Unset keys keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(url) = lookup(BASE_URL_ENV).filter(|u| !u.trim().is_empty()) {
            config.base_url = url.trim().to_string();
        }
        if let Some(raw) = lookup(TIMEOUT_ENV) {
            let secs: u64 = raw
                .trim()
                .parse()
                .ok()
                .filter(|s| *s > 0)
                .ok_or_else(|| ConfigError::InvalidTimeout(raw.clone()))?;
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(raw) = lookup(STALE_POLICY_ENV) {
            config.stale_policy = raw.parse()?;
        }
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_stale_policy(mut self, policy: StalePolicy) -> Self {
        self.stale_policy = policy;
        self
    }
}
