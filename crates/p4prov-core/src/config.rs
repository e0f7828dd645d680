//! Reporter configuration.
//!
//! Values come from the process environment (a `.env` file is honored) and
//! may be overridden by CLI flags in the runner. The queue settings are only
//! forwarded to the message source; the dispatcher never interprets them.

use crate::error::{P4ProvError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const ENV_QUEUE_HOST: &str = "P4PROV_QUEUE_HOST";
pub const ENV_QUEUE_PORT: &str = "P4PROV_QUEUE_PORT";
pub const ENV_QUEUE_NAME: &str = "P4PROV_QUEUE_NAME";
pub const ENV_STATE_HISTORY: &str = "P4PROV_STATE_HISTORY";

pub const DEFAULT_QUEUE_HOST: &str = "127.0.0.1";
pub const DEFAULT_QUEUE_PORT: u16 = 5672;
pub const DEFAULT_QUEUE_NAME: &str = "p4_events";

/// How much per-key history the state table keeps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryRetention {
    /// Every distinct value observed for a key, in arrival order.
    #[default]
    Full,
    /// Only the most recent value for a key.
    LatestOnly,
}

impl FromStr for HistoryRetention {
    type Err = P4ProvError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "latest" | "latest_only" => Ok(Self::LatestOnly),
            other => Err(P4ProvError::Configuration(format!(
                "unknown state history retention '{}' (expected 'full' or 'latest')",
                other
            ))),
        }
    }
}

impl fmt::Display for HistoryRetention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "full"),
            Self::LatestOnly => write!(f, "latest"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueConfig {
    pub host: String,
    pub port: u16,
    pub queue_name: String,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_QUEUE_HOST.to_string(),
            port: DEFAULT_QUEUE_PORT,
            queue_name: DEFAULT_QUEUE_NAME.to_string(),
        }
    }
}

impl QueueConfig {
    /// `host:port` address for socket connections.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReporterConfig {
    pub queue: QueueConfig,
    pub history: HistoryRetention,
}

impl ReporterConfig {
    /// Load configuration from the environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded .env file");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup; unset keys keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(host) = lookup(ENV_QUEUE_HOST) {
            config.queue.host = host;
        }
        if let Some(port) = lookup(ENV_QUEUE_PORT) {
            config.queue.port = port.trim().parse().map_err(|_| {
                P4ProvError::Configuration(format!("{} must be a port number, got '{}'", ENV_QUEUE_PORT, port))
            })?;
        }
        if let Some(name) = lookup(ENV_QUEUE_NAME) {
            config.queue.queue_name = name;
        }
        if let Some(history) = lookup(ENV_STATE_HISTORY) {
            config.history = history.parse()?;
        }
        Ok(config)
    }
}
