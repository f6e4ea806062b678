//! Client configuration.
//!
//! [`SinkConfig`] carries everything a [`SinkClientBuilder`](crate::SinkClientBuilder)
//! needs besides processors. It can be built in code or loaded from JSON:
//!
//! ```json
//! {
//!   "url": "ws://localhost:8080",
//!   "dispatch_mode": "deferred",
//!   "retry": { "kind": "exponential", "initial_ms": 500, "max_ms": 30000, "multiplier": 2.0 },
//!   "connect_timeout_ms": 10000,
//!   "debug": false,
//!   "role": "sink",
//!   "duplicate_policy": "allow"
//! }
//! ```
//!
//! Only `url` is required.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::api::ClientRole;
use crate::connection::{RetryPolicy, DEFAULT_CONNECT_TIMEOUT};
use crate::dispatch::DispatchMode;
use crate::error::{Result, VcpError};
use crate::processor::DuplicatePolicy;

/// Configuration for a sink client.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SinkConfig {
    /// Server endpoint, `ws://` or `wss://`.
    pub url: String,

    #[serde(default)]
    pub dispatch_mode: DispatchMode,

    /// Default: fixed 5000 ms, unlimited attempts.
    #[serde(default)]
    pub retry: RetryPolicy,

    /// Bound on a single connect attempt.
    #[serde(
        rename = "connect_timeout_ms",
        default = "default_connect_timeout",
        with = "millis"
    )]
    pub connect_timeout: Duration,

    /// Trace every raw inbound frame.
    #[serde(default)]
    pub debug: bool,

    /// Role sent in the handshake.
    #[serde(default)]
    pub role: ClientRole,

    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,
}

impl SinkConfig {
    /// Defaults for everything but the URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            dispatch_mode: DispatchMode::default(),
            retry: RetryPolicy::default(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            debug: false,
            role: ClientRole::default(),
            duplicate_policy: DuplicatePolicy::default(),
        }
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SinkConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check values serde cannot.
    pub fn validate(&self) -> Result<()> {
        if !(self.url.starts_with("ws://") || self.url.starts_with("wss://")) {
            return Err(VcpError::Config(format!(
                "url must start with ws:// or wss://, got '{}'",
                self.url
            )));
        }

        if self.connect_timeout.is_zero() {
            return Err(VcpError::Config(
                "connect timeout must be non-zero".to_string(),
            ));
        }

        if let RetryPolicy::Exponential {
            initial,
            max,
            multiplier,
            ..
        } = self.retry
        {
            if !multiplier.is_finite() || multiplier < 1.0 {
                return Err(VcpError::Config(format!(
                    "retry multiplier must be >= 1.0, got {multiplier}"
                )));
            }
            if initial > max {
                return Err(VcpError::Config(
                    "retry initial delay exceeds max delay".to_string(),
                ));
            }
        }

        Ok(())
    }
}

fn default_connect_timeout() -> Duration {
    DEFAULT_CONNECT_TIMEOUT
}

/// Serde helpers for `Duration` fields written as integer milliseconds.
pub(crate) mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
