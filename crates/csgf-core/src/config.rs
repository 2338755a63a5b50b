//! Bot configuration, read from a JSON file.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::policy::{RetryConfig, ThrottleConfig};

/// Log level per component.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogConfig {
    /// Global default level: "trace" | "debug" | "info" | "warn" | "error"
    #[serde(default = "default_level")]
    pub level: String,
    /// Override per component: component_name → level
    #[serde(default)]
    pub components: HashMap<String, String>,
    /// Emit JSON structured logs (true) or human-readable text (false)
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            components: HashMap::new(),
            json: false,
        }
    }
}

/// Stream reconnect policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReconnectConfig {
    /// Consecutive failed attempts before giving up; 0 = fail fast.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

fn default_max_retries() -> u32 { 5 }
fn default_initial_backoff_ms() -> u64 { 500 }
fn default_max_backoff_ms() -> u64 { 60_000 }

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

impl ReconnectConfig {
    pub fn to_retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_retries: self.max_retries,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
            multiplier: 2.0,
        }
    }
}

/// Top-level bot configuration. Every field has a default.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BotConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_ws_url")]
    pub ws_url: String,
    /// Raw `Cookie` header value of a logged-in browser session.
    #[serde(default)]
    pub cookie: String,
    /// Fraction kept from each quiz transfer, in `[0, 1)`.
    #[serde(default = "default_commission_rate")]
    pub commission_rate: f64,
    #[serde(default = "default_advert_interval_secs")]
    pub advert_interval_secs: u64,
    #[serde(default = "default_send_interval_ms")]
    pub send_interval_ms: u64,
    #[serde(default = "default_send_slack_ms")]
    pub send_slack_ms: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub reconnect: ReconnectConfig,
    #[serde(default)]
    pub log: LogConfig,
}

fn default_base_url() -> String { "https://csgf.live".into() }
fn default_ws_url() -> String { "wss://csgf.live/connection/websocket".into() }
fn default_commission_rate() -> f64 { 0.05 }
fn default_advert_interval_secs() -> u64 { 240 }
fn default_send_interval_ms() -> u64 { 1_000 }
fn default_send_slack_ms() -> u64 { 100 }
fn default_request_timeout_secs() -> u64 { 30 }

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            ws_url: default_ws_url(),
            cookie: String::new(),
            commission_rate: default_commission_rate(),
            advert_interval_secs: default_advert_interval_secs(),
            send_interval_ms: default_send_interval_ms(),
            send_slack_ms: default_send_slack_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            reconnect: ReconnectConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl BotConfig {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..1.0).contains(&self.commission_rate) {
            return Err(invalid("commission_rate", format!("{} is outside [0, 1)", self.commission_rate)));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(invalid("base_url", format!("{:?} is not an http(s) URL", self.base_url)));
        }
        if !self.ws_url.starts_with("ws://") && !self.ws_url.starts_with("wss://") {
            return Err(invalid("ws_url", format!("{:?} is not a ws(s) URL", self.ws_url)));
        }
        if self.advert_interval_secs == 0 {
            return Err(invalid("advert_interval_secs", "must be positive".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(invalid("request_timeout_secs", "must be positive".into()));
        }
        if self.reconnect.initial_backoff_ms > self.reconnect.max_backoff_ms {
            return Err(invalid(
                "reconnect.initial_backoff_ms",
                "exceeds reconnect.max_backoff_ms".into(),
            ));
        }
        Ok(())
    }

    /// Commission as integer basis points (0.05 → 500).
    pub fn commission_bps(&self) -> u32 {
        (self.commission_rate * 10_000.0).round() as u32
    }

    pub fn throttle_config(&self) -> ThrottleConfig {
        ThrottleConfig {
            min_interval: Duration::from_millis(self.send_interval_ms),
            slack: Duration::from_millis(self.send_slack_ms),
        }
    }

    pub fn advert_interval(&self) -> Duration {
        Duration::from_secs(self.advert_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}
