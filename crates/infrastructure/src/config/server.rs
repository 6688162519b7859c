//! Listener, CORS and logging settings for the HTTP server.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::default_true;

/// Output format of the tracing subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "ServerConfig::default_host")]
    pub host: String,

    #[serde(default = "ServerConfig::default_port")]
    pub port: u16,

    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Origins allowed by CORS. Empty means any origin, which is only
    /// acceptable outside production.
    #[serde(default)]
    pub allowed_origins: Vec<String>,

    /// Seconds to wait for in-flight requests on shutdown
    #[serde(default = "ServerConfig::default_shutdown_secs")]
    pub shutdown_timeout_secs: u64,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Request body cap in bytes
    #[serde(default = "ServerConfig::default_body_limit")]
    pub max_body_size_json_bytes: usize,
}

impl ServerConfig {
    fn default_host() -> String {
        String::from("127.0.0.1")
    }

    const fn default_port() -> u16 {
        3000
    }

    const fn default_shutdown_secs() -> u64 {
        30
    }

    const fn default_body_limit() -> usize {
        64 * 1024
    }

    /// `host:port` for the listener
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    #[must_use]
    pub fn json_logs(&self) -> bool {
        self.log_format == LogFormat::Json
    }

    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            cors_enabled: true,
            allowed_origins: Vec::new(),
            shutdown_timeout_secs: Self::default_shutdown_secs(),
            log_format: LogFormat::default(),
            max_body_size_json_bytes: Self::default_body_limit(),
        }
    }
}
