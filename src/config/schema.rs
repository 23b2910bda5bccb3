//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the reflector.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::reflector::DEFAULT_SCAN_MEMORY_LIMIT;

/// Root configuration for the reflector.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ReflectorConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Origin the pages are fetched from.
    pub upstream: UpstreamConfig,

    /// Fixed values baked into the synthesized redirect page.
    pub page: PageConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Upstream origin configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Scheme and host of the reflected site, without a trailing slash.
    pub origin: String,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Maximum number of redirects followed before giving up.
    pub max_redirects: usize,

    /// User-Agent sent with upstream requests.
    pub user_agent: String,

    /// Upper bound on memory the HTML scanner may buffer for one body.
    pub scan_memory_limit_bytes: usize,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            origin: "https://qiita.com".to_string(),
            connect_timeout_secs: 5,
            max_redirects: 10,
            user_agent: concat!("og-reflector/", env!("CARGO_PKG_VERSION")).to_string(),
            scan_memory_limit_bytes: DEFAULT_SCAN_MEMORY_LIMIT,
        }
    }
}

/// Redirect page configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PageConfig {
    /// Origin of the image generation service referenced by `og:image`.
    pub image_origin: String,

    /// Value of `og:site_name`.
    pub site_name: String,

    /// Value of `twitter:card`.
    pub twitter_card: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            image_origin: "https://qiita-ogpimage-getter.hihimamu.workers.dev".to_string(),
            site_name: "Qiita".to_string(),
            twitter_card: "summary_large_image".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable, for development.
    #[default]
    Pretty,
    /// One JSON object per line, for log aggregation.
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
