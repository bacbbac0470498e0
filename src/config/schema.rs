//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::logging::{LogFilter, LogLevel, LogType};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener and inbound request limits.
    pub server: ServerConfig,

    /// Log taxonomy filtering and subscriber directive.
    pub logging: LoggingConfig,

    /// Outbound webcall clients.
    pub webcall: WebcallConfig,

    /// Route table mapping method + path to endpoint names.
    pub routes: Vec<RouteConfig>,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout (total time for request/response) in seconds.
    pub request_timeout_secs: u64,

    /// Maximum inbound body size in bytes.
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Categories forwarded to the logging hook, e.g. "GeneralLogging|WebcallRequest".
    pub allowed_log_type: LogType,

    /// Minimum severity forwarded to the logging hook.
    pub allowed_log_level: LogLevel,

    /// `tracing-subscriber` directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl LoggingConfig {
    pub fn log_filter(&self) -> LogFilter {
        LogFilter {
            allowed_log_type: self.allowed_log_type,
            allowed_log_level: self.allowed_log_level,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        let filter = LogFilter::default();
        Self {
            allowed_log_type: filter.allowed_log_type,
            allowed_log_level: filter.allowed_log_level,
            filter: "rest_pipeline=info,tower_http=info".to_string(),
        }
    }
}

/// Outbound webcall configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WebcallConfig {
    /// Total timeout per outbound attempt in seconds.
    pub timeout_secs: u64,

    /// Accept any server certificate. Only for test environments.
    pub skip_server_cert_verification: bool,

    /// Client identity presented when a webcall asks for it.
    pub client_cert: Option<ClientCertConfig>,
}

impl Default for WebcallConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 60,
            skip_server_cert_verification: false,
            client_cert: None,
        }
    }
}

/// PEM client identity.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientCertConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// Route configuration mapping a request to an endpoint.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct RouteConfig {
    /// Endpoint name; actions are registered against it.
    pub endpoint: String,

    /// HTTP method (e.g., "GET").
    pub method: String,

    /// Path template with `{param}` segments.
    pub path: String,
}
