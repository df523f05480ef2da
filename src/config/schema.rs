//! Configuration schema definitions.
//!
//! The deployment descriptor: which handlers and filters to build, the
//! patterns they are bound to, and the settings of the HTTP front end.
//! All types derive Serde traits for deserialization from TOML.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::dispatch::DispatcherType;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DispatchConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Context-wide init parameters.
    pub context: ContextConfig,

    /// Handlers, registered in file order.
    #[serde(rename = "handler")]
    pub handlers: Vec<HandlerConfig>,

    /// Filters, registered in file order. Chain order follows this order.
    #[serde(rename = "filter")]
    pub filters: Vec<FilterConfig>,

    /// Request limits for the front end.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Admin API settings.
    pub admin: AdminConfig,
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

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ContextConfig {
    pub init_parameters: HashMap<String, String>,
}

/// One `[[handler]]` table.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HandlerConfig {
    /// Registration name, unique among handlers.
    pub name: String,

    /// Factory type name.
    #[serde(rename = "type")]
    pub type_name: String,

    /// Path patterns, tried in this order.
    #[serde(default)]
    pub mappings: Vec<String>,

    #[serde(default)]
    pub init_parameters: HashMap<String, String>,

    /// Init order; lower first, unset last.
    #[serde(default)]
    pub load_on_startup: Option<i32>,
}

/// One `[[filter]]` table.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FilterConfig {
    /// Registration name, unique among filters.
    pub name: String,

    /// Factory type name.
    #[serde(rename = "type")]
    pub type_name: String,

    #[serde(default)]
    pub url_patterns: Vec<String>,

    /// Handlers this filter wraps regardless of path.
    #[serde(default)]
    pub handler_names: Vec<String>,

    /// Dispatch types to run for; empty means all.
    #[serde(default)]
    pub dispatch_types: Vec<DispatcherType>,

    #[serde(default)]
    pub init_parameters: HashMap<String, String>,
}

/// Front-end request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Maximum buffered request body in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            max_body_bytes: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable the admin API.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,

    /// Admin API bind address.
    pub bind_address: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            // WARNING: This is a placeholder! Change this in production.
            api_key: "CHANGE_ME_IN_PRODUCTION".to_string(),
            bind_address: "127.0.0.1:8081".to_string(),
        }
    }
}
