//! Tracing bootstrap for applications embedding a provenance graph.

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{ProvenanceError, Result};

/// Configuration for tracing initialization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TracingConfig {
    /// Log level filter, used when `RUST_LOG` is unset
    pub log_level: String,

    /// Enable JSON format for console output
    pub json_format: bool,

    /// Include the event target (module path) in output
    pub with_target: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_format: false,
            with_target: true,
        }
    }
}

impl TracingConfig {
    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Enable JSON format
    pub fn with_json_format(mut self) -> Self {
        self.json_format = true;
        self
    }
}

/// Install a global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over the configured level. Fails if a global
/// subscriber is already installed.
pub fn init_tracing(config: &TracingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| ProvenanceError::Config(format!("invalid log level: {}", e)))?;

    let subscriber = tracing_subscriber::registry().with(env_filter);

    let installed = if config.json_format {
        let fmt_layer = fmt::layer().json().with_target(config.with_target);
        subscriber.with(fmt_layer).try_init()
    } else {
        let fmt_layer = fmt::layer().with_target(config.with_target);
        subscriber.with(fmt_layer).try_init()
    };

    installed.map_err(|e| ProvenanceError::Config(format!("tracing already initialized: {}", e)))
}
