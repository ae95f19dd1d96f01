//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::modules::{BackendRegistry, ModuleContext};

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Module backends keyed by identifier
    pub registry: Arc<BackendRegistry>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    /// Create state with the built-in modules
    pub fn new(config: ApiConfig) -> Self {
        Self::with_registry(BackendRegistry::with_defaults(), config)
    }

    /// Create state with a custom set of backends
    pub fn with_registry(registry: BackendRegistry, config: ApiConfig) -> Self {
        Self {
            registry: Arc::new(registry),
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Context handed to backends for one request
    pub fn module_context(&self) -> ModuleContext {
        ModuleContext::new(self.config.data_dir.clone())
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Directory holding module data files
    pub data_dir: PathBuf,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            data_dir: PathBuf::from("data"),
        }
    }
}

impl ApiConfig {
    /// Create config with custom host, port and data directory
    pub fn new(host: impl Into<String>, port: u16, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            host: host.into(),
            port,
            data_dir: data_dir.into(),
        }
    }

    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl From<&crate::config::ServerConfig> for ApiConfig {
    fn from(config: &crate::config::ServerConfig) -> Self {
        Self::new(config.host.clone(), config.port, config.data_dir.clone())
    }
}
