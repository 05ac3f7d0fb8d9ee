//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::path::PathBuf;

use crate::cache::DEFAULT_NAMESPACE;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Location of the JSON file backing store
    pub store_path: PathBuf,
    /// Namespace used by `PUT /set` when the request names none
    pub default_namespace: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `STORE_PATH` - Backing store file (default: ns-cache-store.json)
    /// - `DEFAULT_NAMESPACE` - Namespace for requests without one (default: cache)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            store_path: env::var("STORE_PATH")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.store_path),
            default_namespace: env::var("DEFAULT_NAMESPACE")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.default_namespace),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            store_path: PathBuf::from("ns-cache-store.json"),
            default_namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}
