// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;

/// Main configuration structure
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub http: HttpConfig,
    pub performance: PerformanceConfig,
    /// Extra response headers applied before the isolation headers
    pub headers: Vec<HeaderRule>,
}

/// Server configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Document root served to clients
    pub root: PathBuf,
    pub workers: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            root: PathBuf::from("."),
            workers: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    pub error_log_file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            access_log: true,
            access_log_format: "common".to_string(),
            access_log_file: None,
            error_log_file: None,
        }
    }
}

/// HTTP configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct HttpConfig {
    pub server_name: String,
    pub index_files: Vec<String>,
    /// Render an HTML listing for directories without an index file
    pub directory_listing: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            server_name: concat!("coi-serve/", env!("CARGO_PKG_VERSION")).to_string(),
            index_files: vec!["index.html".to_string(), "index.htm".to_string()],
            directory_listing: true,
        }
    }
}

/// Performance configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
    pub max_connections: Option<u64>,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            keep_alive: true,
            max_connections: None,
        }
    }
}

/// A fixed response header added to every response
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct HeaderRule {
    pub name: String,
    pub value: String,
}
