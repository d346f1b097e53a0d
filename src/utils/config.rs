// Configuration utilities
// Author: Gabriel Demetrios Lafis

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::AppError;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub cache: CacheConfig,
    pub sessions: SessionsConfig,
    pub preview: PreviewConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
    pub enable_cors: bool,
    /// Largest accepted upload, in bytes
    pub max_upload_bytes: usize,
}

/// Ingestion cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub capacity: usize,
    pub ttl_secs: Option<u64>,
}

/// Session store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionsConfig {
    /// Most sessions open at once; the least recently used is evicted
    pub capacity: usize,
    /// Sessions unused for this long are discarded
    pub idle_ttl_secs: Option<u64>,
}

/// Preview configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Rows shown in the raw data preview
    pub rows: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            workers: None,
            enable_cors: false,
            max_upload_bytes: 200 * 1024 * 1024,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            capacity: 32,
            ttl_secs: None,
        }
    }
}

impl Default for SessionsConfig {
    fn default() -> Self {
        SessionsConfig {
            capacity: 64,
            idle_ttl_secs: Some(3600),
        }
    }
}

impl Default for PreviewConfig {
    fn default() -> Self {
        PreviewConfig { rows: 5 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON or YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => {
                serde_json::from_str(&contents).map_err(|e| AppError::Config(e.to_string()))
            }
            Some("yaml") | Some("yml") => {
                serde_yaml::from_str(&contents).map_err(|e| AppError::Config(e.to_string()))
            }
            _ => Err(AppError::Config(format!(
                "Unsupported config file format: {}",
                path.display()
            ))),
        }
    }

    /// Get the log level filter
    pub fn log_level_filter(&self) -> log::LevelFilter {
        match self.logging.level.to_lowercase().as_str() {
            "off" => log::LevelFilter::Off,
            "error" => log::LevelFilter::Error,
            "warn" => log::LevelFilter::Warn,
            "info" => log::LevelFilter::Info,
            "debug" => log::LevelFilter::Debug,
            "trace" => log::LevelFilter::Trace,
            _ => log::LevelFilter::Info,
        }
    }
}
