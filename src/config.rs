//! Configuration management for the tumor detection server.

use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::path::Path;

/// Main application configuration.
///
/// Loaded from `config/config.toml` when present; every field has a default
/// so the server also runs without a config file. The `PORT` environment
/// variable overrides the configured listening port.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Listening port (overridden by the PORT environment variable).
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum accepted multipart body size in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

/// Model configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Path to the ONNX model file.
    #[serde(default = "default_model_path")]
    pub path: String,
    /// Version string echoed in analysis responses.
    #[serde(default = "default_model_version")]
    pub version: String,
    /// Number of intra-op threads for ONNX inference.
    #[serde(default = "default_onnx_threads")]
    pub onnx_threads: usize,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level for this crate (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_port() -> u16 {
    8000
}

fn default_max_upload_bytes() -> usize {
    // CT series can be large; 100 MiB covers typical multi-file uploads.
    100 * 1024 * 1024
}

fn default_model_path() -> String {
    "models/best_cnn2.onnx".to_string()
}

fn default_model_version() -> String {
    "BEST_CNN2_v1.0".to_string()
}

fn default_onnx_threads() -> usize {
    1
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: default_model_path(),
            version: default_model_version(),
            onnx_threads: default_onnx_threads(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default location and apply environment
    /// overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from_path("config/config.toml")?;
        if let Ok(port) = std::env::var("PORT") {
            config.server.port = port
                .parse()
                .with_context(|| format!("invalid PORT value: {port}"))?;
        }
        Ok(config)
    }

    /// Load configuration from a specific path. A missing file yields the
    /// built-in defaults.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()).required(false))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            model: ModelConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
