//! # Configuration Management Module
//!
//! ## Purpose
//! Centralized configuration management for the catalog service, supporting
//! configuration files and environment variables with validation and
//! type-safe access to all system settings.
//!
//! ## Input/Output Specification
//! - **Input**: Configuration files (TOML), environment variables
//! - **Output**: Validated configuration structs with defaults and overrides
//! - **Validation**: Type checking, range validation
//!
//! ## Configuration Sources (in order of precedence)
//! 1. Environment variables (highest priority)
//! 2. Configuration files
//! 3. Default values (lowest priority)
//!
//! ## Usage
//! ```rust,no_run
//! use tax_reference::config::Config;
//!
//! let config = Config::from_file("config.toml").unwrap();
//! println!("Server port: {}", config.server.port);
//! ```

use crate::errors::{CatalogError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure containing all system settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server and API configuration
    pub server: ServerConfig,
    /// Storage and database settings
    pub storage: StorageConfig,
    /// Search behavior
    pub search: SearchConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Performance tuning
    pub performance: PerformanceConfig,
}

/// Server and API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server bind address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Enable CORS for browser frontends
    pub enable_cors: bool,
    /// Maximum request payload size in MB
    pub max_payload_size_mb: usize,
}

/// Storage and database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Database directory path
    pub db_path: PathBuf,
    /// Well-known key the serialized collection is stored under
    pub collection_key: String,
}

/// Search behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Maximum accepted query length in characters
    pub max_query_length: usize,
    /// Number of leading words used for result snippets
    pub snippet_words: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Enable structured JSON logging
    pub json_format: bool,
}

/// Performance tuning configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceConfig {
    /// Number of server worker threads
    pub worker_threads: usize,
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::from_file("config.toml")
    }

    /// Load configuration from a specific file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!("Configuration file not found: {:?}, using defaults", path);
            let mut config = Self::default();
            config.apply_env_overrides()?;
            config.validate()?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path).map_err(|e| CatalogError::Config {
            message: format!("Failed to read config file {:?}: {}", path, e),
        })?;

        let mut config: Config = toml::from_str(&content).map_err(|e| CatalogError::Config {
            message: format!("Failed to parse config file {:?}: {}", path, e),
        })?;

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(host) = std::env::var("TAX_CATALOG_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("TAX_CATALOG_PORT") {
            self.server.port = port.parse().map_err(|_| CatalogError::Config {
                message: "Invalid port number in TAX_CATALOG_PORT".to_string(),
            })?;
        }
        if let Ok(db_path) = std::env::var("TAX_CATALOG_DB_PATH") {
            self.storage.db_path = PathBuf::from(db_path);
        }
        if let Ok(level) = std::env::var("TAX_CATALOG_LOG_LEVEL") {
            self.logging.level = level;
        }

        Ok(())
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(CatalogError::ValidationFailed {
                field: "server.port".to_string(),
                reason: "Port cannot be zero".to_string(),
            });
        }

        if self.storage.collection_key.is_empty() {
            return Err(CatalogError::ValidationFailed {
                field: "storage.collection_key".to_string(),
                reason: "Collection key cannot be empty".to_string(),
            });
        }

        if self.search.max_query_length == 0 {
            return Err(CatalogError::ValidationFailed {
                field: "search.max_query_length".to_string(),
                reason: "Maximum query length must be greater than zero".to_string(),
            });
        }

        if self.search.snippet_words == 0 {
            return Err(CatalogError::ValidationFailed {
                field: "search.snippet_words".to_string(),
                reason: "Snippet word count must be greater than zero".to_string(),
            });
        }

        if self.performance.worker_threads == 0 {
            return Err(CatalogError::ValidationFailed {
                field: "performance.worker_threads".to_string(),
                reason: "Worker thread count must be greater than zero".to_string(),
            });
        }

        Ok(())
    }

    /// Get configuration as TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CatalogError::Config {
            message: format!("Failed to serialize config to TOML: {}", e),
        })
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = self.to_toml()?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                enable_cors: true,
                max_payload_size_mb: 10,
            },
            storage: StorageConfig {
                db_path: PathBuf::from("./data/catalog.db"),
                collection_key: "expert_tax_docs".to_string(),
            },
            search: SearchConfig {
                max_query_length: 1000,
                snippet_words: 30,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                json_format: false,
            },
            performance: PerformanceConfig {
                worker_threads: num_cpus::get(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = Config::from_file("does-not-exist.toml").unwrap();
        assert_eq!(config.storage.collection_key, "expert_tax_docs");
    }

    #[test]
    fn test_zero_port_rejected() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        let parsed: Config = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.server.port, config.server.port);
        assert_eq!(parsed.storage.collection_key, config.storage.collection_key);
    }
}
