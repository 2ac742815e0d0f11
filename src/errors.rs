//! # Error Handling Module
//!
//! ## Purpose
//! Centralized error handling for the tax reference catalog, providing
//! structured error types and conversion utilities for all system components.
//!
//! ## Input/Output Specification
//! - **Input**: Error conditions from various system components
//! - **Output**: Structured error types with context and error chains
//! - **Error Categories**: Storage, Import, Query, API, Configuration
//!
//! ## Key Features
//! - Hierarchical error types with detailed context
//! - Automatic error conversion and chaining
//! - User-friendly error messages for API responses
//! - Structured logging integration

use thiserror::Error;

/// Result type used throughout the application
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Comprehensive error types for the catalog service
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Generic I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Embedded database errors
    #[error("Database error: {0}")]
    Database(#[from] sled::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Validation errors
    #[error("Validation failed for field '{field}': {reason}")]
    ValidationFailed { field: String, reason: String },

    // Storage errors
    #[error("Storage backend unavailable: {path} - {reason}")]
    StorageUnavailable { path: String, reason: String },

    #[error("Persisted collection is corrupt: {details}")]
    StorageCorrupted { details: String },

    // Catalog errors
    #[error("Unknown category: '{category}'")]
    UnknownCategory { category: String },

    #[error("Document not found: {id}")]
    DocumentNotFound { id: String },

    #[error("Invalid import payload: {reason}")]
    InvalidImport { reason: String },

    #[error("Reset requires explicit confirmation")]
    ResetNotConfirmed,

    // API errors
    #[error("Invalid API request: {details}")]
    InvalidApiRequest { details: String },

    /// Internal system errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CatalogError {
    /// Check if the error is recoverable (can be retried)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CatalogError::Io(_)
                | CatalogError::Database(_)
                | CatalogError::StorageUnavailable { .. }
        )
    }

    /// Get error category for metrics and logging
    pub fn category(&self) -> &'static str {
        match self {
            CatalogError::Config { .. } | CatalogError::Toml(_) => "configuration",
            CatalogError::Io(_)
            | CatalogError::Database(_)
            | CatalogError::StorageUnavailable { .. }
            | CatalogError::StorageCorrupted { .. } => "storage",
            CatalogError::Json(_) | CatalogError::InvalidImport { .. } => "import",
            CatalogError::UnknownCategory { .. }
            | CatalogError::DocumentNotFound { .. }
            | CatalogError::ResetNotConfirmed => "catalog",
            CatalogError::InvalidApiRequest { .. } => "api",
            CatalogError::Internal { .. } | CatalogError::ValidationFailed { .. } => "generic",
        }
    }

    /// HTTP status code the API layer maps this error to
    pub fn status_code(&self) -> u16 {
        match self {
            CatalogError::DocumentNotFound { .. } | CatalogError::UnknownCategory { .. } => 404,
            CatalogError::InvalidImport { .. }
            | CatalogError::ResetNotConfirmed
            | CatalogError::ValidationFailed { .. }
            | CatalogError::InvalidApiRequest { .. } => 400,
            _ => 500,
        }
    }
}
