//! # Tax Reference Catalog Service
//!
//! ## Overview
//! This library implements a reference catalog for Egyptian tax-law documents
//! (laws, office-location directories, executive instructions, court decisions
//! and research fatwas) with category browsing, substring search and a managed,
//! durably persisted document collection.
//!
//! ## Architecture
//! The system is composed of several key modules:
//! - `seed`: Static category configuration and the fixed seed collection
//! - `store`: Persistent document store over an embedded key-value backend
//! - `query`: Category-scoped and global search predicates
//! - `api`: REST API endpoints for browsing, search and management
//! - `config`: Configuration management and settings
//! - `errors`: Centralized error handling and types
//!
//! ## Input/Output Specification
//! - **Input**: Document records (JSON), search queries (text), backup files
//! - **Output**: Filtered document lists, search hits with snippets, backups
//! - **Persistence**: Write-through to a single key in an embedded database
//!
//! ## Usage
//! ```rust,no_run
//! use std::sync::Arc;
//! use tax_reference::store::{DocumentStore, SledBackend};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = Arc::new(SledBackend::open("./data/catalog.db")?);
//!     let store = DocumentStore::open(backend);
//!     println!("Catalog holds {} documents", store.len());
//!     Ok(())
//! }
//! ```

// Core modules
pub mod config;
pub mod errors;
pub mod seed;
pub mod store;
pub mod query;
pub mod api;

// Utilities
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use errors::{CatalogError, Result};
pub use query::{CategoryFilter, SearchHit};
pub use store::DocumentStore;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// The closed set of document categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Tax laws and accounting standards
    Laws,
    /// Tax office location directory
    Locations,
    /// Executive instructions and circulars
    Instructions,
    /// Court rulings and appeal committee decisions
    Decisions,
    /// Opinions issued by the tax research sector
    Fatwas,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Category; 5] = [
        Category::Laws,
        Category::Locations,
        Category::Instructions,
        Category::Decisions,
        Category::Fatwas,
    ];

    /// Lowercase identifier used in URLs and serialized records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Laws => "laws",
            Category::Locations => "locations",
            Category::Instructions => "instructions",
            Category::Decisions => "decisions",
            Category::Fatwas => "fatwas",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "laws" => Ok(Category::Laws),
            "locations" => Ok(Category::Locations),
            "instructions" => Ok(Category::Instructions),
            "decisions" => Ok(Category::Decisions),
            "fatwas" => Ok(Category::Fatwas),
            other => Err(CatalogError::UnknownCategory {
                category: other.to_string(),
            }),
        }
    }
}

/// Location details carried by office-directory documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationInfo {
    /// Street address of the office
    pub address: String,
    /// Administrative office code
    pub code: String,
    /// Geographic jurisdiction
    pub area: String,
}

/// A single catalog document.
///
/// The serialized shape matches the backup file format, so exported
/// collections can be re-imported unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Opaque unique identifier, stable for the document's lifetime
    pub id: String,
    /// Display title
    pub title: String,
    /// Category the document belongs to
    pub category: Category,
    /// Issue date in `YYYY-MM-DD` form; display and sort key only
    pub date: String,
    /// Optional short summary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Full body text; empty when the record is a pure directory entry
    #[serde(default)]
    pub content: String,
    /// Free-text labels, ordered, duplicates permitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Location sub-record, populated for office-directory documents
    #[serde(rename = "locationData", default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationInfo>,
}

impl Document {
    /// Generate a fresh time-based identifier for a user-added document.
    pub fn generate_id() -> String {
        format!("doc-{}", Utc::now().timestamp_millis())
    }

    /// Today's date in the `YYYY-MM-DD` form used by `date`.
    pub fn today() -> String {
        Utc::now().format("%Y-%m-%d").to_string()
    }
}

/// Partial document used by the update operation.
///
/// Every field is optional; fields present in the patch overwrite the
/// corresponding field of the target record, absent fields are preserved.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentPatch {
    pub title: Option<String>,
    pub category: Option<Category>,
    pub date: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    #[serde(rename = "locationData")]
    pub location: Option<LocationInfo>,
}

impl DocumentPatch {
    /// Merge this patch onto `doc`, producing a new record value.
    pub fn apply(&self, doc: &Document) -> Document {
        Document {
            id: doc.id.clone(),
            title: self.title.clone().unwrap_or_else(|| doc.title.clone()),
            category: self.category.unwrap_or(doc.category),
            date: self.date.clone().unwrap_or_else(|| doc.date.clone()),
            description: self.description.clone().or_else(|| doc.description.clone()),
            content: self.content.clone().unwrap_or_else(|| doc.content.clone()),
            tags: self.tags.clone().or_else(|| doc.tags.clone()),
            location: self.location.clone().or_else(|| doc.location.clone()),
        }
    }
}

/// Static configuration for one category of the catalog.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryConfig {
    /// Category identifier
    pub id: Category,
    /// Display title
    pub title: &'static str,
    /// Icon reference for the frontend
    pub icon: &'static str,
    /// Color token for badge rendering
    pub color: &'static str,
    /// Short description of the category contents
    pub description: &'static str,
}

/// Application state shared across request handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::Config>,
    pub store: Arc<store::DocumentStore>,
}
