//! # Document Store Module
//!
//! ## Purpose
//! Owns the single authoritative in-memory document collection and keeps it
//! mirrored write-through into a durable key-value backend.
//!
//! ## Input/Output Specification
//! - **Input**: Document records, patches, backup payloads
//! - **Output**: Collection snapshots, persisted state under one well-known key
//! - **Storage**: Sled embedded database, or any [`StorageBackend`] capability
//!
//! ## Key Features
//! - Load-or-seed initialization that never fails startup
//! - Write-through persistence after every mutation, best-effort
//! - Shallow-merge updates producing new record values
//! - Confirmation-gated reset and all-or-nothing import
//!
//! The durable layout is a single key holding the JSON-serialized document
//! array, the same shape the export file carries.

use crate::errors::{CatalogError, Result};
use crate::seed::seed_documents;
use crate::{Category, Document, DocumentPatch};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Default key the serialized collection is stored under.
pub const DEFAULT_COLLECTION_KEY: &str = "expert_tax_docs";

/// Key-value capability the store persists through.
///
/// Implementations only need get/set semantics over string values; the store
/// never enumerates keys or deletes.
pub trait StorageBackend: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn read(&self, key: &str) -> Result<Option<String>>;
    /// Write `value` under `key`, replacing any previous value.
    fn write(&self, key: &str, value: &str) -> Result<()>;
    /// Flush pending writes to durable storage.
    fn flush(&self) -> Result<()>;
}

/// Sled-backed storage
pub struct SledBackend {
    db: sled::Db,
    tree: sled::Tree,
}

impl SledBackend {
    /// Open (or create) the database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = sled::open(path).map_err(|e| CatalogError::StorageUnavailable {
            path: path.to_string_lossy().to_string(),
            reason: e.to_string(),
        })?;

        let tree = db
            .open_tree("catalog")
            .map_err(|e| CatalogError::StorageUnavailable {
                path: path.to_string_lossy().to_string(),
                reason: format!("Failed to open catalog tree: {}", e),
            })?;

        Ok(Self { db, tree })
    }
}

impl StorageBackend for SledBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        match self.tree.get(key.as_bytes())? {
            Some(raw) => {
                let value = String::from_utf8(raw.to_vec()).map_err(|e| {
                    CatalogError::StorageCorrupted {
                        details: format!("Stored value is not valid UTF-8: {}", e),
                    }
                })?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        self.tree.insert(key.as_bytes(), value.as_bytes())?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }
}

/// In-memory storage fake, for tests and embedded use.
#[derive(Default)]
pub struct MemoryBackend {
    cells: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a key, e.g. to simulate a previously persisted state.
    pub fn preload(&self, key: &str, value: &str) {
        self.cells
            .lock()
            .insert(key.to_string(), value.to_string());
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.cells.lock().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        self.cells
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        Ok(())
    }
}

/// Explicit confirmation token gating the destructive reset operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

/// Per-category document count, for statistics reporting.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryCount {
    pub category: Category,
    pub count: usize,
}

/// Catalog statistics
#[derive(Debug, Clone, Serialize)]
pub struct CatalogStats {
    pub total_documents: usize,
    pub by_category: Vec<CategoryCount>,
}

/// The authoritative document collection with write-through persistence.
///
/// Readers observe the post-mutation state as soon as a mutation call
/// returns; the durable write is a best-effort side effect whose failure is
/// logged and swallowed.
pub struct DocumentStore {
    backend: Arc<dyn StorageBackend>,
    collection_key: String,
    documents: RwLock<Vec<Document>>,
}

impl DocumentStore {
    /// Open the store under the default collection key.
    pub fn open(backend: Arc<dyn StorageBackend>) -> Self {
        Self::open_with_key(backend, DEFAULT_COLLECTION_KEY)
    }

    /// Open the store, loading the persisted collection or falling back to
    /// the seed set. Never fails: corrupt or unreadable persisted state is
    /// logged and replaced by the seed collection.
    pub fn open_with_key(backend: Arc<dyn StorageBackend>, collection_key: &str) -> Self {
        let initial = match backend.read(collection_key) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<Document>>(&raw) {
                Ok(docs) => {
                    tracing::info!("Loaded {} documents from storage", docs.len());
                    docs
                }
                Err(e) => {
                    tracing::error!("Persisted collection is corrupt, using seed data: {}", e);
                    seed_documents()
                }
            },
            Ok(None) => {
                tracing::info!("No persisted collection found, using seed data");
                seed_documents()
            }
            Err(e) => {
                tracing::error!("Failed to read persisted collection, using seed data: {}", e);
                seed_documents()
            }
        };

        let store = Self {
            backend,
            collection_key: collection_key.to_string(),
            documents: RwLock::new(initial),
        };

        // Mirror the initial state so first start leaves a durable copy.
        store.persist(&store.documents.read());
        store
    }

    /// Snapshot of the current collection, in insertion order.
    pub fn documents(&self) -> Vec<Document> {
        self.documents.read().clone()
    }

    /// Number of documents in the collection.
    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }

    /// Find a document by id. With a duplicate id only the first match is
    /// returned; uniqueness is a store invariant, not an enforced constraint.
    pub fn find(&self, id: &str) -> Option<Document> {
        self.documents.read().iter().find(|d| d.id == id).cloned()
    }

    /// Add a document to the front of the collection (newest first).
    pub fn add(&self, doc: Document) {
        let mut docs = self.documents.write();
        tracing::debug!("Adding document: {}", doc.id);
        docs.insert(0, doc);
        self.persist(&docs);
    }

    /// Shallow-merge `patch` into the document with `id`, producing a new
    /// record value. Returns `false` (and leaves the collection untouched)
    /// when no document matches.
    pub fn update(&self, id: &str, patch: &DocumentPatch) -> bool {
        let mut docs = self.documents.write();
        let Some(position) = docs.iter().position(|d| d.id == id) else {
            tracing::debug!("Update ignored, no document with id: {}", id);
            return false;
        };

        let updated = patch.apply(&docs[position]);
        docs[position] = updated;
        self.persist(&docs);
        true
    }

    /// Remove the document with `id`. Returns `false` when no document
    /// matches; relative order of the remaining documents is preserved.
    pub fn delete(&self, id: &str) -> bool {
        let mut docs = self.documents.write();
        let before = docs.len();
        docs.retain(|d| d.id != id);

        if docs.len() == before {
            tracing::debug!("Delete ignored, no document with id: {}", id);
            return false;
        }

        self.persist(&docs);
        true
    }

    /// Replace the collection with the seed set. Requires an affirmative
    /// [`Confirmation`]; a declined confirmation is rejected before any
    /// mutation.
    pub fn reset(&self, confirmation: Confirmation) -> Result<()> {
        if confirmation != Confirmation::Confirmed {
            return Err(CatalogError::ResetNotConfirmed);
        }

        let mut docs = self.documents.write();
        *docs = seed_documents();
        self.persist(&docs);
        tracing::info!("Collection reset to seed data ({} documents)", docs.len());
        Ok(())
    }

    /// Replace the entire collection with an imported payload.
    ///
    /// The payload must be a JSON array whose elements deserialize as
    /// documents; anything else is rejected before any mutation. Returns the
    /// number of imported documents.
    pub fn import(&self, payload: Value) -> Result<usize> {
        if !payload.is_array() {
            return Err(CatalogError::InvalidImport {
                reason: "Expected an array of documents".to_string(),
            });
        }

        let imported: Vec<Document> =
            serde_json::from_value(payload).map_err(|e| CatalogError::InvalidImport {
                reason: format!("Malformed document record: {}", e),
            })?;

        let mut docs = self.documents.write();
        let count = imported.len();
        *docs = imported;
        self.persist(&docs);
        tracing::info!("Imported collection of {} documents", count);
        Ok(count)
    }

    /// Serialize the current collection as a pretty-printed backup payload.
    pub fn export_json(&self) -> Result<String> {
        let docs = self.documents.read();
        Ok(serde_json::to_string_pretty(&*docs)?)
    }

    /// Date-stamped filename the export is offered under.
    pub fn export_filename(&self) -> String {
        format!("tax-reference-backup-{}.json", Document::today())
    }

    /// Catalog statistics: total and per-category document counts.
    pub fn stats(&self) -> CatalogStats {
        let docs = self.documents.read();
        let by_category = Category::ALL
            .iter()
            .map(|&category| CategoryCount {
                category,
                count: docs.iter().filter(|d| d.category == category).count(),
            })
            .collect();

        CatalogStats {
            total_documents: docs.len(),
            by_category,
        }
    }

    /// Health check: the backend must be readable.
    pub fn health_check(&self) -> Result<()> {
        self.backend.read(&self.collection_key).map(|_| ())
    }

    /// Flush the backend, e.g. at graceful shutdown.
    pub fn flush(&self) -> Result<()> {
        self.backend.flush()
    }

    /// Write-through: serialize the full collection back to the well-known
    /// key. Failures are logged and swallowed; the in-memory state remains
    /// authoritative and the next mutation retries naturally.
    fn persist(&self, docs: &[Document]) {
        let serialized = match serde_json::to_string(docs) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!("Failed to serialize collection: {}", e);
                return;
            }
        };

        if let Err(e) = self.backend.write(&self.collection_key, &serialized) {
            tracing::error!("Failed to persist collection: {}", e);
        }
    }
}

/// Shallow acceptance heuristic for backup payloads: an array that is empty
/// or whose first element carries both an `id` and a `title`. The management
/// surface applies this before committing an import.
pub fn is_backup_payload(payload: &Value) -> bool {
    match payload.as_array() {
        Some(items) => match items.first() {
            Some(first) => first.get("id").is_some() && first.get("title").is_some(),
            None => true,
        },
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn memory_store() -> DocumentStore {
        DocumentStore::open(Arc::new(MemoryBackend::new()))
    }

    fn sample_document(id: &str) -> Document {
        Document {
            id: id.to_string(),
            title: "Income Tax".to_string(),
            category: Category::Laws,
            date: "2024-01-01".to_string(),
            description: Some("A sample law".to_string()),
            content: "Article 1".to_string(),
            tags: Some(vec!["income".to_string()]),
            location: None,
        }
    }

    /// Backend that accepts nothing, for the write-failure path.
    struct FailingBackend;

    impl StorageBackend for FailingBackend {
        fn read(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }

        fn write(&self, _key: &str, _value: &str) -> Result<()> {
            Err(CatalogError::Internal {
                message: "disk full".to_string(),
            })
        }

        fn flush(&self) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_opens_with_seed_when_storage_empty() {
        let store = memory_store();
        assert_eq!(store.documents(), seed_documents());
    }

    #[test]
    fn test_corrupt_payload_falls_back_to_seed() {
        let backend = Arc::new(MemoryBackend::new());
        backend.preload(DEFAULT_COLLECTION_KEY, "{not valid json");

        let store = DocumentStore::open(backend);
        assert_eq!(store.documents(), seed_documents());
    }

    #[test]
    fn test_add_then_find_returns_equal_record() {
        let store = memory_store();
        let doc = sample_document("doc-1");

        store.add(doc.clone());
        assert_eq!(store.find("doc-1"), Some(doc));
    }

    #[test]
    fn test_add_prepends() {
        let store = memory_store();
        store.add(sample_document("doc-1"));
        store.add(sample_document("doc-2"));

        let docs = store.documents();
        assert_eq!(docs[0].id, "doc-2");
        assert_eq!(docs[1].id, "doc-1");
    }

    #[test]
    fn test_update_overwrites_present_fields_only() {
        let store = memory_store();
        store.add(sample_document("doc-1"));

        let patch = DocumentPatch {
            title: Some("Amended Income Tax".to_string()),
            ..DocumentPatch::default()
        };
        assert!(store.update("doc-1", &patch));

        let updated = store.find("doc-1").unwrap();
        assert_eq!(updated.title, "Amended Income Tax");
        assert_eq!(updated.description.as_deref(), Some("A sample law"));
        assert_eq!(updated.content, "Article 1");
        assert_eq!(updated.tags, Some(vec!["income".to_string()]));
    }

    #[test]
    fn test_update_unknown_id_leaves_collection_unchanged() {
        let store = memory_store();
        let before = store.documents();

        let patch = DocumentPatch {
            title: Some("ghost".to_string()),
            ..DocumentPatch::default()
        };
        assert!(!store.update("missing", &patch));
        assert_eq!(store.documents(), before);
    }

    #[test]
    fn test_delete_removes_only_the_matching_record() {
        let store = memory_store();
        store.add(sample_document("doc-1"));
        store.add(sample_document("doc-2"));

        let before = store.documents();
        assert!(store.delete("doc-1"));

        let after = store.documents();
        assert_eq!(after.len(), before.len() - 1);
        assert!(after.iter().all(|d| d.id != "doc-1"));

        // Relative order of the survivors is untouched.
        let survivors: Vec<_> = before.iter().filter(|d| d.id != "doc-1").collect();
        assert!(after.iter().zip(survivors).all(|(a, b)| a == b));
    }

    #[test]
    fn test_delete_unknown_id_leaves_collection_unchanged() {
        let store = memory_store();
        let before = store.documents();

        assert!(!store.delete("missing"));
        assert_eq!(store.documents(), before);
    }

    #[test]
    fn test_reset_confirmed_restores_seed() {
        let store = memory_store();
        store.add(sample_document("doc-1"));
        store.delete("law-91-2005");

        store.reset(Confirmation::Confirmed).unwrap();
        assert_eq!(store.documents(), seed_documents());
    }

    #[test]
    fn test_reset_declined_is_rejected_without_mutation() {
        let store = memory_store();
        store.add(sample_document("doc-1"));
        let before = store.documents();

        let err = store.reset(Confirmation::Declined).unwrap_err();
        assert!(matches!(err, CatalogError::ResetNotConfirmed));
        assert_eq!(store.documents(), before);
    }

    #[test]
    fn test_import_non_array_rejected_without_mutation() {
        let store = memory_store();
        let before = store.documents();

        let err = store.import(json!({"id": "x"})).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidImport { .. }));
        assert_eq!(store.documents(), before);
    }

    #[test]
    fn test_import_array_replaces_collection() {
        let store = memory_store();
        let payload = serde_json::to_value(vec![sample_document("doc-9")]).unwrap();

        let count = store.import(payload).unwrap();
        assert_eq!(count, 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.find("doc-9"), Some(sample_document("doc-9")));
    }

    #[test]
    fn test_import_empty_array_empties_collection() {
        let store = memory_store();
        assert_eq!(store.import(json!([])).unwrap(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_export_import_round_trip() {
        let store = memory_store();
        store.add(sample_document("doc-1"));
        let at_export = store.documents();

        let exported = store.export_json().unwrap();
        store.delete("doc-1");
        store.delete("law-91-2005");

        let payload: Value = serde_json::from_str(&exported).unwrap();
        store.import(payload).unwrap();
        assert_eq!(store.documents(), at_export);
    }

    #[test]
    fn test_mutations_survive_reopen_through_same_backend() {
        let backend = Arc::new(MemoryBackend::new());

        let store = DocumentStore::open(backend.clone());
        store.add(sample_document("doc-1"));
        drop(store);

        let reopened = DocumentStore::open(backend);
        assert_eq!(reopened.find("doc-1"), Some(sample_document("doc-1")));
    }

    #[test]
    fn test_failing_backend_keeps_memory_state_authoritative() {
        let store = DocumentStore::open(Arc::new(FailingBackend));
        store.add(sample_document("doc-1"));

        // The write-through failed silently; reads still serve the mutation.
        assert_eq!(store.find("doc-1"), Some(sample_document("doc-1")));
        assert_eq!(store.len(), seed_documents().len() + 1);
    }

    #[test]
    fn test_sled_backend_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let backend = SledBackend::open(dir.path().join("catalog.db")).unwrap();

        backend.write("k", "v").unwrap();
        assert_eq!(backend.read("k").unwrap().as_deref(), Some("v"));
        assert_eq!(backend.read("absent").unwrap(), None);
        backend.flush().unwrap();
    }

    #[test]
    fn test_sled_backed_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.db");

        {
            let backend = Arc::new(SledBackend::open(&path).unwrap());
            let store = DocumentStore::open(backend);
            store.add(sample_document("doc-1"));
            store.flush().unwrap();
        }

        let backend = Arc::new(SledBackend::open(&path).unwrap());
        let store = DocumentStore::open(backend);
        assert_eq!(store.find("doc-1"), Some(sample_document("doc-1")));
    }

    #[test]
    fn test_stats_counts_by_category() {
        let store = memory_store();
        let stats = store.stats();

        assert_eq!(stats.total_documents, seed_documents().len());
        let laws = stats
            .by_category
            .iter()
            .find(|c| c.category == Category::Laws)
            .unwrap();
        assert_eq!(laws.count, 2);
    }

    #[test]
    fn test_backup_payload_heuristic() {
        assert!(is_backup_payload(&json!([])));
        assert!(is_backup_payload(&json!([{"id": "a", "title": "t"}])));
        assert!(!is_backup_payload(&json!([{"id": "a"}])));
        assert!(!is_backup_payload(&json!({"id": "a", "title": "t"})));
        assert!(!is_backup_payload(&json!("documents")));
    }
}
