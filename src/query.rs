//! # Query Layer Module
//!
//! ## Purpose
//! Pure filtering predicates over the document collection: category-scoped
//! browsing with optional search text, and global search across the whole
//! catalog.
//!
//! ## Input/Output Specification
//! - **Input**: Collection snapshot, query text, category target or filter
//! - **Output**: Matching documents in collection order, search hits with
//!   snippets
//! - **Matching**: Case-insensitive substring containment only
//!
//! The two predicates are deliberately asymmetric and both behaviors are
//! load-bearing: category browsing treats an empty query as "everything in
//! the category" and probes the location address; global search returns
//! nothing for an empty query and never probes the address.

use crate::utils::text_preview;
use crate::{Category, CatalogError, Document, Result};
use serde::Serialize;
use std::str::FromStr;

/// Category restriction applied by global search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryFilter {
    /// No restriction
    All,
    /// Restrict to one category
    Only(Category),
}

impl FromStr for CategoryFilter {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "all" | "" => Ok(CategoryFilter::All),
            other => Ok(CategoryFilter::Only(other.parse()?)),
        }
    }
}

/// One global-search result: the document plus a short plain-text snippet
/// for result rendering.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub document: Document,
    pub snippet: String,
}

/// Category-scoped filter+search.
///
/// A document matches when it belongs to `category` and, if `query` is
/// non-empty, one of title, description, tags or location address contains
/// the query case-insensitively. An empty query matches the whole category.
pub fn category_documents(docs: &[Document], category: Category, query: &str) -> Vec<Document> {
    let q = query.to_lowercase();

    docs.iter()
        .filter(|doc| {
            if doc.category != category {
                return false;
            }
            if query.is_empty() {
                return true;
            }
            matches_text_fields(doc, &q, true)
        })
        .cloned()
        .collect()
}

/// Global search across the catalog.
///
/// An empty query yields zero results. Otherwise a document matches when the
/// category filter is satisfied and one of title, description or tags
/// contains the query case-insensitively. The location address is not
/// probed here.
pub fn global_search(docs: &[Document], query: &str, filter: CategoryFilter) -> Vec<Document> {
    if query.is_empty() {
        return Vec::new();
    }
    let q = query.to_lowercase();

    docs.iter()
        .filter(|doc| {
            if let CategoryFilter::Only(category) = filter {
                if doc.category != category {
                    return false;
                }
            }
            matches_text_fields(doc, &q, false)
        })
        .cloned()
        .collect()
}

/// Global search returning hits with rendering snippets.
pub fn search_hits(
    docs: &[Document],
    query: &str,
    filter: CategoryFilter,
    snippet_words: usize,
) -> Vec<SearchHit> {
    global_search(docs, query, filter)
        .into_iter()
        .map(|document| {
            let snippet = snippet_for(&document, snippet_words);
            SearchHit { document, snippet }
        })
        .collect()
}

/// Short plain-text summary for a document: the description when present,
/// otherwise the leading words of the content.
pub fn snippet_for(doc: &Document, max_words: usize) -> String {
    match doc.description.as_deref() {
        Some(description) if !description.is_empty() => description.to_string(),
        _ => text_preview(&doc.content, max_words),
    }
}

fn matches_text_fields(doc: &Document, query_lower: &str, probe_address: bool) -> bool {
    if contains_ci(&doc.title, query_lower) {
        return true;
    }
    if doc
        .description
        .as_deref()
        .is_some_and(|d| contains_ci(d, query_lower))
    {
        return true;
    }
    if doc
        .tags
        .as_ref()
        .is_some_and(|tags| tags.iter().any(|t| contains_ci(t, query_lower)))
    {
        return true;
    }
    probe_address
        && doc
            .location
            .as_ref()
            .is_some_and(|l| contains_ci(&l.address, query_lower))
}

fn contains_ci(haystack: &str, query_lower: &str) -> bool {
    haystack.to_lowercase().contains(query_lower)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LocationInfo;

    fn fixture() -> Vec<Document> {
        vec![
            Document {
                id: "a".to_string(),
                title: "Income Tax".to_string(),
                category: Category::Laws,
                date: "2005-06-09".to_string(),
                description: Some("Levies on natural persons".to_string()),
                content: "Article 1: the tax applies to total net income".to_string(),
                tags: Some(vec!["income".to_string()]),
                location: None,
            },
            Document {
                id: "b".to_string(),
                title: "Cairo Office".to_string(),
                category: Category::Locations,
                date: "2023-01-01".to_string(),
                description: None,
                content: String::new(),
                tags: None,
                location: Some(LocationInfo {
                    address: "26 Sherif St, Downtown".to_string(),
                    code: "101".to_string(),
                    area: "Greater Cairo".to_string(),
                }),
            },
        ]
    }

    #[test]
    fn test_category_empty_query_matches_whole_category() {
        let docs = fixture();
        let result = category_documents(&docs, Category::Laws, "");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "a");
    }

    #[test]
    fn test_category_search_is_case_insensitive() {
        let docs = fixture();
        assert_eq!(category_documents(&docs, Category::Laws, "INCOME").len(), 1);
        assert_eq!(category_documents(&docs, Category::Laws, "income").len(), 1);
    }

    #[test]
    fn test_category_rejects_cross_category_matches() {
        let docs = fixture();
        assert!(category_documents(&docs, Category::Laws, "cairo").is_empty());
    }

    #[test]
    fn test_category_search_probes_location_address() {
        let docs = fixture();
        let result = category_documents(&docs, Category::Locations, "downtown");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "b");
    }

    #[test]
    fn test_global_empty_query_yields_nothing() {
        let docs = fixture();
        assert!(global_search(&docs, "", CategoryFilter::All).is_empty());
    }

    #[test]
    fn test_global_search_matches_title() {
        let docs = fixture();
        let result = global_search(&docs, "cairo", CategoryFilter::All);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "b");
    }

    #[test]
    fn test_global_search_never_probes_location_address() {
        let docs = fixture();
        // "downtown" appears only in b's address, which global search skips.
        assert!(global_search(&docs, "downtown", CategoryFilter::All).is_empty());
    }

    #[test]
    fn test_global_search_honors_category_filter() {
        let docs = fixture();
        let hits = global_search(&docs, "tax", CategoryFilter::Only(Category::Locations));
        assert!(hits.is_empty());

        let hits = global_search(&docs, "tax", CategoryFilter::Only(Category::Laws));
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_results_keep_collection_order() {
        let mut docs = fixture();
        docs[1].category = Category::Laws;

        let result = category_documents(&docs, Category::Laws, "");
        let ids: Vec<_> = result.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_snippet_prefers_description() {
        let docs = fixture();
        assert_eq!(snippet_for(&docs[0], 5), "Levies on natural persons");
        assert_eq!(snippet_for(&docs[1], 5), "");
    }

    #[test]
    fn test_search_hits_carry_snippets() {
        let docs = fixture();
        let hits = search_hits(&docs, "income", CategoryFilter::All, 5);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].snippet, "Levies on natural persons");
    }

    #[test]
    fn test_category_filter_parsing() {
        assert_eq!("all".parse::<CategoryFilter>().unwrap(), CategoryFilter::All);
        assert_eq!(
            "laws".parse::<CategoryFilter>().unwrap(),
            CategoryFilter::Only(Category::Laws)
        );
        assert!("unknown".parse::<CategoryFilter>().is_err());
    }
}
