// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! In-process search backend.
//!
//! [`MemoryEngine`] implements both [`Transport`] and [`DocumentSink`]
//! against a concurrent in-memory document store. It exists for embedded
//! use and for testing query behavior without a network round trip, and
//! it honors the full response contract: diagnostics first, then facet
//! summaries, then the ordered, sliced document window.
//!
//! Matching is whole-token and case-insensitive for word constraints,
//! exact for value constraints. Relevance is the total number of word
//! hits a document scores against the query; it breaks sort-key ties on
//! full-text queries and is the implied ordering when no sort is given.
//! Repeated execution of the same query over unchanged documents yields
//! an identical response; insertion order (not map order) breaks final
//! ties.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::TransportError;
use crate::metrics;
use crate::query::{Category, Constraint, SortDirection, SortSpec, StructuredQuery};
use crate::response::Permission;
use crate::transport::{DocumentSink, DocumentWrite, Transport};

/// An in-memory search engine answering structured queries.
pub struct MemoryEngine {
    documents: DashMap<String, StoredDocument>,
    next_seq: AtomicU64,
    /// `None` accepts any sort/facet field; `Some` rejects undeclared ones.
    range_indexes: RwLock<Option<BTreeSet<String>>>,
}

#[derive(Debug, Clone)]
struct StoredDocument {
    seq: u64,
    uri: String,
    collections: Vec<String>,
    content: Value,
    permissions: Option<Vec<Permission>>,
}

/// A matched document paired with its computed relevance.
struct Scored {
    doc: StoredDocument,
    relevance: u64,
}

impl MemoryEngine {
    /// Create an engine that accepts any field for sorting and faceting.
    #[must_use]
    pub fn new() -> Self {
        Self {
            documents: DashMap::new(),
            next_seq: AtomicU64::new(0),
            range_indexes: RwLock::new(None),
        }
    }

    /// Create an engine that only allows sorting and faceting on the
    /// declared fields, rejecting queries that reference any other.
    #[must_use]
    pub fn with_range_indexes<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let engine = Self::new();
        *engine.range_indexes.write() = Some(fields.into_iter().map(Into::into).collect());
        engine
    }

    /// Declare one more range-indexed field.
    ///
    /// On an engine built with [`MemoryEngine::new`] this switches it
    /// from accept-anything to enforcing mode.
    pub fn declare_range_index(&self, field: impl Into<String>) {
        let mut guard = self.range_indexes.write();
        guard.get_or_insert_with(BTreeSet::new).insert(field.into());
    }

    /// Get current document count
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Check if empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Remove all documents
    pub fn clear(&self) {
        self.documents.clear();
    }

    fn check_range_indexes(&self, query: &StructuredQuery) -> Result<(), TransportError> {
        let guard = self.range_indexes.read();
        let Some(declared) = guard.as_ref() else {
            return Ok(());
        };
        for spec in query.sort() {
            if let SortSpec::Field { field, .. } = spec {
                if !declared.contains(field) {
                    return Err(rejected_field(field));
                }
            }
        }
        for facet in query.facets() {
            if !declared.contains(&facet.field) {
                return Err(rejected_field(&facet.field));
            }
        }
        Ok(())
    }

    /// Snapshot, filter, and score the store against a root constraint.
    /// The snapshot is ordered by insertion before matching so repeated
    /// runs see the same sequence regardless of map iteration order.
    fn match_documents(&self, root: &Constraint) -> Vec<Scored> {
        let mut snapshot: Vec<StoredDocument> =
            self.documents.iter().map(|r| r.value().clone()).collect();
        snapshot.sort_by_key(|d| d.seq);

        snapshot
            .into_iter()
            .filter(|doc| matches_constraint(root, doc))
            .map(|doc| {
                let relevance = relevance(root, &doc);
                Scored { doc, relevance }
            })
            .collect()
    }
}

impl Default for MemoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MemoryEngine {
    async fn execute(&self, query: &StructuredQuery) -> Result<Vec<Value>, TransportError> {
        let _timer = crate::time_operation!("execute");
        self.check_range_indexes(query)?;

        let mut matched = self.match_documents(query.root());
        sort_matches(&mut matched, query.sort(), query.root().uses_full_text());
        debug!(matched = matched.len(), "memory engine matched documents");

        let mut entries = Vec::new();
        if query.options().query_plan() {
            entries.push(plan_entry(query, matched.len())?);
        }
        if !query.facets().is_empty() {
            entries.push(json!({ "facets": compute_facets(&matched, query) }));
        }
        for scored in slice_window(&matched, query) {
            entries.push(document_entry(&scored.doc, query.options().category()));
        }
        Ok(entries)
    }
}

#[async_trait]
impl DocumentSink for MemoryEngine {
    async fn write(&self, documents: Vec<DocumentWrite>) -> Result<(), TransportError> {
        let _timer = crate::time_operation!("write");
        let count = documents.len();
        for write in documents {
            // Overwrites keep the original sequence number so a stable
            // ordering survives updates.
            match self.documents.entry(write.uri.clone()) {
                Entry::Occupied(mut occupied) => {
                    let seq = occupied.get().seq;
                    occupied.insert(stored(seq, write));
                }
                Entry::Vacant(vacant) => {
                    let seq = self.next_seq.fetch_add(1, AtomicOrdering::SeqCst);
                    vacant.insert(stored(seq, write));
                }
            }
        }
        metrics::record_documents_written(count);
        Ok(())
    }
}

fn stored(seq: u64, write: DocumentWrite) -> StoredDocument {
    StoredDocument {
        seq,
        uri: write.uri,
        collections: write.collections,
        content: write.content,
        permissions: write.permissions,
    }
}

fn rejected_field(field: &str) -> TransportError {
    TransportError::Rejected {
        message: format!("no range index declared for field '{field}'"),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// MATCHING - Constraint evaluation against one document
// ═══════════════════════════════════════════════════════════════════════════

fn matches_constraint(constraint: &Constraint, doc: &StoredDocument) -> bool {
    match constraint {
        Constraint::Directory { path } => doc.uri.starts_with(path.as_str()),
        Constraint::Collection { name } => doc.collections.iter().any(|c| c == name),
        Constraint::Value { field, literal } => {
            resolve_scalars(&doc.content, field)
                .into_iter()
                .any(|v| literal.equals_json(v))
        }
        Constraint::Word { field, text } => word_occurrences(&doc.content, field, text) > 0,
        Constraint::And { children } => children.iter().all(|c| matches_constraint(c, doc)),
        Constraint::Or { children } => children.iter().any(|c| matches_constraint(c, doc)),
        Constraint::Not { child } => !matches_constraint(child, doc),
        // Placeholders never survive build(), so nothing can match one.
        Constraint::Bound { .. } => false,
    }
}

/// Total word hits the document scores against the constraint tree.
/// Only word constraints contribute; a non-matching word subtree
/// contributes zero on its own.
fn relevance(constraint: &Constraint, doc: &StoredDocument) -> u64 {
    match constraint {
        Constraint::Word { field, text } => word_occurrences(&doc.content, field, text),
        Constraint::And { children } | Constraint::Or { children } => {
            children.iter().map(|c| relevance(c, doc)).sum()
        }
        _ => 0,
    }
}

fn word_occurrences(content: &Value, field: &str, text: &str) -> u64 {
    let needle = tokenize(text);
    if needle.is_empty() {
        return 0;
    }
    resolve_scalars(content, field)
        .iter()
        .filter_map(|v| v.as_str())
        .map(|s| count_runs(&tokenize(s), &needle))
        .sum()
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Count contiguous occurrences of `needle` within `tokens`.
fn count_runs(tokens: &[String], needle: &[String]) -> u64 {
    if tokens.len() < needle.len() {
        return 0;
    }
    (0..=tokens.len() - needle.len())
        .filter(|&i| tokens[i..i + needle.len()] == *needle)
        .count() as u64
}

/// Walk a dotted path through the content, descending into arrays, and
/// return every scalar found at the end of it.
fn resolve_scalars<'a>(content: &'a Value, path: &str) -> Vec<&'a Value> {
    let mut current = vec![content];
    for segment in path.split('.') {
        let mut next = Vec::new();
        for value in current {
            match value {
                Value::Object(map) => {
                    if let Some(v) = map.get(segment) {
                        next.push(v);
                    }
                }
                Value::Array(items) => {
                    for item in items {
                        if let Value::Object(map) = item {
                            if let Some(v) = map.get(segment) {
                                next.push(v);
                            }
                        }
                    }
                }
                _ => {}
            }
        }
        current = next;
    }

    let mut scalars = Vec::new();
    for value in current {
        match value {
            Value::Array(items) => scalars.extend(items.iter().filter(|v| is_scalar(v))),
            v if is_scalar(v) => scalars.push(v),
            _ => {}
        }
    }
    scalars
}

fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_))
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// ORDERING - Sort keys, relevance, and the insertion-order tie break
// ═══════════════════════════════════════════════════════════════════════════

/// Order by the explicit sort keys, then break remaining ties by
/// descending relevance when the query carries a full-text predicate,
/// and finally by insertion identity.
fn sort_matches(matched: &mut [Scored], specs: &[SortSpec], score_ties: bool) {
    matched.sort_by(|a, b| {
        for spec in specs {
            let ord = match spec {
                SortSpec::Field { field, direction } => compare_field(a, b, field, *direction),
                SortSpec::Score { direction } => {
                    apply_direction(a.relevance.cmp(&b.relevance), *direction)
                }
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        if score_ties {
            let ord = b.relevance.cmp(&a.relevance);
            if ord != Ordering::Equal {
                return ord;
            }
        }
        a.doc.seq.cmp(&b.doc.seq)
    });
}

fn compare_field(a: &Scored, b: &Scored, field: &str, direction: SortDirection) -> Ordering {
    let ka = sort_key(&a.doc.content, field);
    let kb = sort_key(&b.doc.content, field);
    match (ka, kb) {
        (None, None) => Ordering::Equal,
        // A document without the key sorts after every document with it,
        // in either direction.
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => apply_direction(compare_keys(x, y), direction),
    }
}

fn sort_key<'a>(content: &'a Value, field: &str) -> Option<&'a Value> {
    resolve_scalars(content, field).into_iter().next()
}

fn compare_keys(x: &Value, y: &Value) -> Ordering {
    if let (Some(nx), Some(ny)) = (x.as_f64(), y.as_f64()) {
        nx.partial_cmp(&ny).unwrap_or(Ordering::Equal)
    } else {
        let tx = scalar_text(x).unwrap_or_default();
        let ty = scalar_text(y).unwrap_or_default();
        tx.cmp(&ty)
    }
}

fn apply_direction(ord: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Ascending => ord,
        SortDirection::Descending => ord.reverse(),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// RESPONSE ASSEMBLY - Plan, facets, then the document window
// ═══════════════════════════════════════════════════════════════════════════

fn plan_entry(query: &StructuredQuery, matched: usize) -> Result<Value, TransportError> {
    let clause = serde_json::to_value(query.root()).map_err(|e| TransportError::Rejected {
        message: format!("cannot render query plan: {e}"),
    })?;
    Ok(json!({ "plan": { "matched": matched, "where": clause } }))
}

/// Facet counts are taken over the full matched set, before slicing, and
/// each document counts once per distinct value it holds. Values come
/// back in ascending name order.
fn compute_facets(matched: &[Scored], query: &StructuredQuery) -> Value {
    let mut facets = serde_json::Map::new();
    for spec in query.facets() {
        let mut counts: BTreeMap<String, u64> = BTreeMap::new();
        for scored in matched {
            let names: BTreeSet<String> = resolve_scalars(&scored.doc.content, &spec.field)
                .into_iter()
                .filter_map(scalar_text)
                .collect();
            for name in names {
                *counts.entry(name).or_insert(0) += 1;
            }
        }
        let values: Vec<Value> = counts
            .into_iter()
            .map(|(name, count)| json!({ "name": name, "count": count }))
            .collect();
        facets.insert(spec.field.clone(), json!({ "facetValues": values }));
    }
    Value::Object(facets)
}

fn slice_window<'a>(matched: &'a [Scored], query: &StructuredQuery) -> &'a [Scored] {
    let Some(slice) = query.slice() else {
        return matched;
    };
    // Start is 1-based; build() rejects zero but deserialized queries
    // may still carry one.
    let start = slice.start.saturating_sub(1) as usize;
    if start >= matched.len() {
        return &[];
    }
    let end = match slice.length {
        Some(length) => matched.len().min(start.saturating_add(length as usize)),
        None => matched.len(),
    };
    &matched[start..end]
}

fn document_entry(doc: &StoredDocument, category: Option<Category>) -> Value {
    match category {
        Some(Category::Permissions) => {
            let permissions = doc
                .permissions
                .clone()
                .unwrap_or_else(default_permissions);
            json!({ "uri": doc.uri, "permissions": permissions })
        }
        Some(Category::Content) | None => json!({ "uri": doc.uri, "content": doc.content }),
    }
}

fn default_permissions() -> Vec<Permission> {
    vec![
        Permission {
            role: "rest-reader".to_string(),
            capabilities: vec!["read".to_string()],
        },
        Permission {
            role: "rest-writer".to_string(),
            capabilities: vec!["read".to_string(), "update".to_string()],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{where_, Constraint};
    use serde_json::json;

    fn doc(uri: &str, content: Value) -> DocumentWrite {
        DocumentWrite::new(uri, content)
    }

    async fn seeded(writes: Vec<DocumentWrite>) -> MemoryEngine {
        let engine = MemoryEngine::new();
        engine.write(writes).await.unwrap();
        engine
    }

    fn uris(entries: &[Value]) -> Vec<String> {
        entries
            .iter()
            .filter_map(|e| e["uri"].as_str().map(str::to_string))
            .collect()
    }

    #[tokio::test]
    async fn test_new_engine_is_empty() {
        let engine = MemoryEngine::new();
        assert!(engine.is_empty());
        assert_eq!(engine.len(), 0);
    }

    #[tokio::test]
    async fn test_empty_engine_answers_with_empty_response() {
        let engine = MemoryEngine::new();
        let query = where_(Constraint::directory("/")).build().unwrap();
        let entries = engine.execute(&query).await.unwrap();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn test_write_and_clear() {
        let engine = seeded(vec![
            doc("/a.json", json!({"k": 1})),
            doc("/b.json", json!({"k": 2})),
        ])
        .await;
        assert_eq!(engine.len(), 2);
        engine.clear();
        assert!(engine.is_empty());
    }

    #[tokio::test]
    async fn test_overwrite_keeps_insertion_position() {
        let engine = seeded(vec![
            doc("/a.json", json!({"v": 1})),
            doc("/b.json", json!({"v": 1})),
        ])
        .await;
        engine
            .write(vec![doc("/a.json", json!({"v": 2}))])
            .await
            .unwrap();
        assert_eq!(engine.len(), 2);

        let query = where_(Constraint::directory("/")).build().unwrap();
        let entries = engine.execute(&query).await.unwrap();
        assert_eq!(uris(&entries), ["/a.json", "/b.json"]);
        assert_eq!(entries[0]["content"]["v"], 2);
    }

    #[tokio::test]
    async fn test_directory_scope_is_a_prefix_match() {
        let engine = seeded(vec![
            doc("/dir/inner/a.json", json!({})),
            doc("/dir/b.json", json!({})),
            doc("/other/c.json", json!({})),
        ])
        .await;
        let query = where_(Constraint::directory("/dir")).build().unwrap();
        let entries = engine.execute(&query).await.unwrap();
        assert_eq!(uris(&entries), ["/dir/inner/a.json", "/dir/b.json"]);
    }

    #[tokio::test]
    async fn test_collection_match() {
        let engine = seeded(vec![
            doc("/a.json", json!({})).in_collection("alpha"),
            doc("/b.json", json!({})).in_collection("beta"),
        ])
        .await;
        let query = where_(Constraint::collection("beta")).build().unwrap();
        let entries = engine.execute(&query).await.unwrap();
        assert_eq!(uris(&entries), ["/b.json"]);
    }

    #[tokio::test]
    async fn test_value_match_is_exact_and_typed() {
        let engine = seeded(vec![
            doc("/a.json", json!({"n": 10, "s": "ten"})),
            doc("/b.json", json!({"n": "10"})),
        ])
        .await;

        let numeric = where_(Constraint::value("n", 10)).build().unwrap();
        assert_eq!(uris(&engine.execute(&numeric).await.unwrap()), ["/a.json"]);

        let textual = where_(Constraint::value("n", "10")).build().unwrap();
        assert_eq!(uris(&engine.execute(&textual).await.unwrap()), ["/b.json"]);
    }

    #[tokio::test]
    async fn test_word_match_is_case_insensitive_whole_token() {
        let engine = seeded(vec![
            doc("/a.json", json!({"text": "MatchList appears here"})),
            doc("/b.json", json!({"text": "matchListing appears here"})),
        ])
        .await;
        let query = where_(Constraint::word("text", "matchlist")).build().unwrap();
        assert_eq!(uris(&engine.execute(&query).await.unwrap()), ["/a.json"]);
    }

    #[tokio::test]
    async fn test_dotted_paths_descend_into_arrays() {
        let engine = seeded(vec![doc(
            "/a.json",
            json!({"items": [{"tag": "x"}, {"tag": "y"}]}),
        )])
        .await;
        let query = where_(Constraint::value("items.tag", "y")).build().unwrap();
        assert_eq!(uris(&engine.execute(&query).await.unwrap()), ["/a.json"]);
    }

    #[tokio::test]
    async fn test_not_excludes_matches() {
        let engine = seeded(vec![
            doc("/a.json", json!({"k": "keep"})),
            doc("/b.json", json!({"k": "drop"})),
        ])
        .await;
        let query = where_(
            Constraint::directory("/").and(Constraint::value("k", "drop").negate()),
        )
        .build()
        .unwrap();
        assert_eq!(uris(&engine.execute(&query).await.unwrap()), ["/a.json"]);
    }

    #[tokio::test]
    async fn test_missing_sort_key_sorts_last() {
        let engine = seeded(vec![
            doc("/no-key.json", json!({})),
            doc("/z.json", json!({"k": "z"})),
            doc("/a.json", json!({"k": "a"})),
        ])
        .await;
        let query = where_(Constraint::directory("/"))
            .order_by(["k"])
            .build()
            .unwrap();
        let entries = engine.execute(&query).await.unwrap();
        assert_eq!(uris(&entries), ["/a.json", "/z.json", "/no-key.json"]);
    }

    #[tokio::test]
    async fn test_numeric_sort_keys_compare_numerically() {
        let engine = seeded(vec![
            doc("/ten.json", json!({"n": 10})),
            doc("/two.json", json!({"n": 2})),
        ])
        .await;
        let query = where_(Constraint::directory("/"))
            .order_by(["n"])
            .build()
            .unwrap();
        let entries = engine.execute(&query).await.unwrap();
        // Textual comparison would put "10" before "2".
        assert_eq!(uris(&entries), ["/two.json", "/ten.json"]);
    }

    #[tokio::test]
    async fn test_text_queries_break_explicit_sort_ties_by_relevance() {
        let engine = seeded(vec![
            doc("/a.json", json!({"k": "same", "text": "hit"})),
            doc("/b.json", json!({"k": "same", "text": "hit hit hit"})),
        ])
        .await;
        let query = where_(Constraint::directory("/").or(Constraint::word("text", "hit")))
            .order_by(["k"])
            .build()
            .unwrap();
        let entries = engine.execute(&query).await.unwrap();
        assert_eq!(uris(&entries), ["/b.json", "/a.json"]);
    }

    #[tokio::test]
    async fn test_undeclared_sort_field_is_rejected() {
        let engine = MemoryEngine::with_range_indexes(["indexed"]);
        engine
            .write(vec![doc("/a.json", json!({"other": 1}))])
            .await
            .unwrap();

        let query = where_(Constraint::directory("/"))
            .order_by(["other"])
            .build()
            .unwrap();
        let err = engine.execute(&query).await.unwrap_err();
        match err {
            TransportError::Rejected { message } => {
                assert!(message.contains("other"), "got: {message}");
            }
            other => panic!("Expected Rejected, got {other:?}"),
        }

        let allowed = where_(Constraint::directory("/"))
            .order_by(["indexed"])
            .build()
            .unwrap();
        assert!(engine.execute(&allowed).await.is_ok());
    }

    #[tokio::test]
    async fn test_declare_range_index_switches_to_enforcing() {
        let engine = seeded(vec![doc("/a.json", json!({"k": 1}))]).await;
        engine.declare_range_index("k");

        let facet_other = where_(Constraint::directory("/"))
            .calculate([crate::query::facet("other")])
            .build()
            .unwrap();
        assert!(engine.execute(&facet_other).await.is_err());
    }

    #[tokio::test]
    async fn test_concurrent_writes() {
        use std::sync::Arc;

        let engine = Arc::new(MemoryEngine::new());
        let mut handles = vec![];

        // Spawn 10 tasks that each write 10 documents
        for batch in 0..10 {
            let engine_clone = engine.clone();
            let handle = tokio::spawn(async move {
                for i in 0..10 {
                    let write = doc(&format!("/batch-{}/doc-{}.json", batch, i), json!({"i": i}));
                    engine_clone.write(vec![write]).await.unwrap();
                }
            });
            handles.push(handle);
        }

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(engine.len(), 100);
    }
}
