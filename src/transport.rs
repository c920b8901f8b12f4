//! Transport abstractions for pluggable query execution.
//!
//! The client core is transport-agnostic: anything that can take a built
//! [`StructuredQuery`] and return the service's raw response array can sit
//! behind [`Transport`]. The bundled [`MemoryEngine`](crate::MemoryEngine)
//! implements both traits; an HTTP binding would implement the same pair
//! against a live endpoint.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::TransportError;
use crate::query::StructuredQuery;
use crate::response::Permission;

/// Executes built queries against a search backend.
///
/// Implementations return the raw response entries in service order and
/// perform no decoding; shape discrimination belongs to the client.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute a query and return the raw response array.
    async fn execute(&self, query: &StructuredQuery) -> Result<Vec<Value>, TransportError>;
}

/// Accepts document writes for backends that can be seeded.
#[async_trait]
pub trait DocumentSink: Send + Sync {
    /// Insert or overwrite the given documents.
    async fn write(&self, documents: Vec<DocumentWrite>) -> Result<(), TransportError>;
}

/// A single document destined for a [`DocumentSink`].
#[derive(Debug, Clone)]
pub struct DocumentWrite {
    /// Unique document identifier, e.g. `/test/query/matchDir/doc1.json`.
    pub uri: String,
    /// Collections the document belongs to.
    pub collections: Vec<String>,
    /// MIME type of the content, `application/json` by default.
    pub content_type: String,
    /// Document body.
    pub content: Value,
    /// Explicit permissions; `None` lets the backend apply its defaults.
    pub permissions: Option<Vec<Permission>>,
}

impl DocumentWrite {
    /// Create a JSON document write with no collections and default
    /// permissions.
    pub fn new(uri: impl Into<String>, content: Value) -> Self {
        Self {
            uri: uri.into(),
            collections: Vec::new(),
            content_type: "application/json".to_string(),
            content,
            permissions: None,
        }
    }

    /// Replace the collection list.
    #[must_use]
    pub fn with_collections(mut self, collections: Vec<String>) -> Self {
        self.collections = collections;
        self
    }

    /// Add a single collection.
    #[must_use]
    pub fn in_collection(mut self, collection: impl Into<String>) -> Self {
        self.collections.push(collection.into());
        self
    }

    /// Override the content type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Attach explicit permissions, suppressing backend defaults.
    #[must_use]
    pub fn with_permissions(mut self, permissions: Vec<Permission>) -> Self {
        self.permissions = Some(permissions);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_write_defaults() {
        let write = DocumentWrite::new("/doc1.json", json!({"id": 1}));
        assert_eq!(write.uri, "/doc1.json");
        assert_eq!(write.content_type, "application/json");
        assert!(write.collections.is_empty());
        assert!(write.permissions.is_none());
    }

    #[test]
    fn test_document_write_builder_chain() {
        let write = DocumentWrite::new("/doc2.json", json!({}))
            .in_collection("matchCollection1")
            .in_collection("matchCollection2")
            .with_content_type("application/json");
        assert_eq!(write.collections, ["matchCollection1", "matchCollection2"]);
    }
}
