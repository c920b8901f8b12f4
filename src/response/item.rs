//! Typed result items reconstructed from a search response.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One entry of the decoded result sequence, in service-supplied order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ResultItem {
    /// A matched document.
    Document(Document),
    /// Facet aggregates over the matched set.
    FacetSummary(FacetSummary),
    /// Diagnostic payload such as a query plan.
    Diagnostic(Diagnostic),
}

impl ResultItem {
    #[must_use]
    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Self::Document(doc) => Some(doc),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_facets(&self) -> Option<&FacetSummary> {
        match self {
            Self::FacetSummary(facets) => Some(facets),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            Self::Diagnostic(diag) => Some(diag),
            _ => None,
        }
    }

    /// Short label for the item kind, used as a metric dimension.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Document(_) => "document",
            Self::FacetSummary(_) => "facets",
            Self::Diagnostic(_) => "diagnostic",
        }
    }
}

/// A matched document.
///
/// `content` is present unless the query's category option excluded it;
/// `permissions` only when permission metadata was requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<Permission>>,
}

impl Document {
    /// Look up a top-level content field as a string.
    #[must_use]
    pub fn content_str(&self, key: &str) -> Option<&str> {
        self.content.as_ref()?.get(key)?.as_str()
    }
}

/// One role's capabilities on a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub role: String,
    pub capabilities: Vec<String>,
}

/// Facet aggregates, keyed by the faceted field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetSummary {
    pub facets: BTreeMap<String, FacetResult>,
}

impl FacetSummary {
    /// Facet values reported for one field.
    #[must_use]
    pub fn values(&self, field: &str) -> Option<&[FacetValue]> {
        self.facets.get(field).map(|f| f.facet_values.as_slice())
    }
}

/// The distinct values of one faceted field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetResult {
    pub facet_values: Vec<FacetValue>,
}

/// One distinct value and how many matched documents carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetValue {
    pub name: String,
    pub count: u64,
}

/// Diagnostic entry carrying the service's query plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub plan: Value,
}
