// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Constraint AST for document search queries.
//!
//! Provides a type-safe way to describe which documents a search should
//! match, without hand-building the service's native query syntax. Leaf
//! constraints scope by location (`directory`), membership (`collection`),
//! exact field equality (`value`) or full-text containment (`word`);
//! boolean combinators compose them.
//!
//! # Example
//!
//! ```rust
//! use docsearch::query::Constraint;
//!
//! // Simple leaf constraints
//! let in_dir = Constraint::directory("/invoices/2026/");
//! let tagged = Constraint::collection("paid");
//!
//! // Pairwise boolean composition
//! let both = in_dir.and(tagged);
//!
//! // Variadic composition (fails on zero children)
//! let any = Constraint::any_of(vec![
//!     Constraint::value("status", "open"),
//!     Constraint::value("status", "disputed"),
//! ]).unwrap();
//!
//! // Negation
//! let not_draft = Constraint::collection("draft").negate();
//! # let _ = (both, any, not_draft);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::QueryError;

/// One node of a search constraint tree.
///
/// Constructed through the associated functions below (or the
/// query-by-example and parsed-query translators) and never mutated
/// afterwards. The serialized form is the wire representation sent to the
/// service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Constraint {
    /// Documents whose uri lies under a directory path.
    Directory { path: String },
    /// Documents belonging to a named collection.
    Collection { name: String },
    /// Exact equality on an indexed scalar field.
    Value { field: String, literal: FieldValue },
    /// Token-level full-text containment on a field.
    Word { field: String, text: String },
    /// All children must match.
    And { children: Vec<Constraint> },
    /// At least one child must match; enables relevance scoring across branches.
    Or { children: Vec<Constraint> },
    /// The child must not match.
    Not { child: Box<Constraint> },
    /// Placeholder for a parsed-query binding that has not been resolved.
    /// Rejected at build time; see [`crate::query::parsed`].
    Bound { name: String },
}

impl Constraint {
    /// Match documents whose uri lies under `path`.
    ///
    /// Directory scoping uses path-segment prefix semantics: `/a/b/` matches
    /// `/a/b/doc.json` and `/a/b/c/doc.json` but not `/a/bc/doc.json`. The
    /// trailing slash is normalized to exactly one.
    pub fn directory(path: impl Into<String>) -> Self {
        let mut path = path.into();
        while path.ends_with('/') {
            path.pop();
        }
        path.push('/');
        Self::Directory { path }
    }

    /// Match documents that belong to the named collection.
    pub fn collection(name: impl Into<String>) -> Self {
        Self::Collection { name: name.into() }
    }

    /// Match documents where `field` equals `literal` exactly.
    pub fn value(field: impl Into<String>, literal: impl Into<FieldValue>) -> Self {
        Self::Value {
            field: field.into(),
            literal: literal.into(),
        }
    }

    /// Match documents whose `field` contains the token `text`.
    pub fn word(field: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Word {
            field: field.into(),
            text: text.into(),
        }
    }

    /// Combine all constraints conjunctively.
    ///
    /// A single child collapses to itself. Fails with
    /// [`QueryError::InvalidQuery`] when `children` is empty.
    pub fn all_of(children: Vec<Constraint>) -> Result<Self, QueryError> {
        match children.len() {
            0 => Err(QueryError::invalid("'and' requires at least one child")),
            1 => Ok(children.into_iter().next().unwrap()),
            _ => Ok(Self::And { children }),
        }
    }

    /// Combine all constraints disjunctively.
    ///
    /// A single child collapses to itself. Fails with
    /// [`QueryError::InvalidQuery`] when `children` is empty.
    pub fn any_of(children: Vec<Constraint>) -> Result<Self, QueryError> {
        match children.len() {
            0 => Err(QueryError::invalid("'or' requires at least one child")),
            1 => Ok(children.into_iter().next().unwrap()),
            _ => Ok(Self::Or { children }),
        }
    }

    /// Combine with AND.
    pub fn and(self, other: Constraint) -> Self {
        Self::And {
            children: vec![self, other],
        }
    }

    /// Combine with OR.
    pub fn or(self, other: Constraint) -> Self {
        Self::Or {
            children: vec![self, other],
        }
    }

    /// Negate this constraint.
    pub fn negate(self) -> Self {
        Self::Not {
            child: Box::new(self),
        }
    }

    /// Whether any branch of the tree uses full-text matching.
    ///
    /// Transports use this to decide whether relevance scores are
    /// meaningful for tie-breaking.
    #[must_use]
    pub fn uses_full_text(&self) -> bool {
        match self {
            Self::Word { .. } => true,
            Self::And { children } | Self::Or { children } => {
                children.iter().any(Constraint::uses_full_text)
            }
            Self::Not { child } => child.uses_full_text(),
            Self::Directory { .. }
            | Self::Collection { .. }
            | Self::Value { .. }
            | Self::Bound { .. } => false,
        }
    }

    /// Reject trees that cannot be compiled: empty combinators (possible via
    /// direct variant construction) and unresolved binding placeholders.
    pub(crate) fn validate(&self) -> Result<(), QueryError> {
        match self {
            Self::And { children } | Self::Or { children } => {
                if children.is_empty() {
                    return Err(QueryError::invalid("combinator has no children"));
                }
                for child in children {
                    child.validate()?;
                }
                Ok(())
            }
            Self::Not { child } => child.validate(),
            Self::Bound { name } => Err(QueryError::invalid(format!(
                "unresolved binding '{name}'; resolve it with parsed_from before building"
            ))),
            Self::Directory { .. }
            | Self::Collection { .. }
            | Self::Value { .. }
            | Self::Word { .. } => Ok(()),
        }
    }
}

/// Scalar literal for value constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Text value
    Text(String),
    /// Numeric value
    Numeric(f64),
    /// Boolean value
    Boolean(bool),
}

impl FieldValue {
    /// Compare against a raw JSON scalar with matching-type semantics.
    ///
    /// Numbers compare numerically regardless of integer/float encoding;
    /// mismatched types never match.
    #[must_use]
    pub fn equals_json(&self, other: &serde_json::Value) -> bool {
        match (self, other) {
            (Self::Text(s), serde_json::Value::String(o)) => s == o,
            (Self::Numeric(n), serde_json::Value::Number(o)) => {
                o.as_f64().is_some_and(|m| m == *n)
            }
            (Self::Boolean(b), serde_json::Value::Bool(o)) => b == o,
            _ => false,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        Self::Numeric(n)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        Self::Numeric(n as f64)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}
