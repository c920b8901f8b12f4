// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Clause assembly: from a root constraint to an executable query.
//!
//! [`where_`] opens a draft around one constraint tree. The draft is a
//! plain value: every modifier consumes it and returns the extended draft,
//! so partial chains can be cloned and forked freely. [`QueryBuilder::build`]
//! validates the composition and freezes it into a [`StructuredQuery`],
//! which is immutable, cheap to clone, and safe to execute concurrently
//! any number of times.
//!
//! # Example
//!
//! ```rust
//! use docsearch::query::{facet, sort, score, where_, Constraint, SortDirection};
//!
//! let query = where_(Constraint::collection("matchList"))
//!     .calculate([facet("rangeKey1"), facet("rangeKey2")])
//!     .order_by(["rangeKey1".into(), sort("rangeKey2", SortDirection::Descending)])
//!     .slice(1, 10)
//!     .build()?;
//! # let _ = query;
//! # Ok::<(), docsearch::QueryError>(())
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::QueryError;

use super::constraint::Constraint;

/// Request a facet aggregate over an indexed field.
pub fn facet(field: impl Into<String>) -> FacetSpec {
    FacetSpec {
        field: field.into(),
    }
}

/// A facet request carried by `calculate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetSpec {
    /// Indexed field to aggregate distinct values over.
    pub field: String,
}

/// Sort on a field with an explicit direction.
pub fn sort(field: impl Into<String>, direction: SortDirection) -> SortSpec {
    SortSpec::Field {
        field: field.into(),
        direction,
    }
}

/// Sort by descending relevance score.
pub fn score() -> SortSpec {
    SortSpec::Score {
        direction: SortDirection::Descending,
    }
}

/// One ordering key of an `order_by` chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortSpec {
    /// Order by an indexed field value.
    Field {
        field: String,
        direction: SortDirection,
    },
    /// Order by the engine's relevance score.
    Score { direction: SortDirection },
}

/// Bare field names imply ascending order.
impl From<&str> for SortSpec {
    fn from(field: &str) -> Self {
        SortSpec::Field {
            field: field.to_string(),
            direction: SortDirection::Ascending,
        }
    }
}

impl From<String> for SortSpec {
    fn from(field: String) -> Self {
        SortSpec::Field {
            field,
            direction: SortDirection::Ascending,
        }
    }
}

/// Direction of one sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// A contiguous window of the fully-ordered result set.
///
/// `start` is the 1-based inclusive rank of the first desired document;
/// an absent `length` means "to the end".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliceSpec {
    pub start: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u64>,
}

/// Document projection requested through the `category` option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Project document content (the default).
    Content,
    /// Project permission metadata instead of content.
    Permissions,
}

/// Service flags attached to a query.
///
/// Recognized flags are typed; anything else set through
/// [`QueryOptions::with_option`] is forwarded to the service opaquely and
/// never interpreted by this client.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryOptions {
    #[serde(default, skip_serializing_if = "is_false")]
    query_plan: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    category: Option<Category>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl QueryOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the service to prepend a plan diagnostic to the response.
    #[must_use]
    pub fn with_query_plan(mut self) -> Self {
        self.query_plan = true;
        self
    }

    /// Switch document projection.
    #[must_use]
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    /// Attach an unrecognized flag, forwarded to the service as-is.
    #[must_use]
    pub fn with_option(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    #[must_use]
    pub fn query_plan(&self) -> bool {
        self.query_plan
    }

    #[must_use]
    pub fn category(&self) -> Option<Category> {
        self.category
    }

    /// Flags this client does not recognize.
    #[must_use]
    pub fn extra(&self) -> &BTreeMap<String, Value> {
        &self.extra
    }

    fn is_default(options: &QueryOptions) -> bool {
        !options.query_plan && options.category.is_none() && options.extra.is_empty()
    }
}

/// Open a query draft around a root constraint.
pub fn where_(root: Constraint) -> QueryBuilder {
    QueryBuilder {
        root,
        facets: Vec::new(),
        sort: Vec::new(),
        slice: None,
        options: QueryOptions::default(),
    }
}

/// An accumulating query draft. Not executable; finalize with
/// [`QueryBuilder::build`].
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    root: Constraint,
    facets: Vec<FacetSpec>,
    sort: Vec<SortSpec>,
    slice: Option<SliceSpec>,
    options: QueryOptions,
}

impl QueryBuilder {
    /// Request facet aggregates. Repeated calls append.
    #[must_use]
    pub fn calculate(mut self, facets: impl IntoIterator<Item = FacetSpec>) -> Self {
        self.facets.extend(facets);
        self
    }

    /// Append ordering keys. Bare field names (via `Into<SortSpec>`) imply
    /// ascending; use [`sort`] and [`score`] for explicit keys.
    #[must_use]
    pub fn order_by<S>(mut self, keys: impl IntoIterator<Item = S>) -> Self
    where
        S: Into<SortSpec>,
    {
        self.sort.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Select a window of `length` documents starting at the 1-based
    /// position `start`. A zero `start` is rejected at build time.
    #[must_use]
    pub fn slice(mut self, start: u64, length: u64) -> Self {
        self.slice = Some(SliceSpec {
            start,
            length: Some(length),
        });
        self
    }

    /// Select every document from the 1-based position `start` to the end.
    #[must_use]
    pub fn slice_from(mut self, start: u64) -> Self {
        self.slice = Some(SliceSpec {
            start,
            length: None,
        });
        self
    }

    /// Attach service flags. Replaces any previously attached options.
    #[must_use]
    pub fn with_options(mut self, options: QueryOptions) -> Self {
        self.options = options;
        self
    }

    /// Validate and freeze the draft into an executable query.
    ///
    /// Fails with [`QueryError::InvalidQuery`] when the constraint tree
    /// contains an empty combinator or an unresolved binding, or when the
    /// slice start is zero.
    pub fn build(self) -> Result<StructuredQuery, QueryError> {
        self.root.validate()?;
        if let Some(SliceSpec { start: 0, .. }) = self.slice {
            return Err(QueryError::invalid(
                "slice start is 1-based; 0 is not a valid position",
            ));
        }
        Ok(StructuredQuery {
            root: self.root,
            facets: self.facets,
            sort: self.sort,
            slice: self.slice,
            options: self.options,
        })
    }
}

/// A finalized search request.
///
/// Immutable once built; clone it or share it behind an `Arc` and execute
/// it concurrently without synchronization. The serde form is the wire
/// representation handed to transports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredQuery {
    #[serde(rename = "where")]
    root: Constraint,
    #[serde(rename = "calculate", default, skip_serializing_if = "Vec::is_empty")]
    facets: Vec<FacetSpec>,
    #[serde(rename = "orderBy", default, skip_serializing_if = "Vec::is_empty")]
    sort: Vec<SortSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    slice: Option<SliceSpec>,
    #[serde(default, skip_serializing_if = "QueryOptions::is_default")]
    options: QueryOptions,
}

impl StructuredQuery {
    #[must_use]
    pub fn root(&self) -> &Constraint {
        &self.root
    }

    #[must_use]
    pub fn facets(&self) -> &[FacetSpec] {
        &self.facets
    }

    #[must_use]
    pub fn sort(&self) -> &[SortSpec] {
        &self.sort
    }

    #[must_use]
    pub fn slice(&self) -> Option<SliceSpec> {
        self.slice
    }

    #[must_use]
    pub fn options(&self) -> &QueryOptions {
        &self.options
    }
}
