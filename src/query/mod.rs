// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Query construction.
//!
//! Everything needed to describe a search declaratively and compile it
//! into one immutable [`StructuredQuery`].
//!
//! # Architecture
//!
//! ```text
//! Constraint combinators ──┐
//! by_example (QBE)         ├─→ Constraint tree ─→ where_ ─→ QueryBuilder ─→ StructuredQuery
//! parsed_from (bindings) ──┘                        (calculate / order_by / slice / with_options)
//! ```
//!
//! # Building constraints
//!
//! Three equivalent routes produce the same constraint trees:
//!
//! ```rust
//! use docsearch::query::{bind, by_example, parse_bindings, parsed_from, Constraint};
//! use serde_json::json;
//!
//! // 1. Typed combinators
//! let typed = Constraint::word("wordKey", "matchWord1");
//!
//! // 2. Query by example: an object mirroring document shape
//! let qbe = by_example(json!({"wordKey": {"$word": "matchWord1"}}))?;
//!
//! // 3. End-user query text resolved against named bindings
//! let bindings = parse_bindings([bind("matchConstraint").word("wordKey")])?;
//! let parsed = parsed_from("matchConstraint:matchWord1", &bindings)?;
//!
//! assert_eq!(typed, qbe);
//! assert_eq!(typed, parsed);
//! # Ok::<(), docsearch::QueryError>(())
//! ```
//!
//! # Assembling the query
//!
//! ```rust
//! use docsearch::query::{facet, score, where_, Constraint};
//!
//! let query = where_(Constraint::collection("matchList"))
//!     .calculate([facet("rangeKey1"), facet("rangeKey2")])
//!     .order_by(["rangeKey1".into(), score()])
//!     .slice(1, 10)
//!     .build()?;
//! # let _ = query;
//! # Ok::<(), docsearch::QueryError>(())
//! ```

mod builder;
mod by_example;
mod constraint;
mod parsed;

pub use builder::{
    facet, score, sort, where_, Category, FacetSpec, QueryBuilder, QueryOptions, SliceSpec,
    SortDirection, SortSpec, StructuredQuery,
};
pub use by_example::by_example;
pub use constraint::{Constraint, FieldValue};
pub use parsed::{bind, parse_bindings, parsed_from, Bind, BindingSet, BoundConstraint};
