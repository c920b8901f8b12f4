//! # docsearch
//!
//! A declarative document-search client: assemble a query three equivalent
//! ways, execute it against any transport, pattern-match typed results.
//!
//! ## Architecture
//!
//! Queries flow one way, from assembly through execution to decoding:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Query Assembly                         │
//! │  • Constraint combinators via where_()                     │
//! │  • Query by example via by_example()                       │
//! │  • "name:token" text via parsed_from()                     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                   build() → immutable StructuredQuery
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       SearchClient                          │
//! │  • Executes through the Transport trait                    │
//! │  • Bundled MemoryEngine for embedded use and tests         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                      raw JSON entries
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Response Decoder                        │
//! │  • Shape discrimination by field presence                  │
//! │  • Document / FacetSummary / Diagnostic                    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docsearch::{facet, where_, Constraint, DocumentSink, DocumentWrite};
//! use docsearch::{MemoryEngine, SearchClient};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), docsearch::QueryError> {
//!     let engine = Arc::new(MemoryEngine::new());
//!
//!     // Seed some documents
//!     engine
//!         .write(vec![
//!             DocumentWrite::new(
//!                 "/articles/fearless.json",
//!                 json!({"title": "Fearless Concurrency", "tag": "rust"}),
//!             )
//!             .in_collection("articles"),
//!         ])
//!         .await?;
//!
//!     // Build once, execute as often as needed
//!     let query = where_(Constraint::collection("articles"))
//!         .calculate([facet("tag")])
//!         .order_by(["title"])
//!         .build()?;
//!
//!     let client = SearchClient::new(engine.clone());
//!     for item in client.query(&query).await? {
//!         if let Some(doc) = item.as_document() {
//!             println!("matched {}", doc.uri);
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Three query routes**: combinators, query by example, bound query text
//! - **Immutable built queries**: share one query across tasks without locks
//! - **Faceted search**: distinct-value counts over the full matched set
//! - **Relevance ordering**: word-hit scoring with explicit sort overrides
//! - **Typed results**: documents, facet summaries, and plan diagnostics
//! - **Pluggable transport**: trait seam with a bundled in-memory engine
//!
//! ## Configuration
//!
//! See [`ClientConfig`] for all configuration options.
//!
//! ## Modules
//!
//! - [`query`]: constraint combinators, translators, and the query builder
//! - [`client`]: the [`SearchClient`] execution front door
//! - [`response`]: typed result items and the shape-discriminating decoder
//! - [`transport`]: the [`Transport`] and [`DocumentSink`] seams
//! - [`memory`]: the bundled [`MemoryEngine`] backend

pub mod config;
pub mod error;
pub mod query;
pub mod response;
pub mod transport;
pub mod client;
pub mod memory;
pub mod metrics;

pub use client::SearchClient;
pub use config::ClientConfig;
pub use error::{QueryError, TransportError};
pub use memory::MemoryEngine;
pub use metrics::LatencyTimer;
pub use query::{
    bind, by_example, facet, parse_bindings, parsed_from, score, sort, where_, Bind, BindingSet,
    BoundConstraint, Category, Constraint, FacetSpec, FieldValue, QueryBuilder, QueryOptions,
    SliceSpec, SortDirection, SortSpec, StructuredQuery,
};
pub use response::{
    decode_response, Diagnostic, Document, FacetResult, FacetSummary, FacetValue, Permission,
    ResultItem,
};
pub use transport::{DocumentSink, DocumentWrite, Transport};
