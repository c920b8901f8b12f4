//! Typed result items and the response decoder.
//!
//! The service answers a query with a single JSON array mixing up to three
//! entry shapes. Nothing in the wire form carries an explicit tag; the
//! decoder tells them apart by which fields are present:
//!
//! | shape          | discriminating fields      | decoded as        |
//! |----------------|----------------------------|-------------------|
//! | document       | `uri` (always wins)        | [`Document`]      |
//! | facet summary  | `facets`, no `uri`         | [`FacetSummary`]  |
//! | diagnostic     | `plan`, no `uri`           | [`Diagnostic`]    |
//!
//! Callers pattern-match on [`ResultItem`] or use the `as_*` accessors.
//! Entry order is exactly the service's order; summaries and diagnostics
//! precede the document window when present.

mod decoder;
mod item;

pub use decoder::decode_response;
pub use item::{
    Diagnostic, Document, FacetResult, FacetSummary, FacetValue, Permission, ResultItem,
};
