//! Shape discrimination for raw response entries.
//!
//! The service returns one heterogeneous JSON array. Discrimination is by
//! field presence, centralized here and nowhere else: an entry bearing
//! `uri` is a document; an entry bearing `facets` and no `uri` is a facet
//! summary; an entry bearing `plan` and no `uri` is a diagnostic. The
//! decoder never re-sorts or re-filters; service order is preserved
//! exactly, including leading summary/diagnostic slots.

use serde_json::Value;
use tracing::warn;

use crate::error::QueryError;

use super::item::{Diagnostic, Document, FacetSummary, ResultItem};

/// Decode a raw response array into typed result items.
///
/// In strict mode an entry matching no known shape fails the whole
/// decode with [`QueryError::Decode`]; in lenient mode it is skipped with
/// a warning and the remaining order is preserved.
pub fn decode_response(entries: Vec<Value>, strict: bool) -> Result<Vec<ResultItem>, QueryError> {
    let mut items = Vec::with_capacity(entries.len());
    for (position, entry) in entries.into_iter().enumerate() {
        match decode_entry(position, entry) {
            Ok(item) => items.push(item),
            Err(err) if strict => return Err(err),
            Err(err) => {
                warn!(position, error = %err, "skipping undecodable response entry");
            }
        }
    }
    Ok(items)
}

fn decode_entry(position: usize, entry: Value) -> Result<ResultItem, QueryError> {
    let Value::Object(ref fields) = entry else {
        return Err(decode_error(position, "expected a JSON object"));
    };

    if fields.contains_key("uri") {
        let document: Document = serde_json::from_value(entry)
            .map_err(|e| decode_error(position, &e.to_string()))?;
        Ok(ResultItem::Document(document))
    } else if fields.contains_key("facets") {
        let summary: FacetSummary = serde_json::from_value(entry)
            .map_err(|e| decode_error(position, &e.to_string()))?;
        Ok(ResultItem::FacetSummary(summary))
    } else if fields.contains_key("plan") {
        let diagnostic: Diagnostic = serde_json::from_value(entry)
            .map_err(|e| decode_error(position, &e.to_string()))?;
        Ok(ResultItem::Diagnostic(diagnostic))
    } else {
        Err(decode_error(
            position,
            "entry has none of the discriminating fields (uri, facets, plan)",
        ))
    }
}

fn decode_error(position: usize, reason: &str) -> QueryError {
    QueryError::Decode {
        reason: format!("entry {position}: {reason}"),
    }
}
