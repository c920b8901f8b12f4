// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Metrics instrumentation for docsearch.
//!
//! Uses the `metrics` crate for backend-agnostic metrics collection.
//! The embedding application is responsible for choosing the exporter
//! (Prometheus, OTEL, etc.)
//!
//! # Metric Naming Convention
//! - `docsearch_` prefix for all metrics
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Labels
//! - `status`: success, invalid, transport_error, service_error, decode_error
//! - `kind`: document, facets, diagnostic
//! - `operation`: execute, write

use metrics::{counter, histogram};
use std::time::{Duration, Instant};

/// Record a query execution outcome
pub fn record_query(status: &str) {
    counter!(
        "docsearch_queries_total",
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record end-to-end query latency (execute plus decode)
pub fn record_query_latency(duration: Duration) {
    histogram!("docsearch_query_seconds").record(duration.as_secs_f64());
}

/// Record how many items a decoded response held
pub fn record_query_results(count: usize) {
    histogram!("docsearch_query_results").record(count as f64);
}

/// Record a decoded item by shape
pub fn record_decoded_item(kind: &str) {
    counter!(
        "docsearch_decoded_items_total",
        "kind" => kind.to_string()
    )
    .increment(1);
}

// ═══════════════════════════════════════════════════════════════════════════
// WRITES - Document ingestion counters
// ═══════════════════════════════════════════════════════════════════════════

/// Record documents accepted by a sink
pub fn record_documents_written(count: usize) {
    counter!("docsearch_documents_written_total").increment(count as u64);
}

/// Record engine-side operation latency
pub fn record_operation_latency(operation: &str, duration: Duration) {
    histogram!(
        "docsearch_operation_seconds",
        "operation" => operation.to_string()
    )
    .record(duration.as_secs_f64());
}

/// A timing guard that records latency on drop
pub struct LatencyTimer {
    operation: &'static str,
    start: Instant,
}

impl LatencyTimer {
    /// Start a new latency timer
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            start: Instant::now(),
        }
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        record_operation_latency(self.operation, self.start.elapsed());
    }
}

/// Convenience macro for timing operations
#[macro_export]
macro_rules! time_operation {
    ($op:expr) => {
        $crate::metrics::LatencyTimer::new($op)
    };
}
