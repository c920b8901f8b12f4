//! Query execution front door.
//!
//! # Architecture
//!
//! ```text
//! query(&StructuredQuery)
//!       │
//!       ├─→ Transport::execute (raw JSON entries)
//!       │
//!       ├─→ decode_response (shape discrimination)
//!       │
//!       └─→ Vec<ResultItem>
//! ```
//!
//! The client never mutates a query; the same built query can be executed
//! any number of times, from any number of tasks, against any transport.

use std::sync::Arc;
use std::time::Instant;

use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{QueryError, TransportError};
use crate::metrics;
use crate::query::StructuredQuery;
use crate::response::{decode_response, ResultItem};
use crate::transport::Transport;

/// Executes built queries and decodes what comes back.
pub struct SearchClient {
    transport: Arc<dyn Transport>,
    config: ClientConfig,
}

impl SearchClient {
    /// Create a client with default configuration.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::with_config(transport, ClientConfig::default())
    }

    /// Create a client with explicit configuration.
    #[must_use]
    pub fn with_config(transport: Arc<dyn Transport>, config: ClientConfig) -> Self {
        Self { transport, config }
    }

    /// Execute a built query and decode the response.
    ///
    /// Transport rejections surface as [`QueryError::Service`], connection
    /// failures as [`QueryError::Transport`], and undecodable entries as
    /// [`QueryError::Decode`] (or a logged skip when `strict_decode` is
    /// off).
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # use std::sync::Arc;
    /// # use docsearch::{where_, Constraint, MemoryEngine, SearchClient};
    /// # async fn example() -> Result<(), docsearch::QueryError> {
    /// let client = SearchClient::new(Arc::new(MemoryEngine::new()));
    ///
    /// let query = where_(Constraint::collection("articles")).build()?;
    /// for item in client.query(&query).await? {
    ///     if let Some(doc) = item.as_document() {
    ///         println!("matched {}", doc.uri);
    ///     }
    /// }
    /// # Ok(())
    /// # }
    /// ```
    #[tracing::instrument(skip(self, query))]
    pub async fn query(&self, query: &StructuredQuery) -> Result<Vec<ResultItem>, QueryError> {
        let start = Instant::now();

        if self.config.log_queries {
            if let Ok(body) = serde_json::to_string(query) {
                debug!(query = %body, "executing structured query");
            }
        }

        let raw = match self.transport.execute(query).await {
            Ok(raw) => raw,
            Err(TransportError::Rejected { message }) => {
                metrics::record_query("service_error");
                metrics::record_query_latency(start.elapsed());
                return Err(QueryError::Service { message });
            }
            Err(err) => {
                metrics::record_query("transport_error");
                metrics::record_query_latency(start.elapsed());
                return Err(QueryError::Transport(err));
            }
        };

        match decode_response(raw, self.config.strict_decode) {
            Ok(items) => {
                metrics::record_query("success");
                metrics::record_query_latency(start.elapsed());
                metrics::record_query_results(items.len());
                for item in &items {
                    metrics::record_decoded_item(item.kind());
                }
                debug!(items = items.len(), "query complete");
                Ok(items)
            }
            Err(err) => {
                metrics::record_query("decode_error");
                metrics::record_query_latency(start.elapsed());
                Err(err)
            }
        }
    }
}
