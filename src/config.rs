//! Configuration for the search client.
//!
//! # Example
//!
//! ```
//! use docsearch::ClientConfig;
//!
//! // Minimal config (uses defaults)
//! let config = ClientConfig::default();
//! assert!(config.strict_decode);
//!
//! // Full config
//! let config = ClientConfig {
//!     strict_decode: false,
//!     log_queries: true,
//! };
//! assert!(config.log_queries);
//! ```

use serde::Deserialize;

/// Configuration for the search client.
///
/// All fields have sensible defaults; `ClientConfig::default()` is the
/// right choice for most callers.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Fail the whole decode when a response entry matches no known shape
    /// (default: true). When false, undecodable entries are skipped with a
    /// warning and the rest of the response is returned.
    #[serde(default = "default_strict_decode")]
    pub strict_decode: bool,

    /// Log each serialized query at debug level before execution
    #[serde(default)]
    pub log_queries: bool,
}

fn default_strict_decode() -> bool { true }

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            strict_decode: default_strict_decode(),
            log_queries: false,
        }
    }
}
