//! Error taxonomy for query building and execution.
//!
//! Build-time failures (`InvalidQuery`, `UnboundConstraint`, `Parse`) are
//! raised before any request leaves the process. Execution-time failures
//! (`Transport`, `Service`, `Decode`) surface from a single execution and
//! are never retried here.

use thiserror::Error;

/// Failure reported by a transport implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The backend could not be reached or the connection dropped mid-request.
    #[error("connection failure: {0}")]
    Connection(String),
    /// The backend received the request and refused it.
    #[error("{message}")]
    Rejected {
        /// The service's message, verbatim.
        message: String,
    },
}

/// Caller-facing error for the query surface.
#[derive(Error, Debug)]
pub enum QueryError {
    /// The query is structurally invalid and was rejected before execution.
    #[error("invalid query: {reason}")]
    InvalidQuery {
        reason: String,
    },
    /// A parsed query segment names a constraint with no registered binding.
    #[error("no binding registered for constraint '{name}'")]
    UnboundConstraint {
        name: String,
    },
    /// Query text could not be decomposed into `name:token` segments.
    #[error("cannot parse '{input}': {reason}")]
    Parse {
        input: String,
        reason: String,
    },
    /// The transport collaborator failed before the service produced a response.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    /// The service executed the request and rejected the compiled query.
    #[error("service rejected query: {message}")]
    Service {
        message: String,
    },
    /// A response entry did not match any known result shape.
    #[error("cannot decode response entry: {reason}")]
    Decode {
        reason: String,
    },
}

impl QueryError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidQuery {
            reason: reason.into(),
        }
    }

    pub(crate) fn parse(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Parse {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Short label for the error category, used as a metric dimension.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidQuery { .. } => "invalid_query",
            Self::UnboundConstraint { .. } => "unbound_constraint",
            Self::Parse { .. } => "parse",
            Self::Transport(_) => "transport",
            Self::Service { .. } => "service",
            Self::Decode { .. } => "decode",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_message_is_verbatim() {
        let err = QueryError::Service {
            message: "SEARCH-BADORDERBY: no range index on rangeKey9".into(),
        };
        assert!(err.to_string().contains("no range index on rangeKey9"));
    }

    #[test]
    fn test_transport_error_converts() {
        fn execute() -> Result<(), QueryError> {
            Err(TransportError::Connection("refused".into()))?
        }
        match execute() {
            Err(QueryError::Transport(TransportError::Connection(msg))) => {
                assert_eq!(msg, "refused");
            }
            other => panic!("Expected Transport error, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_error_kinds_are_stable() {
        assert_eq!(QueryError::invalid("x").kind(), "invalid_query");
        assert_eq!(
            QueryError::parse("a b", "no separator").kind(),
            "parse"
        );
        assert_eq!(
            QueryError::UnboundConstraint { name: "tag".into() }.kind(),
            "unbound_constraint"
        );
    }
}
