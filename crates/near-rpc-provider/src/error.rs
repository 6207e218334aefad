//! Error types for near-rpc-provider.
//!
//! # Error Hierarchy
//!
//! - [`Error`](enum@Error) - Main error type, returned by every provider operation
//!   - [`RpcError`] - The node answered with a JSON-RPC error envelope
//!   - [`NetworkError`] - The live network could not be detected or is unregistered
//!   - [`ParseKeyError`] / [`ParseHashError`] - Invalid key or hash encodings
//!
//! # Archival Fallback
//!
//! A primary NEAR node prunes history after a few epochs. When it reports a
//! `HANDLER_ERROR` caused by `UNKNOWN_BLOCK` or `UNKNOWN_TRANSACTION`, the
//! provider re-issues the request once against the archival endpoint:
//!
//! ```rust
//! use near_rpc_provider::{ErrorCause, RpcError};
//!
//! let err = RpcError {
//!     message: "Server error".to_string(),
//!     error_type: "HANDLER_ERROR".to_string(),
//!     code: -32000,
//!     data: None,
//!     cause: Some(ErrorCause::new("UNKNOWN_BLOCK")),
//! };
//! assert!(err.is_archival_retryable());
//! ```

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Wire `error.name` for errors raised inside a node request handler.
pub const HANDLER_ERROR: &str = "HANDLER_ERROR";

/// Handler-error causes that mean the primary node pruned the requested data.
pub const ARCHIVAL_CAUSES: [&str; 2] = ["UNKNOWN_BLOCK", "UNKNOWN_TRANSACTION"];

/// Error parsing a public or secret key.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseKeyError {
    #[error("Invalid key format: expected 'ed25519:...' or 'secp256k1:...'")]
    InvalidFormat,

    #[error("Unknown key type: '{0}'")]
    UnknownKeyType(String),

    #[error("Invalid base58 encoding: {0}")]
    InvalidBase58(String),

    #[error("Invalid key length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("Operation not supported for {0} keys")]
    UnsupportedKeyType(&'static str),
}

/// Error parsing a crypto hash.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseHashError {
    #[error("Invalid base58 encoding: {0}")]
    InvalidBase58(String),

    #[error("Invalid hash length: expected 32 bytes, got {0}")]
    InvalidLength(usize),
}

// ============================================================================
// RPC Errors
// ============================================================================

/// Handler-level sub-error attached to an RPC error envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorCause {
    /// Cause name, e.g. `UNKNOWN_BLOCK`.
    pub name: String,
    /// Cause-specific details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<serde_json::Value>,
}

impl ErrorCause {
    /// Create a cause without details.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            info: None,
        }
    }
}

/// A JSON-RPC error envelope returned by a NEAR node.
///
/// Every field mirrors the wire `error` object: `error_type` is `error.name`.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message} (type: {error_type}, code: {code})")]
pub struct RpcError {
    /// Human readable message.
    pub message: String,
    /// Error class, e.g. `HANDLER_ERROR` or `REQUEST_VALIDATION_ERROR`.
    pub error_type: String,
    /// JSON-RPC error code.
    pub code: i64,
    /// Free-form error data.
    pub data: Option<serde_json::Value>,
    /// Nested handler-level cause.
    pub cause: Option<ErrorCause>,
}

impl RpcError {
    /// Name of the nested cause, if any.
    pub fn cause_name(&self) -> Option<&str> {
        self.cause.as_ref().map(|c| c.name.as_str())
    }

    /// Returns true if the node classified this as a handler error.
    pub fn is_handler_error(&self) -> bool {
        self.error_type == HANDLER_ERROR
    }

    /// Returns true if the request should be re-issued against an archival node.
    pub fn is_archival_retryable(&self) -> bool {
        self.is_handler_error()
            && self
                .cause_name()
                .is_some_and(|name| ARCHIVAL_CAUSES.contains(&name))
    }
}

// ============================================================================
// Network Detection Errors
// ============================================================================

/// Which detection failure occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NetworkEvent {
    /// A chain id was obtained (or both probes failed) but it maps to no registered network.
    InvalidNetwork,
    /// The node never reported a chain id.
    NoNetwork,
}

impl NetworkEvent {
    /// Event name as reported in error context.
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkEvent::InvalidNetwork => "invalidNetwork",
            NetworkEvent::NoNetwork => "noNetwork",
        }
    }
}

impl fmt::Display for NetworkEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The provider could not establish which network it is connected to.
#[derive(Debug, Clone, Error)]
#[error("could not detect network (event: {event}{})", .chain_id.as_deref().map(|c| format!(", chainId: {c}")).unwrap_or_default())]
pub struct NetworkError {
    /// Triggering event.
    pub event: NetworkEvent,
    /// Chain id observed on the node, if one was obtained.
    pub chain_id: Option<String>,
    /// Underlying error from the last probe or lookup.
    pub server_error: Option<Arc<Error>>,
}

impl NetworkError {
    /// Detection failed with an unusable or unregistered chain id.
    pub fn invalid_network(chain_id: Option<String>, server_error: Option<Error>) -> Self {
        Self {
            event: NetworkEvent::InvalidNetwork,
            chain_id,
            server_error: server_error.map(Arc::new),
        }
    }

    /// The node never reported a chain id.
    pub fn no_network() -> Self {
        Self {
            event: NetworkEvent::NoNetwork,
            chain_id: None,
            server_error: None,
        }
    }
}

// ============================================================================
// Main Error Type
// ============================================================================

/// Main error type for near-rpc-provider operations.
#[derive(Debug, Error)]
pub enum Error {
    // ─── Wire ───
    #[error(transparent)]
    Rpc(#[from] RpcError),

    // ─── Transport ───
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    // ─── Network ───
    #[error(transparent)]
    Network(#[from] NetworkError),

    // ─── Arguments ───
    #[error("{message} (argument: {argument}{})", .value.as_deref().map(|v| format!(", value: {v}")).unwrap_or_default())]
    InvalidArgument {
        argument: &'static str,
        message: String,
        value: Option<String>,
        #[source]
        source: Option<Box<Error>>,
    },

    // ─── Backend ───
    #[error("bad result from backend (method: {method})")]
    BadResult {
        method: &'static str,
        params: serde_json::Value,
        result: Option<serde_json::Value>,
        #[source]
        source: Option<Box<Error>>,
    },

    #[error("{reason} (operation: {operation})")]
    UnsupportedOperation { operation: String, reason: String },

    // ─── Codec ───
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),

    #[error(transparent)]
    ParseKey(#[from] ParseKeyError),

    #[error(transparent)]
    ParseHash(#[from] ParseHashError),
}

impl Error {
    /// Create an argument error.
    pub fn invalid_argument(
        argument: &'static str,
        message: impl Into<String>,
        value: Option<String>,
    ) -> Self {
        Error::InvalidArgument {
            argument,
            message: message.into(),
            value,
            source: None,
        }
    }

    /// Attach the error that led to this one. Only argument errors carry a
    /// source this way; other kinds are returned unchanged.
    pub fn caused_by(self, cause: Error) -> Self {
        match self {
            Error::InvalidArgument {
                argument,
                message,
                value,
                ..
            } => Error::InvalidArgument {
                argument,
                message,
                value,
                source: Some(Box::new(cause)),
            },
            other => other,
        }
    }

    /// Create an unsupported-operation error.
    pub fn unsupported(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::UnsupportedOperation {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// The wire error, if this is one.
    pub fn as_rpc(&self) -> Option<&RpcError> {
        match self {
            Error::Rpc(e) => Some(e),
            _ => None,
        }
    }

    /// Returns true if this error should trigger the archival fallback.
    pub fn is_archival_retryable(&self) -> bool {
        self.as_rpc().is_some_and(RpcError::is_archival_retryable)
    }
}
