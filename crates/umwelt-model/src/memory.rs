//! Long-term memory capability.
//!
//! The core never owns storage; it is handed an implementation of
//! [`LongTermMemory`] at bootstrap. Each GM writes only under its own
//! name as namespace (one GM owns one key space), and only at shutdown —
//! handlers never block on memory I/O.

use thiserror::Error;
use umwelt_types::ErrorCode;

/// An opaque key/value store injected into the runtime.
///
/// `store` is a total, idempotent overwrite; `recall` returns `None` for
/// keys never stored.
pub trait LongTermMemory: Send + Sync {
    /// Stores `value` under `(namespace, key)`, overwriting.
    fn store(&self, namespace: &str, key: &str, value: serde_json::Value) -> Result<(), MemoryError>;

    /// Recalls the value stored under `(namespace, key)`, if any.
    fn recall(&self, namespace: &str, key: &str) -> Result<Option<serde_json::Value>, MemoryError>;
}

/// Long-term memory failure.
#[derive(Debug, Clone, Error)]
pub enum MemoryError {
    /// A stored value failed to decode. Fatal: the supervising runtime
    /// restarts the GM from a clean learning state.
    #[error("long-term memory corrupted at {namespace}/{key}: {detail}")]
    Corrupted {
        namespace: String,
        key: String,
        detail: String,
    },

    /// The backing store is unreachable; retry may succeed.
    #[error("long-term memory unavailable: {0}")]
    Unavailable(String),
}

impl ErrorCode for MemoryError {
    fn code(&self) -> &'static str {
        match self {
            Self::Corrupted { .. } => "MEMORY_CORRUPTED",
            Self::Unavailable(_) => "MEMORY_UNAVAILABLE",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}
