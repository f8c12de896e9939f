//! Engine-layer errors.

use thiserror::Error;
use umwelt_model::{DefinitionError, MemoryError};
use umwelt_types::ErrorCode;

/// Failure inside the round engine.
///
/// Expected semantic conditions (no belief for a prediction, an obsolete
/// timeout, a prediction addressed elsewhere) are not errors — they are
/// part of the protocol. What remains is the fatal class: bad
/// definitions, broken memory, and malformed persisted learning state.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The GM definition failed validation.
    #[error(transparent)]
    Definition(#[from] DefinitionError),

    /// Long-term memory failed.
    #[error(transparent)]
    Memory(#[from] MemoryError),

    /// Persisted learning state did not decode.
    #[error("persisted learning state malformed for gm '{gm}': {detail}")]
    MalformedLearning { gm: String, detail: String },
}

impl ErrorCode for EngineError {
    fn code(&self) -> &'static str {
        match self {
            Self::Definition(_) => "ENGINE_BAD_DEFINITION",
            Self::Memory(_) => "ENGINE_MEMORY",
            Self::MalformedLearning { .. } => "ENGINE_MALFORMED_LEARNING",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            Self::Definition(_) => false,
            Self::Memory(inner) => inner.is_recoverable(),
            Self::MalformedLearning { .. } => false,
        }
    }
}
