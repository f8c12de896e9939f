//! Definition-layer errors.
//!
//! All variants are **fatal**: a malformed GM definition or cognition
//! graph cannot be retried into working. The supervising runtime surfaces
//! these at bootstrap, before any GM runs.

use thiserror::Error;
use umwelt_types::ErrorCode;

/// A structurally invalid GM definition or cognition graph.
#[derive(Debug, Clone, Error)]
pub enum DefinitionError {
    /// A GM definition has no name, or a conjecture's name is empty.
    #[error("gm '{gm}' has an empty name somewhere in its definition")]
    EmptyName { gm: String },

    /// Two conjectures in one GM share a name.
    #[error("gm '{gm}' defines conjecture '{conjecture}' more than once")]
    DuplicateConjecture { gm: String, conjecture: String },

    /// A contradiction set or prior references a conjecture the GM does
    /// not define.
    #[error("gm '{gm}' references undefined conjecture '{conjecture}'")]
    UndefinedConjecture { gm: String, conjecture: String },

    /// An intention domain names an intention the GM does not define.
    #[error("gm '{gm}' references undefined intention '{intention}'")]
    UndefinedIntention { gm: String, intention: String },

    /// A contradiction set with fewer than two members excludes nothing.
    #[error("gm '{gm}' has a contradiction set with fewer than two members")]
    DegenerateContradiction { gm: String },

    /// The cognition graph contains a cycle.
    #[error("cognition graph has a cycle through '{via}'")]
    CyclicGraph { via: String },
}

impl ErrorCode for DefinitionError {
    fn code(&self) -> &'static str {
        match self {
            Self::EmptyName { .. } => "DEF_EMPTY_NAME",
            Self::DuplicateConjecture { .. } => "DEF_DUPLICATE_CONJECTURE",
            Self::UndefinedConjecture { .. } => "DEF_UNDEFINED_CONJECTURE",
            Self::UndefinedIntention { .. } => "DEF_UNDEFINED_INTENTION",
            Self::DegenerateContradiction { .. } => "DEF_DEGENERATE_CONTRADICTION",
            Self::CyclicGraph { .. } => "DEF_CYCLIC_GRAPH",
        }
    }

    fn is_recoverable(&self) -> bool {
        // Definitions are static data; nothing here heals at runtime.
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use umwelt_types::assert_error_codes;

    fn all_variants() -> Vec<DefinitionError> {
        vec![
            DefinitionError::EmptyName { gm: "g".into() },
            DefinitionError::DuplicateConjecture {
                gm: "g".into(),
                conjecture: "c".into(),
            },
            DefinitionError::UndefinedConjecture {
                gm: "g".into(),
                conjecture: "c".into(),
            },
            DefinitionError::UndefinedIntention {
                gm: "g".into(),
                intention: "i".into(),
            },
            DefinitionError::DegenerateContradiction { gm: "g".into() },
            DefinitionError::CyclicGraph { via: "g".into() },
        ]
    }

    #[test]
    fn all_error_codes_valid() {
        assert_error_codes(&all_variants(), "DEF_");
    }

    #[test]
    fn nothing_is_recoverable() {
        for err in all_variants() {
            assert!(!err.is_recoverable(), "{} should be fatal", err.code());
        }
    }
}
