//! Application-layer errors.

use thiserror::Error;
use umwelt_engine::EngineError;
use umwelt_model::DefinitionError;
use umwelt_types::ErrorCode;

/// Failure assembling or spawning an agent.
#[derive(Debug, Error)]
pub enum AppError {
    /// A GM definition or the cognition graph is malformed.
    #[error(transparent)]
    Definition(#[from] DefinitionError),

    /// An engine failed to initialize or recover.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Two GM definitions share a name.
    #[error("profile defines gm '{name}' more than once")]
    DuplicateGm { name: String },

    /// The graph names a parent that no GM definition provides.
    ///
    /// Children may be detectors; parents must be GMs — someone has to
    /// publish the predictions.
    #[error("cognition graph parent '{name}' has no gm definition")]
    UnknownParent { name: String },
}

impl ErrorCode for AppError {
    fn code(&self) -> &'static str {
        match self {
            Self::Definition(_) => "APP_BAD_DEFINITION",
            Self::Engine(_) => "APP_ENGINE",
            Self::DuplicateGm { .. } => "APP_DUPLICATE_GM",
            Self::UnknownParent { .. } => "APP_UNKNOWN_PARENT",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            Self::Engine(inner) => inner.is_recoverable(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use umwelt_types::assert_error_codes;

    #[test]
    fn all_error_codes_valid() {
        assert_error_codes(
            &[
                AppError::Definition(DefinitionError::EmptyName { gm: "g".into() }),
                AppError::Engine(EngineError::MalformedLearning {
                    gm: "g".into(),
                    detail: "x".into(),
                }),
                AppError::DuplicateGm { name: "g".into() },
                AppError::UnknownParent { name: "g".into() },
            ],
            "APP_",
        );
    }
}
