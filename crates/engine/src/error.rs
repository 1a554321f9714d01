//! Engine errors

use thiserror::Error;

use amlwatch_core::ContextError;

/// Errors surfaced by the risk engine.
///
/// History and classifier failures are not errors at this level: they are
/// resolved per the configured fail policy and reported in the verdict.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid evaluation context: {0}")]
    InvalidContext(#[from] ContextError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    pub fn config(reason: impl Into<String>) -> Self {
        EngineError::Config(reason.into())
    }
}
