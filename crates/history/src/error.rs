//! History errors

use thiserror::Error;

/// Errors from history queries and history files
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("History store unavailable: {0}")]
    Unavailable(String),

    #[error("History query timeout after {0}ms")]
    Timeout(u64),

    #[error("History query failed: {0}")]
    Query(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Result type for history operations
pub type HistoryResult<T> = Result<T, HistoryError>;

impl HistoryError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        HistoryError::Unavailable(reason.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = HistoryError::unavailable("connection refused");
        assert!(err.to_string().contains("connection refused"));

        let err = HistoryError::Timeout(250);
        assert!(err.to_string().contains("250ms"));
    }
}
