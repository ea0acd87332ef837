use std::time::Duration;
use thiserror::Error;

/// Fast-order error types
#[derive(Error, Debug)]
pub enum FastOrderError {
    #[error("LLM API call failed: {0}")]
    OpenAi(#[from] async_openai::error::OpenAIError),

    #[error("LLM API call failed: {0}")]
    Upstream(String),

    #[error("LLM API call timed out after {0:?}")]
    Timeout(Duration),

    #[error("LLM API call cancelled")]
    Cancelled,

    #[error("circuit breaker is open")]
    CircuitOpen,

    #[error("circuit breaker is half-open and all trial requests are in use")]
    TooManyTrialRequests,

    #[error("{0}")]
    Validation(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FastOrderError {
    /// The breaker refused the call; the upstream was never contacted
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            FastOrderError::CircuitOpen | FastOrderError::TooManyTrialRequests
        )
    }
}

/// Result type alias for fast-order operations
pub type Result<T> = std::result::Result<T, FastOrderError>;
