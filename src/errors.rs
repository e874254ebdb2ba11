use thiserror::Error;

#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AgentError {
    #[error("Function {0} not found")]
    ToolNotFound(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Tool execution failed: {0}")]
    ExecutionError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AgentResult<T> = Result<T, AgentError>;

/// Why a line typed at the rating prompt was rejected
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RatingError {
    #[error("Please enter a valid number.")]
    NotANumber,

    #[error("Please enter a number between 1 and 5.")]
    OutOfRange(i64),
}
