use thiserror::Error;

/// Convenience result type for execution-layer operations.
pub type ExecutionResult<T> = Result<T, ExecutionError>;

/// Error type returned by the execution layer.
///
/// The processing functions never produce this; a failing callback's own error is passed through
/// untouched.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// Options could not be parsed from JSON.
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    /// Options parsed but hold an unusable value.
    #[error("invalid options: {message}")]
    InvalidOptions { message: String },
}
