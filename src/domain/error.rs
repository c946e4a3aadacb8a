use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize)]
pub enum AppError {
    /// Schema introspection failed; callers degrade to an empty schema.
    CatalogUnavailable(String),
    /// No LLM client was configured at startup.
    ModelUnavailable(String),
    /// The LLM call errored, timed out, or returned an unusable payload.
    GenerationFailed(String),
    /// The database rejected the generated statement; carries the engine's
    /// native error message.
    ExecutionFailed(String),
    /// The database could not be reached within the connect timeout.
    ConnectionFailed(String),
    ConfigError(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::CatalogUnavailable(msg) => write!(f, "Schema catalog unavailable: {}", msg),
            AppError::ModelUnavailable(msg) => write!(f, "Model unavailable: {}", msg),
            AppError::GenerationFailed(msg) => write!(f, "SQL generation failed: {}", msg),
            AppError::ExecutionFailed(msg) => write!(f, "SQL execution failed: {}", msg),
            AppError::ConnectionFailed(msg) => write!(f, "Database connection failed: {}", msg),
            AppError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
