//! Error types for the askroute assistant.
//!
//! This module defines a unified error enum covering all error categories in
//! the application: configuration, I/O, query validation, retrieval, web
//! search, generation, and serialization.

use thiserror::Error;

/// Unified error type for the askroute assistant.
///
/// All fallible functions return `Result<T, AppError>`.
/// We never panic — errors must be represented and propagated.
///
/// Retrieval and web-search errors are recoverable: the router absorbs them
/// as empty evidence and degrades the route. Generation errors are not — there
/// is no lower fallback than the model itself.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Query rejected before any adapter call (empty or whitespace-only text)
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Evidence store failures (timeout, unreachable index)
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// Web search provider failures (network, quota)
    #[error("Web search error: {0}")]
    WebSearch(String),

    /// The generation backend could not produce an answer.
    /// Fatal to the turn; answers from this state are never cached.
    #[error("Generation backend unavailable: {0}")]
    GenerationUnavailable(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
