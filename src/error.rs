//! Error types for the engine

use thiserror::Error;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Engine errors
///
/// Classification and merge functions never fail; they return conservative
/// defaults on malformed input. The only hard failure surface is document
/// loading, where an unresolvable reference must abort the run.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("reference '{0}' points outside the loaded document set")]
    ExternalReference(String),

    #[error("invalid schema document: {0}")]
    InvalidDocument(String),

    #[error("invalid path template: {0}")]
    InvalidPath(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
