//! Error types for the course assistant.

use thiserror::Error;

/// Library-level error type.
#[derive(Error, Debug)]
pub enum RagError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load course data: {0}")]
    DataLoad(String),

    #[error("Failed to build vector index: {0}")]
    IndexBuild(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Retrieval failed: {0}")]
    Retrieval(String),

    #[error("Answer generation failed: {0}")]
    Generation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, RagError>;
