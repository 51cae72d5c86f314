//! Error types for Reise.

use std::path::PathBuf;
use thiserror::Error;

/// Library-level error type for Reise operations.
#[derive(Error, Debug)]
pub enum ReiseError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Corpus file not found at: {0}")]
    CorpusNotFound(PathBuf),

    #[error("Vector index not found at: {0}. Run 'reise build' first.")]
    IndexNotFound(PathBuf),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Agent error: {0}")]
    Agent(String),
}

/// Result type alias for Reise operations.
pub type Result<T> = std::result::Result<T, ReiseError>;
