//! Error handling module for ClipGrab

use thiserror::Error;

use crate::domain::errors::DomainError;

/// Main error type for ClipGrab operations above the domain layer
#[derive(Error, Debug)]
pub enum ClipGrabError {
    /// Domain rule or port failure
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Configuration file could not be read or is invalid
    #[error("Invalid configuration in {path}: {message}")]
    Config { path: String, message: String },

    /// Queue file could not be read or is invalid
    #[error("Invalid queue file {path}: {message}")]
    Queue { path: String, message: String },

    /// Source was neither an existing file nor a URL
    #[error("Source not found: {source_ref}")]
    SourceNotFound { source_ref: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parse error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for ClipGrab operations
pub type ClipGrabResult<T> = std::result::Result<T, ClipGrabError>;
