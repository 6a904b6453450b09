// Domain errors - Error types for the domain layer

use std::fmt;

/// Domain-specific error types
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Invalid arguments provided
    BadArgs(String),
    /// Invalid time range
    InvalidTimeRange(String),
    /// Unknown codec key
    UnsupportedCodec(String),
    /// Queue index out of bounds or no source loaded
    InvalidState(String),
    /// External tool could not be started
    ProcessLaunch(String),
    /// External tool exited unsuccessfully
    ToolFailed(String),
    /// Probe tool failed or printed something unparsable
    ProbeFailed(String),
    /// Every fetch strategy failed; carries the classified message
    FetchExhausted(String),
    /// Filesystem operation failed
    FsFail(String),
    /// Internal error
    InternalError(String),
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::BadArgs(msg) => write!(f, "Bad arguments: {}", msg),
            DomainError::InvalidTimeRange(msg) => write!(f, "Invalid time range: {}", msg),
            DomainError::UnsupportedCodec(msg) => write!(f, "Unsupported codec: {}", msg),
            DomainError::InvalidState(msg) => write!(f, "Invalid state: {}", msg),
            DomainError::ProcessLaunch(msg) => write!(f, "Process error: {}", msg),
            DomainError::ToolFailed(msg) => write!(f, "Tool failed: {}", msg),
            DomainError::ProbeFailed(msg) => write!(f, "Failed to get video duration: {}", msg),
            DomainError::FetchExhausted(msg) => write!(f, "{}", msg),
            DomainError::FsFail(msg) => write!(f, "Filesystem error: {}", msg),
            DomainError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}
