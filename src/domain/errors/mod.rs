// Domain errors - Error taxonomy shared by every layer

use std::path::PathBuf;

use thiserror::Error;

/// Domain-specific error types
#[derive(Error, Debug)]
pub enum DomainError {
    /// Malformed segment, unknown camera or clip id, empty input list
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Input streams cannot be joined by stream copy
    #[error("Incompatible streams: {0}")]
    Incompatible(String),

    /// Probing tool failed or the file has no video stream
    #[error("Failed to probe {}: {message}", path.display())]
    Probe { path: PathBuf, message: String },

    /// External tool exited unsuccessfully
    #[error("{tool} failed with exit code {exit_code}: {diagnostics}")]
    ToolInvocation {
        tool: String,
        exit_code: i32,
        diagnostics: String,
    },

    /// Tool reported success but left no usable file behind
    #[error("Output missing or empty: {}", path.display())]
    EmptyOrMissingOutput { path: PathBuf },

    /// External tool exceeded its time budget
    #[error("{tool} timed out after {seconds}s")]
    Timeout { tool: String, seconds: u64 },

    /// A pipeline segment could not be produced
    #[error("Segment {index} ({}) failed: {message}", path.display())]
    SegmentFailed {
        index: usize,
        path: PathBuf,
        message: String,
    },

    /// Unknown clip or reel identifier
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem or process I/O failure
    #[error("I/O error while {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl DomainError {
    /// Build an I/O error with a short description of what was being attempted
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        DomainError::Io {
            context: context.into(),
            source,
        }
    }

    /// True when the caller supplied bad input, false for processing failures
    pub fn is_bad_input(&self) -> bool {
        matches!(
            self,
            DomainError::Validation(_) | DomainError::Incompatible(_) | DomainError::NotFound { .. }
        )
    }
}

/// Result type alias for reelcut operations
pub type DomainResult<T> = std::result::Result<T, DomainError>;
