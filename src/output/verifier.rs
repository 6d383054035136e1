//! Output verification
//!
//! A tool exiting zero is not enough: the file it was asked to write must
//! exist and hold at least one byte.

use std::path::Path;

use tracing::warn;

use crate::domain::model::OutcomeFailure;

/// Verified state of an output file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputCheck {
    Ready { size: u64 },
    Missing,
    Empty,
}

impl OutputCheck {
    /// Failure kind when the output is unusable
    pub fn failure(&self) -> Option<OutcomeFailure> {
        match self {
            OutputCheck::Ready { .. } => None,
            OutputCheck::Missing => Some(OutcomeFailure::MissingOutput),
            OutputCheck::Empty => Some(OutcomeFailure::EmptyOutput),
        }
    }
}

/// Output file verifier
pub struct OutputVerifier;

impl OutputVerifier {
    /// Inspect `path` after a tool run
    pub async fn check(path: &Path) -> OutputCheck {
        match tokio::fs::metadata(path).await {
            Ok(meta) if meta.is_file() && meta.len() > 0 => OutputCheck::Ready { size: meta.len() },
            Ok(meta) if meta.is_file() => OutputCheck::Empty,
            _ => OutputCheck::Missing,
        }
    }

    /// Precondition for anything consumed as input: exists and is non-empty
    pub async fn check_input(path: &Path) -> Result<u64, String> {
        match Self::check(path).await {
            OutputCheck::Ready { size } => Ok(size),
            OutputCheck::Missing => Err(format!("Input file not found: {}", path.display())),
            OutputCheck::Empty => Err(format!("Input file is empty: {}", path.display())),
        }
    }

    /// Delete a partial or bogus output. Failures are logged and swallowed.
    pub async fn discard(path: &Path) {
        match tokio::fs::remove_file(path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), "Failed to remove partial output: {}", e),
        }
    }
}
