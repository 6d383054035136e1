//! Stream-copy media engine
//!
//! Segment extraction, concatenation, the segment pipeline that composes
//! them, and the scoreboard overlay post-process.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::domain::model::{OperationOutcome, OutcomeFailure};
use crate::output::{OutputCheck, OutputVerifier};
use crate::ports::{ExecutePort, ToolInvocation};

pub mod concat;
pub mod extractor;
pub mod overlay;
pub mod pipeline;

pub use concat::Concatenator;
pub use extractor::SegmentExtractor;
pub use overlay::ScoreboardOverlay;
pub use pipeline::PipelineOrchestrator;

/// Default coarse-seek safety margin in seconds
pub const DEFAULT_PREROLL_SECONDS: f64 = 1.5;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Stream-copy / transcoding tool
    pub ffmpeg_bin: PathBuf,
    /// Coarse-seek safety margin
    pub preroll_s: f64,
    /// Bound on a single extraction
    pub extract_timeout: Duration,
    /// Bound on a concatenation
    pub concat_timeout: Duration,
    /// Bound on the overlay encode
    pub overlay_timeout: Duration,
    /// Where transient segment and list files are created
    pub temp_dir: PathBuf,
    /// Overlay encode settings
    pub overlay: OverlayStyle,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ffmpeg_bin: PathBuf::from("ffmpeg"),
            preroll_s: DEFAULT_PREROLL_SECONDS,
            extract_timeout: Duration::from_secs(60),
            concat_timeout: Duration::from_secs(300),
            overlay_timeout: Duration::from_secs(300),
            temp_dir: std::env::temp_dir(),
            overlay: OverlayStyle::default(),
        }
    }
}

/// Encoder and text settings for the scoreboard overlay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayStyle {
    pub encoder: String,
    pub preset: String,
    pub crf: u8,
    pub font_file: Option<PathBuf>,
    pub font_size: u32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            encoder: "libx264".to_string(),
            preset: "veryfast".to_string(),
            crf: 18,
            font_file: None,
            font_size: 36,
        }
    }
}

/// Run one tool invocation that writes `target`, then verify the file.
///
/// Every failure path deletes whatever was left at `target`.
pub(crate) async fn run_verified(
    executor: &dyn ExecutePort,
    invocation: &ToolInvocation,
    target: &Path,
) -> OperationOutcome {
    let command = invocation.command_line();
    let started = Instant::now();

    let output = match executor.run(invocation).await {
        Ok(output) => output,
        Err(e) => {
            error!(command = %command, "Failed to run {}: {}", invocation.tool_name(), e);
            OutputVerifier::discard(target).await;
            return OperationOutcome::failed(
                OutcomeFailure::ToolFailed,
                target.to_path_buf(),
                started.elapsed(),
                command,
                -1,
                e.to_string(),
            );
        }
    };
    let elapsed = started.elapsed();

    if output.timed_out {
        error!(command = %command, "{} timed out", invocation.tool_name());
        OutputVerifier::discard(target).await;
        return OperationOutcome::failed(
            OutcomeFailure::TimedOut,
            target.to_path_buf(),
            elapsed.max(invocation.timeout),
            command,
            -1,
            output.stderr,
        );
    }

    if !output.success() {
        let exit_code = output.exit_code.unwrap_or(-1);
        error!(exit_code, "{} failed: {}", invocation.tool_name(), output.stderr.trim());
        OutputVerifier::discard(target).await;
        return OperationOutcome::failed(
            OutcomeFailure::ToolFailed,
            target.to_path_buf(),
            elapsed,
            command,
            exit_code,
            output.stderr,
        );
    }

    match OutputVerifier::check(target).await {
        OutputCheck::Ready { size } => {
            OperationOutcome::succeeded(target.to_path_buf(), elapsed, command, output.stderr, size)
        }
        check => {
            error!(
                path = %target.display(),
                "{} succeeded but output is {:?}",
                invocation.tool_name(),
                check
            );
            OutputVerifier::discard(target).await;
            OperationOutcome::failed(
                check.failure().unwrap_or(OutcomeFailure::MissingOutput),
                target.to_path_buf(),
                elapsed,
                command,
                0,
                output.stderr,
            )
        }
    }
}
