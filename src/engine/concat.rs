//! Concatenation through the concat demuxer
//!
//! Inputs are written to a transient list file, one `file '<path>'` line
//! each, and joined by stream copy with timestamps regenerated.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tempfile::NamedTempFile;
use tracing::{debug, error, info, warn};

use crate::domain::model::{OperationOutcome, OutcomeFailure};
use crate::engine::{run_verified, EngineConfig};
use crate::output::{OutputCheck, OutputVerifier};
use crate::ports::{ExecutePort, ToolInvocation};
use crate::utils::PathUtils;

/// Stream-copy concatenator
pub struct Concatenator {
    executor: Arc<dyn ExecutePort>,
    config: EngineConfig,
}

impl Concatenator {
    pub fn new(executor: Arc<dyn ExecutePort>, config: EngineConfig) -> Self {
        Self { executor, config }
    }

    /// Join `inputs` in order into `output`.
    ///
    /// Every input must exist and be non-empty, and none may be the output
    /// itself; the first that fails aborts the call before anything runs.
    /// A single input is copied.
    pub async fn concat<P: AsRef<Path>>(&self, inputs: &[P], output: &Path) -> OperationOutcome {
        if inputs.is_empty() {
            return OperationOutcome::rejected(output.to_path_buf(), "No inputs provided");
        }

        for (i, input) in inputs.iter().enumerate() {
            let input = input.as_ref();
            match OutputVerifier::check_input(input).await {
                Ok(size) => debug!(
                    "Validated input {}/{}: {} ({} bytes)",
                    i + 1,
                    inputs.len(),
                    input.display(),
                    size
                ),
                Err(reason) => {
                    error!(index = i, "Concat input rejected: {}", reason);
                    return OperationOutcome::rejected(
                        output.to_path_buf(),
                        format!("Input {}: {}", i, reason),
                    );
                }
            }
        }

        for (i, input) in inputs.iter().enumerate() {
            if same_file(input.as_ref(), output).await {
                error!(index = i, "Concat output is also an input: {}", output.display());
                return OperationOutcome::rejected(
                    output.to_path_buf(),
                    format!("Input {}: output {} is also an input", i, output.display()),
                );
            }
        }

        if let [single] = inputs {
            return self.copy_single(single.as_ref(), output).await;
        }

        let list = match self.write_list(inputs) {
            Ok(list) => list,
            Err(e) => {
                error!("Failed to write concat list: {}", e);
                return OperationOutcome::failed(
                    OutcomeFailure::Io,
                    output.to_path_buf(),
                    Duration::ZERO,
                    String::new(),
                    -1,
                    format!("Failed to write concat list: {}", e),
                );
            }
        };

        let invocation = self.invocation(list.path(), output);
        let outcome = run_verified(self.executor.as_ref(), &invocation, output).await;

        let list_path = list.path().to_path_buf();
        if let Err(e) = list.close() {
            warn!(path = %list_path.display(), "Failed to remove concat list: {}", e);
        }

        info!(
            inputs = inputs.len(),
            success = outcome.success,
            elapsed_ms = outcome.elapsed.as_millis() as u64,
            bytes = outcome.file_size,
            throughput_mbps = outcome.throughput_mbps,
            "Concatenated {} inputs into {}",
            inputs.len(),
            output.display()
        );
        outcome
    }

    /// `ffmpeg -f concat -safe 0 -i <list> -c copy -an -avoid_negative_ts make_zero -fflags +genpts -y <out>`
    pub fn invocation(&self, list: &Path, output: &Path) -> ToolInvocation {
        ToolInvocation::new(&self.config.ffmpeg_bin, self.config.concat_timeout)
            .args(["-f", "concat", "-safe", "0", "-i"])
            .path_arg(list)
            .args(["-c", "copy", "-an", "-avoid_negative_ts", "make_zero"])
            .args(["-fflags", "+genpts", "-y"])
            .path_arg(output)
    }

    /// List file contents, one line per input
    pub fn list_contents<P: AsRef<Path>>(inputs: &[P]) -> std::io::Result<String> {
        let mut contents = String::new();
        for input in inputs {
            contents.push_str(&PathUtils::concat_list_entry(input.as_ref())?);
            contents.push('\n');
        }
        Ok(contents)
    }

    fn write_list<P: AsRef<Path>>(&self, inputs: &[P]) -> std::io::Result<NamedTempFile> {
        let contents = Self::list_contents(inputs)?;
        let mut list = tempfile::Builder::new()
            .prefix("concat_")
            .suffix(".txt")
            .tempfile_in(&self.config.temp_dir)?;
        list.write_all(contents.as_bytes())?;
        list.flush()?;
        Ok(list)
    }

    async fn copy_single(&self, input: &Path, output: &Path) -> OperationOutcome {
        let command = format!("cp {} {}", input.display(), output.display());
        if let Err(e) = tokio::fs::copy(input, output).await {
            error!("Failed to copy single input: {}", e);
            OutputVerifier::discard(output).await;
            return OperationOutcome::failed(
                OutcomeFailure::Io,
                output.to_path_buf(),
                Duration::ZERO,
                command,
                -1,
                format!("Failed to copy single input: {}", e),
            );
        }

        match OutputVerifier::check(output).await {
            OutputCheck::Ready { size } => {
                info!(bytes = size, "Single input copied to {}", output.display());
                OperationOutcome::succeeded(
                    output.to_path_buf(),
                    Duration::ZERO,
                    command,
                    String::new(),
                    size,
                )
            }
            check => {
                error!(path = %output.display(), "Copy succeeded but output is {:?}", check);
                OutputVerifier::discard(output).await;
                OperationOutcome::failed(
                    check.failure().unwrap_or(OutcomeFailure::MissingOutput),
                    output.to_path_buf(),
                    Duration::ZERO,
                    command,
                    0,
                    format!("Copied output is {:?}: {}", check, output.display()),
                )
            }
        }
    }
}

/// Whether `a` and `b` name the same file, through links and `..` when both exist
async fn same_file(a: &Path, b: &Path) -> bool {
    if let (Ok(a), Ok(b)) = (tokio::fs::canonicalize(a).await, tokio::fs::canonicalize(b).await) {
        return a == b;
    }
    match (PathUtils::absolute(a), PathUtils::absolute(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
