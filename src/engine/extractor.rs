//! Segment extraction by stream copy
//!
//! The start time is split into a coarse seek placed before `-i`, which
//! jumps to a keyframe without decoding, and a fine residual seek placed
//! after `-i`, which lands on the exact frame. No re-encoding happens.

use std::path::Path;
use std::sync::Arc;

use tracing::{error, info};

use crate::domain::errors::DomainError;
use crate::domain::model::{OperationOutcome, SegmentSource};
use crate::domain::rules::{SeekPlan, SeekPlanner};
use crate::engine::{run_verified, EngineConfig};
use crate::ports::{ExecutePort, ToolInvocation};

/// Stream-copy segment extractor
pub struct SegmentExtractor {
    executor: Arc<dyn ExecutePort>,
    config: EngineConfig,
}

impl SegmentExtractor {
    pub fn new(executor: Arc<dyn ExecutePort>, config: EngineConfig) -> Self {
        Self { executor, config }
    }

    /// Cut `[start_s, end_s)` of `input` into `output`.
    ///
    /// A missing input or an empty window is rejected without running the
    /// tool. Audio is dropped and output timestamps start at zero.
    pub async fn extract(
        &self,
        input: &Path,
        start_s: f64,
        end_s: f64,
        output: &Path,
    ) -> OperationOutcome {
        if tokio::fs::metadata(input).await.is_err() {
            error!(path = %input.display(), "Extraction input not found");
            return OperationOutcome::rejected(
                output.to_path_buf(),
                format!("Input file not found: {}", input.display()),
            );
        }

        let plan = match SeekPlanner::plan(start_s, end_s, self.config.preroll_s) {
            Ok(plan) => plan,
            Err(e) => {
                error!(start_s, end_s, "Rejected extraction window: {}", e);
                return OperationOutcome::rejected(output.to_path_buf(), validation_message(e));
            }
        };

        let invocation = self.invocation(input, &plan, output);
        let outcome = run_verified(self.executor.as_ref(), &invocation, output).await;

        info!(
            start_s,
            end_s,
            success = outcome.success,
            elapsed_ms = outcome.elapsed.as_millis() as u64,
            bytes = outcome.file_size,
            throughput_mbps = outcome.throughput_mbps,
            "Extract segment: {:.2}s-{:.2}s",
            start_s,
            end_s
        );
        outcome
    }

    /// Extract a resolved segment
    pub async fn extract_source(&self, source: &SegmentSource, output: &Path) -> OperationOutcome {
        self.extract(&source.path, source.start_s, source.end_s, output)
            .await
    }

    /// `ffmpeg -ss <coarse> -i <in> -ss <fine> -t <dur> -c copy -an -avoid_negative_ts make_zero -y <out>`
    pub fn invocation(&self, input: &Path, plan: &SeekPlan, output: &Path) -> ToolInvocation {
        ToolInvocation::new(&self.config.ffmpeg_bin, self.config.extract_timeout)
            .arg("-ss")
            .arg(format!("{:.3}", plan.coarse_s))
            .arg("-i")
            .path_arg(input)
            .arg("-ss")
            .arg(format!("{:.3}", plan.fine_s))
            .arg("-t")
            .arg(format!("{:.3}", plan.duration_s))
            .args(["-c", "copy", "-an", "-avoid_negative_ts", "make_zero", "-y"])
            .path_arg(output)
    }
}

fn validation_message(error: DomainError) -> String {
    match error {
        DomainError::Validation(message) => message,
        other => other.to_string(),
    }
}
