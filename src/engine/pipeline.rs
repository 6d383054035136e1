//! Segment pipeline: extract every segment, then join them
//!
//! Temporary segment files are tracked by an [`ArtifactGuard`] and removed
//! whether the pipeline succeeds or fails. There is no partial output: the
//! first failing segment fails the whole build.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{error, info};
use uuid::Uuid;

use crate::domain::errors::*;
use crate::domain::model::{OperationOutcome, SegmentSource};
use crate::domain::rules::TimeRangeRules;
use crate::engine::{Concatenator, EngineConfig, SegmentExtractor};
use crate::output::ArtifactGuard;
use crate::ports::ExecutePort;

/// Composes the extractor and concatenator
pub struct PipelineOrchestrator {
    extractor: SegmentExtractor,
    concatenator: Concatenator,
    temp_dir: PathBuf,
}

impl PipelineOrchestrator {
    pub fn new(executor: Arc<dyn ExecutePort>, config: EngineConfig) -> Self {
        Self {
            extractor: SegmentExtractor::new(executor.clone(), config.clone()),
            concatenator: Concatenator::new(executor, config.clone()),
            temp_dir: config.temp_dir,
        }
    }

    pub fn concatenator(&self) -> &Concatenator {
        &self.concatenator
    }

    /// Build `output` from `segments` in order.
    ///
    /// The returned outcome carries the concatenation's size and the summed
    /// extraction and concatenation time.
    pub async fn build_from_segments(
        &self,
        segments: &[SegmentSource],
        output: &Path,
    ) -> Result<OperationOutcome, DomainError> {
        if segments.is_empty() {
            return Err(DomainError::Validation("No segments provided".to_string()));
        }

        let mut temps = ArtifactGuard::new();
        let mut extracted = Vec::with_capacity(segments.len());
        let mut extract_time = Duration::ZERO;

        for (index, segment) in segments.iter().enumerate() {
            if tokio::fs::metadata(&segment.path).await.is_err() {
                return Err(DomainError::Validation(format!(
                    "Segment {} input file not found: {}",
                    index,
                    segment.path.display()
                )));
            }
            TimeRangeRules::validate(segment.start_s, segment.end_s).map_err(|_| {
                DomainError::Validation(format!(
                    "Segment {} has invalid time range: {} to {}",
                    index, segment.start_s, segment.end_s
                ))
            })?;

            let temp = temps.track(self.temp_segment_path(index));
            let outcome = self.extractor.extract_source(segment, &temp).await;
            if !outcome.success {
                error!(index, path = %segment.path.display(), "Segment extraction failed");
                return Err(segment_failure(index, &segment.path, outcome));
            }

            info!(
                "Extracted segment {}/{}: {} bytes",
                index + 1,
                segments.len(),
                outcome.file_size
            );
            extract_time += outcome.elapsed;
            extracted.push(temp);
        }

        info!(
            "All {} segments extracted, starting concatenation",
            extracted.len()
        );
        let joined = self
            .concatenator
            .concat(&extracted, output)
            .await
            .into_result()?;

        let total = extract_time + joined.elapsed;
        info!(
            segments = segments.len(),
            extract_ms = extract_time.as_millis() as u64,
            concat_ms = joined.elapsed.as_millis() as u64,
            total_ms = total.as_millis() as u64,
            bytes = joined.file_size,
            "Extract and concat complete"
        );

        Ok(OperationOutcome {
            elapsed: total,
            command: format!("extract({}) + concat", segments.len()),
            diagnostics: String::new(),
            ..joined
        })
    }

    /// `seg_<index>_<millis>_<random>.mp4`, unique across concurrent builds
    fn temp_segment_path(&self, index: usize) -> PathBuf {
        let nonce = Uuid::new_v4().simple().to_string();
        self.temp_dir.join(format!(
            "seg_{:04}_{}_{}.mp4",
            index,
            Utc::now().timestamp_millis(),
            &nonce[..8]
        ))
    }
}

fn segment_failure(index: usize, path: &Path, outcome: OperationOutcome) -> DomainError {
    let message = match outcome.into_result() {
        Err(e) => e.to_string(),
        Ok(_) => "extraction reported no output".to_string(),
    };
    DomainError::SegmentFailed {
        index,
        path: path.to_path_buf(),
        message,
    }
}
