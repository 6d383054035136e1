//! Stream-copy compatibility validation

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::domain::errors::*;
use crate::domain::model::VideoStreamInfo;
use crate::domain::rules::CompatibilityRules;
use crate::ports::ProbePort;

/// Verdict over a set of inputs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompatibilityReport {
    pub compatible: bool,
    /// First disqualifying difference, e.g. `Video 1 resolution mismatch: ...`
    pub reason: Option<String>,
}

impl CompatibilityReport {
    fn compatible() -> Self {
        Self {
            compatible: true,
            reason: None,
        }
    }
}

/// Decides whether N inputs can be concatenated by stream copy
pub struct CompatibilityValidator {
    probe: Arc<dyn ProbePort>,
}

impl CompatibilityValidator {
    pub fn new(probe: Arc<dyn ProbePort>) -> Self {
        Self { probe }
    }

    /// Probe every input and compare each against the first.
    ///
    /// Fewer than two inputs are trivially compatible and nothing is probed.
    /// A probe failure is returned as an error, not as an incompatibility.
    pub async fn validate<P: AsRef<Path>>(&self, paths: &[P]) -> Result<CompatibilityReport, DomainError> {
        if paths.len() < 2 {
            return Ok(CompatibilityReport::compatible());
        }

        let mut streams: Vec<VideoStreamInfo> = Vec::with_capacity(paths.len());
        for path in paths {
            streams.push(self.probe.probe(path.as_ref()).await?);
        }

        let reference = &streams[0];
        for (i, candidate) in streams.iter().enumerate().skip(1) {
            if let Some(mismatch) = CompatibilityRules::first_mismatch(reference, candidate) {
                let reason = format!("Video {} {}", i, mismatch);
                warn!(
                    path = %paths[i].as_ref().display(),
                    "Inputs are not stream-copy compatible: {}", reason
                );
                return Ok(CompatibilityReport {
                    compatible: false,
                    reason: Some(reason),
                });
            }
        }

        info!(
            inputs = paths.len(),
            codec = %reference.codec,
            resolution = %reference.resolution(),
            "Inputs are stream-copy compatible"
        );
        Ok(CompatibilityReport::compatible())
    }

    /// Like [`validate`](Self::validate), but an incompatibility is an error
    pub async fn ensure_compatible<P: AsRef<Path>>(&self, paths: &[P]) -> Result<(), DomainError> {
        let report = self.validate(paths).await?;
        match report.reason {
            Some(reason) if !report.compatible => Err(DomainError::Incompatible(reason)),
            _ => Ok(()),
        }
    }

    /// Probe a single input
    pub async fn describe(&self, path: &Path) -> Result<VideoStreamInfo, DomainError> {
        self.probe.probe(path).await
    }
}

/// Deduplicate inputs while keeping first-seen order
pub fn distinct_paths(paths: impl IntoIterator<Item = PathBuf>) -> Vec<PathBuf> {
    let mut seen = Vec::new();
    for path in paths {
        if !seen.contains(&path) {
            seen.push(path);
        }
    }
    seen
}
