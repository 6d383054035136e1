//! FFprobe adapter for media file probing
//!
//! Implements the Metadata Prober: one ffprobe call per request, first
//! video stream only, no retries.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;
use crate::probe::inspector::{StreamInspector, STREAM_ENTRIES};

/// FFprobe-based probe adapter
pub struct FFprobeAdapter {
    executor: Arc<dyn ExecutePort>,
    ffprobe_bin: PathBuf,
    timeout: Duration,
}

impl FFprobeAdapter {
    /// Create new FFprobe adapter
    pub fn new(executor: Arc<dyn ExecutePort>, ffprobe_bin: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            executor,
            ffprobe_bin: ffprobe_bin.into(),
            timeout,
        }
    }

    fn invocation(&self, file_path: &Path) -> ToolInvocation {
        ToolInvocation::new(&self.ffprobe_bin, self.timeout)
            .args(["-v", "error", "-select_streams", "v:0", "-show_entries"])
            .arg(STREAM_ENTRIES)
            .args(["-of", "json"])
            .path_arg(file_path)
    }
}

#[async_trait]
impl ProbePort for FFprobeAdapter {
    async fn probe(&self, file_path: &Path) -> Result<VideoStreamInfo, DomainError> {
        let invocation = self.invocation(file_path);
        let probe_error = |message: String| DomainError::Probe {
            path: file_path.to_path_buf(),
            message,
        };

        let output = self
            .executor
            .run(&invocation)
            .await
            .map_err(|e| probe_error(e.to_string()))?;

        if !output.success() {
            error!(path = %file_path.display(), "ffprobe failed: {}", output.stderr.trim());
            return Err(probe_error(format!("ffprobe failed: {}", output.stderr.trim())));
        }

        let info = StreamInspector::parse_video_stream(&output.stdout).map_err(probe_error)?;
        debug!(
            path = %file_path.display(),
            codec = %info.codec,
            resolution = %info.resolution(),
            frame_rate = %info.frame_rate,
            "Probed video stream"
        );
        Ok(info)
    }
}
