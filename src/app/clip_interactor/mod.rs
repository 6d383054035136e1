// Clip interactor - Clip lifecycle: create, look up, delete, snapshot

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::app::{generate_id, snapshot};
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::engine::{PipelineOrchestrator, ScoreboardOverlay};
use crate::output::ArtifactGuard;
use crate::ports::*;
use crate::utils::PathUtils;

/// Clip lifecycle manager
pub struct ClipManager {
    pipeline: Arc<PipelineOrchestrator>,
    overlay: Arc<ScoreboardOverlay>,
    clips: Arc<dyn Repository<Clip>>,
    clips_dir: PathBuf,
}

impl ClipManager {
    pub fn new(
        pipeline: Arc<PipelineOrchestrator>,
        overlay: Arc<ScoreboardOverlay>,
        clips: Arc<dyn Repository<Clip>>,
        clips_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            pipeline,
            overlay,
            clips,
            clips_dir: clips_dir.into(),
        }
    }

    /// Build and register a clip from camera segments.
    ///
    /// Every segment is checked against `camera_files` before any tool runs.
    /// The recorded duration is the sum of the requested spans. With a
    /// scoreboard, the stream-copied result is re-encoded once more and the
    /// intermediate file is always removed.
    pub async fn create(
        &self,
        segments: &[Segment],
        camera_files: &HashMap<String, PathBuf>,
        scoreboard: Option<&ScoreboardSpec>,
    ) -> Result<Clip, DomainError> {
        let sources = SegmentRules::resolve(segments, camera_files)?;
        let total_duration = SegmentRules::total_duration(segments);

        tokio::fs::create_dir_all(&self.clips_dir)
            .await
            .map_err(|e| DomainError::io(format!("creating {}", self.clips_dir.display()), e))?;

        let clip_id = generate_id("clip");
        let output_path = self.clips_dir.join(format!("{}.mp4", clip_id));

        info!(clip_id = %clip_id, "Creating clip with {} segments", segments.len());
        for segment in segments {
            info!(
                "  Segment: {} {:.2}s-{:.2}s ({:.2}s)",
                segment.camera_id,
                segment.start_s,
                segment.end_s,
                segment.duration()
            );
        }

        let outcome = match scoreboard {
            None => self.pipeline.build_from_segments(&sources, &output_path).await?,
            Some(spec) => {
                let mut intermediate = ArtifactGuard::new();
                let pre_overlay = intermediate.track(PathUtils::with_suffix(&output_path, "_pre"));
                self.pipeline
                    .build_from_segments(&sources, &pre_overlay)
                    .await?;
                self.overlay
                    .apply(&pre_overlay, spec, total_duration, &output_path)
                    .await
                    .into_result()?
            }
        };

        let clip = Clip {
            clip_id: clip_id.clone(),
            segments: segments.to_vec(),
            output_path,
            filesize_bytes: outcome.file_size,
            duration_s: total_duration,
            created_at: Utc::now(),
        };
        self.clips.insert(clip.clone());

        info!(
            clip_id = %clip_id,
            duration_s = total_duration,
            bytes = clip.filesize_bytes,
            elapsed_ms = outcome.elapsed.as_millis() as u64,
            "Clip created"
        );
        Ok(clip)
    }

    pub fn get(&self, clip_id: &str) -> Result<Clip, DomainError> {
        self.clips.get(clip_id)
    }

    /// Backing file of a clip
    pub fn get_path(&self, clip_id: &str) -> Result<PathBuf, DomainError> {
        Ok(self.clips.get(clip_id)?.output_path)
    }

    /// Remove the backing file, then the registry entry.
    ///
    /// A file that cannot be removed is logged; the entry is removed anyway.
    /// Reels that reference this clip keep a dangling id.
    pub async fn delete(&self, clip_id: &str) -> Result<(), DomainError> {
        let clip = self.clips.get(clip_id)?;
        remove_backing_file(&clip.output_path).await;
        self.clips.remove(clip_id)?;
        info!(clip_id = %clip_id, "Deleted clip");
        Ok(())
    }

    /// Registry snapshot; order carries no meaning
    pub fn list(&self) -> Vec<Clip> {
        self.clips.list()
    }

    pub fn snapshot(&self) -> BTreeMap<String, Clip> {
        snapshot::collect(self.clips.as_ref())
    }

    pub fn restore(&self, clips: BTreeMap<String, Clip>) -> usize {
        snapshot::restore(self.clips.as_ref(), clips)
    }

    /// Write clip metadata as JSON
    pub async fn save_snapshot(&self, path: &Path) -> Result<(), DomainError> {
        snapshot::write_json(path, &self.snapshot()).await
    }

    /// Load clip metadata; a missing file loads nothing
    pub async fn load_snapshot(&self, path: &Path) -> Result<usize, DomainError> {
        match snapshot::read_json(path).await? {
            Some(clips) => {
                let count = self.restore(clips);
                info!("Loaded metadata for {} clips from {}", count, path.display());
                Ok(count)
            }
            None => Ok(0),
        }
    }
}

/// Delete an entity's file, logging instead of failing
pub(crate) async fn remove_backing_file(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => info!("Deleted file: {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), "Failed to delete file: {}", e),
    }
}

#[cfg(test)]
mod tests;
