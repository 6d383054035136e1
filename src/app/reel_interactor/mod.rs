// Reel interactor - Reel lifecycle over already-registered clips

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::app::clip_interactor::remove_backing_file;
use crate::app::{generate_id, snapshot};
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::engine::Concatenator;
use crate::output::{OutputCheck, OutputVerifier};
use crate::ports::*;

/// Reel lifecycle manager
///
/// Reels refer to clips by id only. Deleting a clip never touches reels
/// built from it.
pub struct ReelManager {
    concatenator: Arc<Concatenator>,
    clips: Arc<dyn Repository<Clip>>,
    reels: Arc<dyn Repository<Reel>>,
    reels_dir: PathBuf,
}

impl ReelManager {
    pub fn new(
        concatenator: Arc<Concatenator>,
        clips: Arc<dyn Repository<Clip>>,
        reels: Arc<dyn Repository<Reel>>,
        reels_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            concatenator,
            clips,
            reels,
            reels_dir: reels_dir.into(),
        }
    }

    /// Join existing clips, in the given order, into a new reel
    pub async fn create(&self, clip_ids: &[String]) -> Result<Reel, DomainError> {
        if clip_ids.is_empty() {
            return Err(DomainError::Validation("No clips provided".to_string()));
        }

        let mut clip_paths = Vec::with_capacity(clip_ids.len());
        let mut total_duration = 0.0;
        for (i, clip_id) in clip_ids.iter().enumerate() {
            let clip = self.validated_clip(clip_id).await?;
            info!(
                "  Validated clip {}/{} ({}): {:.2}s",
                i + 1,
                clip_ids.len(),
                clip_id,
                clip.duration_s
            );
            total_duration += clip.duration_s;
            clip_paths.push(clip.output_path);
        }

        tokio::fs::create_dir_all(&self.reels_dir)
            .await
            .map_err(|e| DomainError::io(format!("creating {}", self.reels_dir.display()), e))?;

        let reel_id = generate_id("reel");
        let output_path = self.reels_dir.join(format!("{}.mp4", reel_id));
        info!(
            reel_id = %reel_id,
            "Creating reel from {} clips, total duration={:.2}s",
            clip_ids.len(),
            total_duration
        );

        let outcome = self
            .concatenator
            .concat(&clip_paths, &output_path)
            .await
            .into_result()?;

        let reel = Reel {
            reel_id: reel_id.clone(),
            clip_ids: clip_ids.to_vec(),
            output_path,
            filesize_bytes: outcome.file_size,
            duration_s: total_duration,
            created_at: Utc::now(),
        };
        self.reels.insert(reel.clone());

        info!(
            reel_id = %reel_id,
            clips = clip_ids.len(),
            duration_s = total_duration,
            bytes = reel.filesize_bytes,
            "Reel created"
        );
        Ok(reel)
    }

    async fn validated_clip(&self, clip_id: &str) -> Result<Clip, DomainError> {
        let clip = self.clips.get(clip_id).map_err(|e| match e {
            DomainError::NotFound { .. } => {
                DomainError::Validation(format!("Clip {} not found", clip_id))
            }
            other => other,
        })?;

        match OutputVerifier::check(&clip.output_path).await {
            OutputCheck::Ready { .. } => {}
            OutputCheck::Missing => {
                return Err(DomainError::Validation(format!(
                    "Clip {} file not found: {}",
                    clip_id,
                    clip.output_path.display()
                )));
            }
            OutputCheck::Empty => {
                return Err(DomainError::Validation(format!(
                    "Clip {} file is empty: {}",
                    clip_id,
                    clip.output_path.display()
                )));
            }
        }

        if clip.duration_s.is_nan() || clip.duration_s <= 0.0 {
            return Err(DomainError::Validation(format!(
                "Clip {} has invalid duration: {}s",
                clip_id, clip.duration_s
            )));
        }
        Ok(clip)
    }

    pub fn get(&self, reel_id: &str) -> Result<Reel, DomainError> {
        self.reels.get(reel_id)
    }

    pub fn get_path(&self, reel_id: &str) -> Result<PathBuf, DomainError> {
        Ok(self.reels.get(reel_id)?.output_path)
    }

    /// Remove the backing file, then the registry entry
    pub async fn delete(&self, reel_id: &str) -> Result<(), DomainError> {
        let reel = self.reels.get(reel_id)?;
        remove_backing_file(&reel.output_path).await;
        self.reels.remove(reel_id)?;
        info!(reel_id = %reel_id, "Deleted reel");
        Ok(())
    }

    pub fn list(&self) -> Vec<Reel> {
        self.reels.list()
    }

    /// Ids of clips a reel references that are no longer registered
    pub fn dangling_clips(&self, reel_id: &str) -> Result<Vec<String>, DomainError> {
        let reel = self.reels.get(reel_id)?;
        Ok(reel
            .clip_ids
            .into_iter()
            .filter(|id| !self.clips.contains(id))
            .collect())
    }

    pub fn snapshot(&self) -> BTreeMap<String, Reel> {
        snapshot::collect(self.reels.as_ref())
    }

    pub fn restore(&self, reels: BTreeMap<String, Reel>) -> usize {
        snapshot::restore(self.reels.as_ref(), reels)
    }

    /// Write reel metadata as JSON
    pub async fn save_snapshot(&self, path: &Path) -> Result<(), DomainError> {
        snapshot::write_json(path, &self.snapshot()).await
    }

    /// Load reel metadata; a missing file loads nothing
    pub async fn load_snapshot(&self, path: &Path) -> Result<usize, DomainError> {
        match snapshot::read_json(path).await? {
            Some(reels) => {
                let count = self.restore(reels);
                info!("Loaded metadata for {} reels from {}", count, path.display());
                Ok(count)
            }
            None => Ok(0),
        }
    }
}

#[cfg(test)]
mod tests;
