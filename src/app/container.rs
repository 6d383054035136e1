use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::adapters::{AppConfig, FFprobeAdapter, InMemoryRegistry, ProcessExecAdapter};
use crate::app::snapshot::{self, RegistryState};
use crate::app::{ClipManager, ReelManager};
use crate::domain::errors::DomainError;
use crate::domain::model::{Clip, Reel};
use crate::engine::{Concatenator, PipelineOrchestrator, ScoreboardOverlay, SegmentExtractor};
use crate::ports::{ExecutePort, ProbePort, Repository};
use crate::probe::CompatibilityValidator;

pub trait AppContainer: Send + Sync {
    fn clip_manager(&self) -> Arc<ClipManager>;
    fn reel_manager(&self) -> Arc<ReelManager>;
    fn validator(&self) -> Arc<CompatibilityValidator>;
}

pub struct DefaultAppContainer {
    config: AppConfig,
    validator: Arc<CompatibilityValidator>,
    extractor: Arc<SegmentExtractor>,
    concatenator: Arc<Concatenator>,
    clip_manager: Arc<ClipManager>,
    reel_manager: Arc<ReelManager>,
}

impl DefaultAppContainer {
    /// Wire everything against the real ffmpeg/ffprobe processes
    pub fn new(config: AppConfig) -> Self {
        Self::with_executor(config, Arc::new(ProcessExecAdapter::new()))
    }

    /// Wire everything against the given tool executor
    pub fn with_executor(config: AppConfig, executor: Arc<dyn ExecutePort>) -> Self {
        let engine = config.engine_config();

        let probe_port = Arc::new(FFprobeAdapter::new(
            Arc::clone(&executor),
            config.ffprobe_bin.clone(),
            config.probe_timeout(),
        ));
        let validator = Arc::new(CompatibilityValidator::new(probe_port as Arc<dyn ProbePort>));

        let clips: Arc<dyn Repository<Clip>> = Arc::new(InMemoryRegistry::<Clip>::new());
        let reels: Arc<dyn Repository<Reel>> = Arc::new(InMemoryRegistry::<Reel>::new());

        let extractor = Arc::new(SegmentExtractor::new(Arc::clone(&executor), engine.clone()));
        let concatenator = Arc::new(Concatenator::new(Arc::clone(&executor), engine.clone()));
        let pipeline = Arc::new(PipelineOrchestrator::new(Arc::clone(&executor), engine.clone()));
        let overlay = Arc::new(ScoreboardOverlay::new(Arc::clone(&executor), engine));

        let clip_manager = Arc::new(ClipManager::new(
            pipeline,
            overlay,
            Arc::clone(&clips),
            config.clips_dir(),
        ));
        let reel_manager = Arc::new(ReelManager::new(
            Arc::clone(&concatenator),
            clips,
            reels,
            config.reels_dir(),
        ));

        Self {
            config,
            validator,
            extractor,
            concatenator,
            clip_manager,
            reel_manager,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn extractor(&self) -> Arc<SegmentExtractor> {
        Arc::clone(&self.extractor)
    }

    pub fn concatenator(&self) -> Arc<Concatenator> {
        Arc::clone(&self.concatenator)
    }

    /// Import both registries from one snapshot; a missing file is a no-op
    pub async fn load_state(&self, path: &Path) -> Result<(), DomainError> {
        if let Some(state) = snapshot::read_json::<RegistryState>(path).await? {
            let clips = self.clip_manager.restore(state.clips);
            let reels = self.reel_manager.restore(state.reels);
            info!(clips, reels, "Loaded registry from {}", path.display());
        }
        Ok(())
    }

    /// Export both registries to one snapshot
    pub async fn save_state(&self, path: &Path) -> Result<(), DomainError> {
        let state = RegistryState {
            clips: self.clip_manager.snapshot(),
            reels: self.reel_manager.snapshot(),
        };
        snapshot::write_json(path, &state).await
    }
}

impl AppContainer for DefaultAppContainer {
    fn clip_manager(&self) -> Arc<ClipManager> {
        Arc::clone(&self.clip_manager)
    }

    fn reel_manager(&self) -> Arc<ReelManager> {
        Arc::clone(&self.reel_manager)
    }

    fn validator(&self) -> Arc<CompatibilityValidator> {
        Arc::clone(&self.validator)
    }
}
