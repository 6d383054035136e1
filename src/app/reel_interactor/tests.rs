use super::*;
use crate::adapters::{AppConfig, ScriptedExecAdapter};
use crate::app::{AppContainer, ClipManager, DefaultAppContainer};
use std::collections::HashMap;
use tempfile::TempDir;

struct Harness {
    root: TempDir,
    tools: Arc<ScriptedExecAdapter>,
    container: DefaultAppContainer,
    cameras: HashMap<String, PathBuf>,
}

impl Harness {
    fn new() -> Self {
        let root = TempDir::new().unwrap();
        let camera = root.path().join("c1.mp4");
        std::fs::write(&camera, b"wide angle").unwrap();
        let cameras = HashMap::from([("C1".to_string(), camera)]);

        let config = AppConfig {
            output_dir: root.path().join("output"),
            temp_dir: Some(root.path().to_path_buf()),
            ..AppConfig::default()
        };
        let tools = Arc::new(ScriptedExecAdapter::new());
        let container = DefaultAppContainer::with_executor(config, tools.clone());
        Self { root, tools, container, cameras }
    }

    fn clips(&self) -> Arc<ClipManager> {
        self.container.clip_manager()
    }

    fn reels(&self) -> Arc<ReelManager> {
        self.container.reel_manager()
    }

    async fn clip(&self, start: f64, end: f64) -> Clip {
        self.clips()
            .create(&[Segment::new("C1", start, end)], &self.cameras, None)
            .await
            .unwrap()
    }

    fn reel_files(&self) -> usize {
        std::fs::read_dir(self.root.path().join("output").join("reels"))
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

#[tokio::test]
async fn test_create_reel_in_clip_order() {
    let h = Harness::new();
    let a = h.clip(0.0, 4.0).await;
    let b = h.clip(10.0, 12.5).await;

    let reel = h
        .reels()
        .create(&[b.clip_id.clone(), a.clip_id.clone()])
        .await
        .unwrap();

    assert!(reel.reel_id.starts_with("reel_"));
    assert_eq!(reel.clip_ids, vec![b.clip_id.clone(), a.clip_id.clone()]);
    assert_eq!(reel.duration_s, 6.5);

    let mut expected = std::fs::read(&b.output_path).unwrap();
    expected.extend(std::fs::read(&a.output_path).unwrap());
    assert_eq!(std::fs::read(&reel.output_path).unwrap(), expected);
    assert_eq!(reel.filesize_bytes, expected.len() as u64);
    assert_eq!(h.reels().get(&reel.reel_id).unwrap(), reel);
}

#[tokio::test]
async fn test_single_clip_reel_is_a_copy() {
    let h = Harness::new();
    let a = h.clip(0.0, 4.0).await;
    let calls_before = h.tools.invocations().len();

    let reel = h.reels().create(&[a.clip_id.clone()]).await.unwrap();

    assert_eq!(
        std::fs::read(&reel.output_path).unwrap(),
        std::fs::read(&a.output_path).unwrap()
    );
    assert_eq!(h.tools.invocations().len(), calls_before);
}

#[tokio::test]
async fn test_unknown_clip_is_named_and_nothing_is_written() {
    let h = Harness::new();
    let a = h.clip(0.0, 4.0).await;
    let c = h.clip(5.0, 6.0).await;
    let calls_before = h.tools.invocations().len();

    let err = h
        .reels()
        .create(&[a.clip_id.clone(), "clip_B".to_string(), c.clip_id.clone()])
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Validation(ref m) if m == "Clip clip_B not found"));
    assert_eq!(h.reel_files(), 0);
    assert_eq!(h.tools.invocations().len(), calls_before);
    assert!(h.reels().list().is_empty());
}

#[tokio::test]
async fn test_clip_with_missing_or_empty_file_is_rejected() {
    let h = Harness::new();
    let a = h.clip(0.0, 4.0).await;
    let b = h.clip(4.0, 8.0).await;

    std::fs::write(&b.output_path, b"").unwrap();
    let err = h
        .reels()
        .create(&[a.clip_id.clone(), b.clip_id.clone()])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("file is empty"));

    std::fs::remove_file(&b.output_path).unwrap();
    let err = h
        .reels()
        .create(&[a.clip_id.clone(), b.clip_id.clone()])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("file not found"));
}

#[tokio::test]
async fn test_empty_request_is_rejected() {
    let h = Harness::new();
    let err = h.reels().create(&[]).await.unwrap_err();
    assert!(err.is_bad_input());
}

#[tokio::test]
async fn test_deleting_a_clip_leaves_reel_dangling() {
    let h = Harness::new();
    let a = h.clip(0.0, 4.0).await;
    let b = h.clip(4.0, 8.0).await;
    let reel = h
        .reels()
        .create(&[a.clip_id.clone(), b.clip_id.clone()])
        .await
        .unwrap();

    h.clips().delete(&a.clip_id).await.unwrap();

    assert!(reel.output_path.exists());
    assert_eq!(h.reels().dangling_clips(&reel.reel_id).unwrap(), vec![a.clip_id]);
}

#[tokio::test]
async fn test_delete_reel() {
    let h = Harness::new();
    let a = h.clip(0.0, 4.0).await;
    let reel = h.reels().create(&[a.clip_id.clone()]).await.unwrap();

    h.reels().delete(&reel.reel_id).await.unwrap();

    assert!(!reel.output_path.exists());
    assert!(a.output_path.exists());
    let err = h.reels().get_path(&reel.reel_id).unwrap_err();
    assert_eq!(err.to_string(), format!("Reel {} not found", reel.reel_id));
}

#[tokio::test]
async fn test_registry_state_round_trip() {
    let h = Harness::new();
    let a = h.clip(0.0, 4.0).await;
    let reel = h.reels().create(&[a.clip_id.clone()]).await.unwrap();
    let state = h.root.path().join("registry.json");

    h.container.save_state(&state).await.unwrap();
    let fresh = Harness::new();
    fresh.container.load_state(&state).await.unwrap();

    assert_eq!(fresh.clips().get(&a.clip_id).unwrap(), a);
    assert_eq!(fresh.reels().get(&reel.reel_id).unwrap(), reel);
}
