use super::*;
use crate::adapters::mock_tools::OVERLAY_MARKER;
use crate::adapters::{AppConfig, ScriptedExecAdapter};
use crate::app::{AppContainer, DefaultAppContainer};
use tempfile::TempDir;

struct Harness {
    root: TempDir,
    tools: Arc<ScriptedExecAdapter>,
    container: DefaultAppContainer,
    cameras: HashMap<String, PathBuf>,
}

impl Harness {
    fn new(tools: ScriptedExecAdapter) -> Self {
        let root = TempDir::new().unwrap();
        let scratch = root.path().join("tmp");
        std::fs::create_dir_all(&scratch).unwrap();

        let mut cameras = HashMap::new();
        for cam in ["C1", "C2"] {
            let path = root.path().join(format!("{}.mp4", cam.to_lowercase()));
            std::fs::write(&path, format!("{} footage", cam)).unwrap();
            cameras.insert(cam.to_string(), path);
        }

        let config = AppConfig {
            output_dir: root.path().join("output"),
            temp_dir: Some(scratch),
            ..AppConfig::default()
        };
        let tools = Arc::new(tools);
        let container = DefaultAppContainer::with_executor(config, tools.clone());
        Self { root, tools, container, cameras }
    }

    fn manager(&self) -> Arc<ClipManager> {
        self.container.clip_manager()
    }

    fn files_in(&self, dir: &str) -> Vec<String> {
        match std::fs::read_dir(self.root.path().join(dir)) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect(),
            Err(_) => Vec::new(),
        }
    }
}

fn goal_segments() -> Vec<Segment> {
    vec![Segment::new("C1", 10.0, 15.0), Segment::new("C2", 15.0, 22.0)]
}

fn scoreboard() -> ScoreboardSpec {
    ScoreboardSpec {
        team_a: "Reds".into(),
        team_b: "Blues".into(),
        before: Score::new(1, 1),
        after: Score::new(2, 1),
        goal_time_s: Some(4.0),
    }
}

#[tokio::test]
async fn test_create_two_camera_clip() {
    let h = Harness::new(ScriptedExecAdapter::new());

    let clip = h.manager().create(&goal_segments(), &h.cameras, None).await.unwrap();

    assert!(clip.clip_id.starts_with("clip_"));
    assert_eq!(clip.duration_s, 12.0);
    assert_eq!(clip.segments, goal_segments());
    assert!(clip.filesize_bytes > 0);
    assert_eq!(std::fs::metadata(&clip.output_path).unwrap().len(), clip.filesize_bytes);
    assert_eq!(h.manager().get(&clip.clip_id).unwrap(), clip);
    assert_eq!(h.manager().get_path(&clip.clip_id).unwrap(), clip.output_path);
    assert!(h.files_in("tmp").is_empty());
}

#[tokio::test]
async fn test_duration_is_sum_of_requested_spans() {
    let h = Harness::new(ScriptedExecAdapter::new());
    let segments = vec![
        Segment::new("C1", 0.25, 1.5),
        Segment::new("C2", 3.0, 3.75),
        Segment::new("C1", 100.0, 102.5),
    ];

    let clip = h.manager().create(&segments, &h.cameras, None).await.unwrap();

    assert_eq!(clip.duration_s, 1.25 + 0.75 + 2.5);
}

#[tokio::test]
async fn test_backwards_segment_is_rejected_before_any_tool_runs() {
    let h = Harness::new(ScriptedExecAdapter::new());
    let segments = vec![Segment::new("C1", 1.0, 2.0), Segment::new("C2", 8.0, 8.0)];

    let err = h.manager().create(&segments, &h.cameras, None).await.unwrap_err();

    assert!(matches!(err, DomainError::Validation(ref m) if m.starts_with("Segment 1 (C2)")));
    assert!(h.tools.invocations().is_empty());
    assert!(h.manager().list().is_empty());
}

#[tokio::test]
async fn test_unknown_camera_is_rejected_before_extraction() {
    let h = Harness::new(ScriptedExecAdapter::new());
    let segments = vec![Segment::new("C1", 1.0, 2.0), Segment::new("C7", 3.0, 4.0)];

    let err = h.manager().create(&segments, &h.cameras, None).await.unwrap_err();

    assert!(err.is_bad_input());
    assert!(err.to_string().contains("camera C7 not found"));
    assert!(h.tools.invocations().is_empty());
}

#[tokio::test]
async fn test_empty_segment_list_is_rejected() {
    let h = Harness::new(ScriptedExecAdapter::new());
    let err = h.manager().create(&[], &h.cameras, None).await.unwrap_err();
    assert_eq!(err.to_string(), "Validation failed: No segments provided");
}

#[tokio::test]
async fn test_delete_removes_file_and_entry() {
    let h = Harness::new(ScriptedExecAdapter::new());
    let clip = h.manager().create(&goal_segments(), &h.cameras, None).await.unwrap();

    h.manager().delete(&clip.clip_id).await.unwrap();

    assert!(!clip.output_path.exists());
    assert!(matches!(
        h.manager().get(&clip.clip_id),
        Err(DomainError::NotFound { kind: "Clip", .. })
    ));
    assert!(matches!(
        h.manager().delete(&clip.clip_id).await,
        Err(DomainError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_delete_tolerates_missing_file() {
    let h = Harness::new(ScriptedExecAdapter::new());
    let clip = h.manager().create(&goal_segments(), &h.cameras, None).await.unwrap();
    std::fs::remove_file(&clip.output_path).unwrap();

    h.manager().delete(&clip.clip_id).await.unwrap();
    assert!(h.manager().list().is_empty());
}

#[tokio::test]
async fn test_scoreboard_overlay_replaces_intermediate() {
    let h = Harness::new(ScriptedExecAdapter::new());

    let clip = h
        .manager()
        .create(&goal_segments(), &h.cameras, Some(&scoreboard()))
        .await
        .unwrap();

    let bytes = std::fs::read(&clip.output_path).unwrap();
    assert!(bytes.ends_with(OVERLAY_MARKER));
    assert_eq!(h.files_in("output/clips"), vec![format!("{}.mp4", clip.clip_id)]);

    let overlay_call = h
        .tools
        .invocations()
        .into_iter()
        .find(|inv| inv.args.iter().any(|a| a == "-vf"))
        .unwrap();
    let graph = overlay_call.args.iter().find(|a| a.contains("drawtext")).unwrap();
    assert!(graph.contains("text=Reds 1 - 1 Blues"));
    assert!(graph.contains("text=Reds 2 - 1 Blues"));
    assert!(graph.contains("lte(t,4.000)"));
}

#[tokio::test]
async fn test_overlay_failure_is_fatal_and_leaves_nothing() {
    let h = Harness::new(ScriptedExecAdapter::new().failing_on("drawtext"));

    let err = h
        .manager()
        .create(&goal_segments(), &h.cameras, Some(&scoreboard()))
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::ToolInvocation { .. }));
    assert!(!err.is_bad_input());
    assert!(h.files_in("output/clips").is_empty());
    assert!(h.manager().list().is_empty());
}

#[tokio::test]
async fn test_concurrent_creates_do_not_interfere() {
    let h = Harness::new(ScriptedExecAdapter::new());
    let manager = h.manager();
    let first = vec![Segment::new("C1", 0.0, 3.0)];
    let second = vec![Segment::new("C2", 5.0, 6.0), Segment::new("C1", 7.0, 9.0)];

    let (a, b) = tokio::join!(
        manager.create(&first, &h.cameras, None),
        manager.create(&second, &h.cameras, None)
    );
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_ne!(a.clip_id, b.clip_id);
    assert_eq!(manager.get(&a.clip_id).unwrap().duration_s, 3.0);
    assert_eq!(manager.get(&b.clip_id).unwrap().duration_s, 3.0);
    assert_eq!(manager.get(&b.clip_id).unwrap().segments, second);
    assert_eq!(manager.list().len(), 2);
    assert!(h.files_in("tmp").is_empty());
}

#[tokio::test]
async fn test_snapshot_round_trip() {
    let h = Harness::new(ScriptedExecAdapter::new());
    let clip = h.manager().create(&goal_segments(), &h.cameras, None).await.unwrap();
    let snapshot_path = h.root.path().join("meta").join("clips.json");

    h.manager().save_snapshot(&snapshot_path).await.unwrap();

    let fresh = Harness::new(ScriptedExecAdapter::new());
    let loaded = fresh.manager().load_snapshot(&snapshot_path).await.unwrap();
    assert_eq!(loaded, 1);
    assert_eq!(fresh.manager().get(&clip.clip_id).unwrap(), clip);
}

#[tokio::test]
async fn test_missing_snapshot_loads_nothing() {
    let h = Harness::new(ScriptedExecAdapter::new());
    let loaded = h
        .manager()
        .load_snapshot(&h.root.path().join("absent.json"))
        .await
        .unwrap();
    assert_eq!(loaded, 0);
}
