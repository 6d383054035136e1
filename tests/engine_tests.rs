use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use reelcut::adapters::ScriptedExecAdapter;
use reelcut::domain::model::{OutcomeFailure, SegmentSource};
use reelcut::engine::{Concatenator, EngineConfig, PipelineOrchestrator, SegmentExtractor};
use reelcut::ports::ExecutePort;
use reelcut::{AppConfig, AppContainer, DefaultAppContainer, DomainError};

/// Scratch area with a `tmp/` dir used as the engine's temp dir
struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("tmp")).unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn file(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn config(&self) -> EngineConfig {
        EngineConfig {
            temp_dir: self.path("tmp"),
            ..EngineConfig::default()
        }
    }

    fn temp_files(&self) -> usize {
        std::fs::read_dir(self.path("tmp")).unwrap().count()
    }
}

fn scripted(tools: ScriptedExecAdapter) -> (Arc<ScriptedExecAdapter>, Arc<dyn ExecutePort>) {
    let tools = Arc::new(tools);
    let port: Arc<dyn ExecutePort> = tools.clone();
    (tools, port)
}

#[tokio::test]
async fn test_extract_uses_two_stage_seek() {
    let ws = Workspace::new();
    let input = ws.file("cam.mp4", b"camera");
    let output = ws.path("cut.mp4");
    let (tools, port) = scripted(ScriptedExecAdapter::new());
    let extractor = SegmentExtractor::new(port, ws.config());

    let outcome = extractor.extract(&input, 10.0, 15.0, &output).await;

    assert!(outcome.success, "{}", outcome.diagnostics);
    assert_eq!(outcome.output_path.as_deref(), Some(output.as_path()));
    let args = &tools.invocations()[0].args;
    assert_eq!(args[..2], ["-ss", "8.500"]);
    assert_eq!(args[4..8], ["-ss", "1.500", "-t", "5.000"]);
    assert!(outcome.command.contains("-c copy -an -avoid_negative_ts make_zero -y"));
}

#[tokio::test]
async fn test_extract_near_start_clamps_coarse_seek() {
    let ws = Workspace::new();
    let input = ws.file("cam.mp4", b"camera");
    let (tools, port) = scripted(ScriptedExecAdapter::new());
    let extractor = SegmentExtractor::new(port, ws.config());

    let outcome = extractor.extract(&input, 0.5, 2.0, &ws.path("cut.mp4")).await;

    assert!(outcome.success);
    let args = &tools.invocations()[0].args;
    assert_eq!(args[1], "0.000");
    assert_eq!(args[5], "0.500");
    assert_eq!(args[7], "1.500");
}

#[tokio::test]
async fn test_extract_precondition_failures_never_invoke_tool() {
    let ws = Workspace::new();
    let input = ws.file("cam.mp4", b"camera");
    let (tools, port) = scripted(ScriptedExecAdapter::new());
    let extractor = SegmentExtractor::new(port, ws.config());

    let missing = extractor
        .extract(&ws.path("absent.mp4"), 1.0, 2.0, &ws.path("a.mp4"))
        .await;
    let backwards = extractor.extract(&input, 5.0, 5.0, &ws.path("b.mp4")).await;

    assert_eq!(missing.failure, Some(OutcomeFailure::InvalidInput));
    assert_eq!(backwards.failure, Some(OutcomeFailure::InvalidInput));
    assert!(tools.invocations().is_empty());
}

#[tokio::test]
async fn test_extract_timeout_is_a_failed_outcome() {
    let ws = Workspace::new();
    let input = ws.file("cam.mp4", b"camera");
    let output = ws.path("cut.mp4");
    let (_, port) = scripted(ScriptedExecAdapter::new().timing_out_on("-ss"));
    let extractor = SegmentExtractor::new(port, ws.config());

    let outcome = extractor.extract(&input, 1.0, 2.0, &output).await;

    assert_eq!(outcome.failure, Some(OutcomeFailure::TimedOut));
    assert!(!output.exists());
    assert!(matches!(
        outcome.into_result(),
        Err(DomainError::Timeout { seconds: 60, .. })
    ));
}

#[tokio::test]
async fn test_zero_byte_output_is_failure_and_removed() {
    let ws = Workspace::new();
    let input = ws.file("cam.mp4", b"camera");
    let output = ws.path("cut.mp4");
    let (_, port) = scripted(ScriptedExecAdapter::new().with_empty_outputs());
    let extractor = SegmentExtractor::new(port, ws.config());

    let outcome = extractor.extract(&input, 1.0, 2.0, &output).await;

    assert!(!outcome.success);
    assert_eq!(outcome.failure, Some(OutcomeFailure::EmptyOutput));
    assert!(!output.exists());
}

#[tokio::test]
async fn test_concat_single_input_is_a_byte_copy() {
    let ws = Workspace::new();
    let input = ws.file("only.mp4", b"\x00\x01payload\xff");
    let output = ws.path("joined.mp4");
    let (tools, port) = scripted(ScriptedExecAdapter::new());
    let concatenator = Concatenator::new(port, ws.config());

    let outcome = concatenator.concat(&[&input], &output).await;

    assert!(outcome.success);
    assert_eq!(outcome.elapsed, Duration::ZERO);
    assert!(outcome.command.starts_with("cp "));
    assert_eq!(std::fs::read(&output).unwrap(), std::fs::read(&input).unwrap());
    assert!(tools.invocations().is_empty());
}

#[tokio::test]
async fn test_concat_joins_in_order_and_removes_list_file() {
    let ws = Workspace::new();
    let inputs = vec![
        ws.file("a.mp4", b"first|"),
        ws.file("it's b.mp4", b"second|"),
        ws.file("c.mp4", b"third"),
    ];
    let output = ws.path("joined.mp4");
    let (tools, port) = scripted(ScriptedExecAdapter::new());
    let concatenator = Concatenator::new(port, ws.config());

    let outcome = concatenator.concat(&inputs, &output).await;

    assert!(outcome.success, "{}", outcome.diagnostics);
    assert_eq!(std::fs::read(&output).unwrap(), b"first|second|third");
    assert_eq!(outcome.file_size, 18);
    assert_eq!(tools.count_for("ffmpeg"), 1);
    assert!(outcome.command.contains("-f concat -safe 0"));
    assert!(outcome.command.contains("-fflags +genpts"));
    assert_eq!(ws.temp_files(), 0);
}

#[tokio::test]
async fn test_concat_list_file_removed_on_tool_failure() {
    let ws = Workspace::new();
    let inputs = vec![ws.file("a.mp4", b"a"), ws.file("b.mp4", b"b")];
    let output = ws.path("joined.mp4");
    let (_, port) = scripted(ScriptedExecAdapter::new().failing_on("concat"));
    let concatenator = Concatenator::new(port, ws.config());

    let outcome = concatenator.concat(&inputs, &output).await;

    assert_eq!(outcome.failure, Some(OutcomeFailure::ToolFailed));
    assert_eq!(outcome.exit_code, 1);
    assert!(!output.exists());
    assert_eq!(ws.temp_files(), 0);
}

#[tokio::test]
async fn test_concat_rejects_first_bad_input() {
    let ws = Workspace::new();
    let inputs = vec![
        ws.file("a.mp4", b"a"),
        ws.file("empty.mp4", b""),
        ws.path("missing.mp4"),
    ];
    let (tools, port) = scripted(ScriptedExecAdapter::new());
    let concatenator = Concatenator::new(port, ws.config());

    let outcome = concatenator.concat(&inputs, &ws.path("joined.mp4")).await;

    assert_eq!(outcome.failure, Some(OutcomeFailure::InvalidInput));
    assert!(outcome.diagnostics.starts_with("Input 1:"));
    assert!(outcome.diagnostics.contains("empty"));
    assert!(tools.invocations().is_empty());
}

#[tokio::test]
async fn test_pipeline_failure_leaves_no_temporaries() {
    let ws = Workspace::new();
    let a = ws.file("a.mp4", b"a");
    let b = ws.file("b.mp4", b"b");
    let output = ws.path("clip.mp4");
    let (tools, port) = scripted(ScriptedExecAdapter::new().failing_on("b.mp4"));
    let pipeline = PipelineOrchestrator::new(port, ws.config());

    let segments = vec![
        SegmentSource::new(&a, 0.0, 1.0),
        SegmentSource::new(&b, 0.0, 1.0),
        SegmentSource::new(&a, 2.0, 3.0),
    ];
    let err = pipeline.build_from_segments(&segments, &output).await.unwrap_err();

    assert!(matches!(err, DomainError::SegmentFailed { index: 1, .. }));
    assert!(!output.exists());
    assert_eq!(ws.temp_files(), 0);
    assert_eq!(tools.invocations().len(), 2);
}

#[tokio::test]
async fn test_pipeline_outcome_describes_whole_build() {
    let ws = Workspace::new();
    let a = ws.file("a.mp4", b"a");
    let output = ws.path("clip.mp4");
    let (_, port) = scripted(ScriptedExecAdapter::new());
    let pipeline = PipelineOrchestrator::new(port, ws.config());

    let segments = vec![SegmentSource::new(&a, 0.0, 1.0), SegmentSource::new(&a, 4.0, 6.0)];
    let outcome = pipeline.build_from_segments(&segments, &output).await.unwrap();

    assert_eq!(outcome.command, "extract(2) + concat");
    assert!(outcome.diagnostics.is_empty());
    assert_eq!(outcome.file_size, std::fs::metadata(&output).unwrap().len());
    assert_eq!(ws.temp_files(), 0);
}

// Real tool runs; skipped when ffmpeg/ffprobe are not installed

fn media_tools_available() -> bool {
    ["ffmpeg", "ffprobe"].iter().all(|tool| {
        Command::new(tool)
            .arg("-version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    })
}

fn render_test_source(path: &Path, size: &str, seconds: u32) {
    let status = Command::new("ffmpeg")
        .args(["-v", "error", "-f", "lavfi", "-i"])
        .arg(format!("testsrc=duration={}:size={}:rate=30", seconds, size))
        .args(["-c:v", "libx264", "-pix_fmt", "yuv420p", "-g", "30", "-y"])
        .arg(path)
        .status()
        .unwrap();
    assert!(status.success(), "failed to render {}", path.display());
}

#[tokio::test]
async fn test_real_extract_and_concat() {
    if !media_tools_available() {
        eprintln!("ffmpeg not available, skipping");
        return;
    }
    let ws = Workspace::new();
    let source = ws.path("source.mp4");
    render_test_source(&source, "320x240", 20);

    let config = AppConfig {
        output_dir: ws.path("output"),
        temp_dir: Some(ws.path("tmp")),
        ..AppConfig::default()
    };
    let container = DefaultAppContainer::new(config);

    let first = ws.path("first.mp4");
    let second = ws.path("second.mp4");
    let a = container.extractor().extract(&source, 10.0, 15.0, &first).await;
    let b = container.extractor().extract(&source, 2.0, 4.0, &second).await;
    assert!(a.success, "{}", a.diagnostics);
    assert!(b.success, "{}", b.diagnostics);

    let joined = ws.path("joined.mp4");
    let outcome = container.concatenator().concat(&[&first, &second], &joined).await;
    assert!(outcome.success, "{}", outcome.diagnostics);
    assert!(outcome.file_size > 0);

    let stream = container.validator().describe(&joined).await.unwrap();
    assert_eq!(stream.codec, "h264");
    assert_eq!((stream.width, stream.height), (320, 240));
    assert_eq!(ws.temp_files(), 0);
}

#[tokio::test]
async fn test_real_validation_detects_resolution_mismatch() {
    if !media_tools_available() {
        eprintln!("ffmpeg not available, skipping");
        return;
    }
    let ws = Workspace::new();
    let c1 = ws.path("c1.mp4");
    let c2 = ws.path("c2.mp4");
    let c3 = ws.path("c3.mp4");
    render_test_source(&c1, "320x240", 2);
    render_test_source(&c2, "320x240", 2);
    render_test_source(&c3, "160x240", 2);

    let container = DefaultAppContainer::new(AppConfig::default());
    let validator = container.validator();

    let same = validator.validate(&[&c1, &c2]).await.unwrap();
    assert!(same.compatible);

    let mixed = validator.validate(&[&c1, &c2, &c3]).await.unwrap();
    assert!(!mixed.compatible);
    let reason = mixed.reason.unwrap();
    assert!(reason.starts_with("Video 2"));
    assert!(reason.contains("resolution"));
}
