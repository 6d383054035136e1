//! Scoreboard overlay
//!
//! The one step that re-encodes: two `drawtext` clauses share a single
//! crossover instant, the first showing the score before the goal and the
//! second the score after it.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::domain::model::{OperationOutcome, ScoreboardSpec};
use crate::domain::rules::OverlayRules;
use crate::engine::{run_verified, EngineConfig, OverlayStyle};
use crate::ports::{ExecutePort, ToolInvocation};

/// Burns a timed scoreboard into a clip
pub struct ScoreboardOverlay {
    executor: Arc<dyn ExecutePort>,
    config: EngineConfig,
}

impl ScoreboardOverlay {
    pub fn new(executor: Arc<dyn ExecutePort>, config: EngineConfig) -> Self {
        Self { executor, config }
    }

    /// Render `input` with the scoreboard into `output`
    pub async fn apply(
        &self,
        input: &Path,
        spec: &ScoreboardSpec,
        total_duration_s: f64,
        output: &Path,
    ) -> OperationOutcome {
        let goal_time = OverlayRules::goal_time(spec.goal_time_s, total_duration_s);
        let graph = filter_graph(spec, goal_time, &self.config.overlay);
        let invocation = self.invocation(input, &graph, output);

        let outcome = run_verified(self.executor.as_ref(), &invocation, output).await;
        info!(
            goal_time,
            success = outcome.success,
            elapsed_ms = outcome.elapsed.as_millis() as u64,
            bytes = outcome.file_size,
            "Scoreboard overlay: {} -> {}",
            spec.label(spec.before),
            spec.label(spec.after)
        );
        outcome
    }

    /// `ffmpeg -i <pre> -vf <graph> -c:v <enc> -preset <p> -crf <q> -an -y <out>`
    pub fn invocation(&self, input: &Path, graph: &str, output: &Path) -> ToolInvocation {
        let style = &self.config.overlay;
        ToolInvocation::new(&self.config.ffmpeg_bin, self.config.overlay_timeout)
            .arg("-i")
            .path_arg(input)
            .arg("-vf")
            .arg(graph)
            .arg("-c:v")
            .arg(style.encoder.as_str())
            .arg("-preset")
            .arg(style.preset.as_str())
            .arg("-crf")
            .arg(style.crf.to_string())
            .args(["-an", "-y"])
            .path_arg(output)
    }
}

/// Two mutually exclusive drawtext clauses switching at `goal_time`
pub fn filter_graph(spec: &ScoreboardSpec, goal_time: f64, style: &OverlayStyle) -> String {
    let before = drawtext(&spec.label(spec.before), style, &format!("lte(t,{:.3})", goal_time));
    let after = drawtext(&spec.label(spec.after), style, &format!("gt(t,{:.3})", goal_time));
    format!("{},{}", before, after)
}

fn drawtext(text: &str, style: &OverlayStyle, enable: &str) -> String {
    let font = style
        .font_file
        .as_ref()
        .map(|f| format!("fontfile={}:", OverlayRules::escape_option(&f.to_string_lossy())))
        .unwrap_or_default();
    format!(
        "drawtext={}text={}:fontsize={}:fontcolor=white:box=1:boxcolor=black@0.6:boxborderw=12:\
x=(w-text_w)/2:y=h/20:enable='{}'",
        font,
        OverlayRules::escape_text(text),
        style.font_size,
        enable
    )
}
