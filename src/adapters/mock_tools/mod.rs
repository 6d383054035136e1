//! Scripted media tools
//!
//! An [`ExecutePort`] that never spawns a process. It records every
//! invocation and fabricates plausible outputs so the pipeline can be
//! exercised on machines without ffmpeg:
//!
//! - ffprobe answers from canned stream descriptions keyed by path
//! - concat invocations join the listed inputs byte for byte
//! - filter invocations (`-vf`) copy the input and append a marker
//! - any other ffmpeg invocation writes a small segment payload

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;

use crate::domain::errors::*;
use crate::domain::model::VideoStreamInfo;
use crate::ports::*;

/// Bytes appended to an overlay output
pub const OVERLAY_MARKER: &[u8] = b"[scoreboard]";

/// Recording, scriptable stand-in for ffmpeg and ffprobe
#[derive(Default)]
pub struct ScriptedExecAdapter {
    probes: HashMap<PathBuf, VideoStreamInfo>,
    fail_on: Option<String>,
    time_out_on: Option<String>,
    empty_outputs: bool,
    invocations: Mutex<Vec<ToolInvocation>>,
}

impl ScriptedExecAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer probes of `path` with `info`
    pub fn with_probe(mut self, path: impl Into<PathBuf>, info: VideoStreamInfo) -> Self {
        self.probes.insert(path.into(), info);
        self
    }

    /// Exit with code 1 when the command line contains `needle`
    pub fn failing_on(mut self, needle: impl Into<String>) -> Self {
        self.fail_on = Some(needle.into());
        self
    }

    /// Report a timeout when the command line contains `needle`
    pub fn timing_out_on(mut self, needle: impl Into<String>) -> Self {
        self.time_out_on = Some(needle.into());
        self
    }

    /// Succeed but leave zero-byte outputs behind
    pub fn with_empty_outputs(mut self) -> Self {
        self.empty_outputs = true;
        self
    }

    /// Every invocation seen so far, in order
    pub fn invocations(&self) -> Vec<ToolInvocation> {
        self.invocations.lock().clone()
    }

    /// Number of invocations of the named program
    pub fn count_for(&self, tool: &str) -> usize {
        self.invocations
            .lock()
            .iter()
            .filter(|inv| inv.tool_name() == tool)
            .count()
    }

    fn probe_output(&self, invocation: &ToolInvocation) -> ToolOutput {
        let path = invocation.args.last().map(PathBuf::from).unwrap_or_default();
        match self.probes.get(&path) {
            Some(info) => ToolOutput {
                exit_code: Some(0),
                stdout: probe_json(info),
                ..ToolOutput::default()
            },
            None => failure(format!("{}: No such file or directory", path.display())),
        }
    }

    async fn ffmpeg_output(&self, invocation: &ToolInvocation) -> Result<ToolOutput, DomainError> {
        let args = &invocation.args;
        let output = match args.last() {
            Some(last) => PathBuf::from(last),
            None => return Ok(failure("no output file given".to_string())),
        };

        let payload = if self.empty_outputs {
            Vec::new()
        } else if flag_value(args, "-f") == Some("concat") {
            let list = flag_value(args, "-i").unwrap_or_default();
            match concat_payload(Path::new(list)).await {
                Ok(bytes) => bytes,
                Err(message) => return Ok(failure(message)),
            }
        } else if args.iter().any(|a| a == "-vf") {
            let input = flag_value(args, "-i").unwrap_or_default();
            match tokio::fs::read(input).await {
                Ok(mut bytes) => {
                    bytes.extend_from_slice(OVERLAY_MARKER);
                    bytes
                }
                Err(e) => return Ok(failure(format!("{}: {}", input, e))),
            }
        } else {
            let input = flag_value(args, "-i").unwrap_or_default();
            if !Path::new(input).exists() {
                return Ok(failure(format!("{}: No such file or directory", input)));
            }
            format!(
                "segment {} +{} for {}\n",
                input,
                last_flag_value(args, "-ss").unwrap_or("0"),
                flag_value(args, "-t").unwrap_or("0")
            )
            .into_bytes()
        };

        tokio::fs::write(&output, payload)
            .await
            .map_err(|e| DomainError::io(format!("writing {}", output.display()), e))?;

        Ok(ToolOutput {
            exit_code: Some(0),
            ..ToolOutput::default()
        })
    }
}

#[async_trait]
impl ExecutePort for ScriptedExecAdapter {
    async fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput, DomainError> {
        self.invocations.lock().push(invocation.clone());
        let command = invocation.command_line();

        if let Some(needle) = &self.time_out_on {
            if command.contains(needle.as_str()) {
                return Ok(ToolOutput {
                    exit_code: None,
                    stderr: format!("timed out after {}s", invocation.timeout.as_secs()),
                    elapsed: invocation.timeout,
                    timed_out: true,
                    ..ToolOutput::default()
                });
            }
        }
        if let Some(needle) = &self.fail_on {
            if command.contains(needle.as_str()) {
                return Ok(failure(format!("scripted failure for '{}'", needle)));
            }
        }

        let mut output = if invocation.tool_name().contains("ffprobe") {
            self.probe_output(invocation)
        } else {
            self.ffmpeg_output(invocation).await?
        };
        output.elapsed = Duration::from_millis(5);
        Ok(output)
    }
}

fn failure(stderr: String) -> ToolOutput {
    ToolOutput {
        exit_code: Some(1),
        stderr,
        ..ToolOutput::default()
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn last_flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .rposition(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

async fn concat_payload(list: &Path) -> Result<Vec<u8>, String> {
    let text = tokio::fs::read_to_string(list)
        .await
        .map_err(|e| format!("{}: {}", list.display(), e))?;

    let mut joined = Vec::new();
    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        let quoted = line
            .trim()
            .strip_prefix("file '")
            .and_then(|rest| rest.strip_suffix('\''))
            .ok_or_else(|| format!("malformed list line: {}", line))?;
        let path = quoted.replace("'\\''", "'");
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| format!("{}: {}", path, e))?;
        joined.extend_from_slice(&bytes);
    }
    Ok(joined)
}

fn probe_json(info: &VideoStreamInfo) -> String {
    json!({
        "programs": [],
        "streams": [{
            "codec_name": info.codec,
            "profile": info.profile,
            "level": info.level,
            "width": info.width,
            "height": info.height,
            "pix_fmt": info.pixel_format,
            "r_frame_rate": info.frame_rate,
            "avg_frame_rate": info.avg_frame_rate,
            "duration": format!("{:.6}", info.duration),
            "nb_frames": info.frame_count.to_string(),
            "time_base": info.time_base,
            "color_range": info.color_range,
            "sample_aspect_ratio": info.sample_aspect_ratio,
        }]
    })
    .to_string()
}
