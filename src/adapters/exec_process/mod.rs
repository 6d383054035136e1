//! Process execution adapter
//!
//! Runs external media tools through `tokio::process`, capturing stdout and
//! stderr, and enforcing the per-invocation timeout.

use std::process::Stdio;
use std::time::Instant;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::domain::errors::*;
use crate::ports::*;

/// Subprocess-based execution adapter
#[derive(Debug, Default, Clone)]
pub struct ProcessExecAdapter;

impl ProcessExecAdapter {
    /// Create new process adapter
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ExecutePort for ProcessExecAdapter {
    async fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput, DomainError> {
        let tool = invocation.tool_name();
        debug!(command = %invocation.command_line(), "Spawning {}", tool);

        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // The child is killed if the wait future is dropped on timeout
            .kill_on_drop(true);

        let started = Instant::now();
        let child = cmd.spawn().map_err(|e| DomainError::ToolInvocation {
            tool: tool.clone(),
            exit_code: -1,
            diagnostics: format!("failed to spawn: {}", e),
        })?;

        match tokio::time::timeout(invocation.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => Ok(ToolOutput {
                exit_code: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                elapsed: started.elapsed(),
                timed_out: false,
            }),
            Ok(Err(e)) => Err(DomainError::io(format!("waiting for {}", tool), e)),
            Err(_elapsed) => {
                warn!(
                    timeout_secs = invocation.timeout.as_secs(),
                    "{} timed out and was killed", tool
                );
                Ok(ToolOutput {
                    exit_code: None,
                    stdout: String::new(),
                    stderr: format!("timed out after {}s", invocation.timeout.as_secs()),
                    elapsed: started.elapsed(),
                    timed_out: true,
                })
            }
        }
    }
}
