// Ports - Interface definitions (contracts)

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::errors::*;
use crate::domain::model::*;

/// Port for media metadata probing
#[async_trait]
pub trait ProbePort: Send + Sync {
    /// Describe the first video stream of `file_path`.
    ///
    /// Never cached: source files are transient, so every call probes afresh.
    async fn probe(&self, file_path: &Path) -> Result<VideoStreamInfo, DomainError>;
}

/// One external tool invocation
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub timeout: Duration,
}

impl ToolInvocation {
    /// Create a new invocation for the given program
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout,
        }
    }

    /// Append a single argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append a path argument
    pub fn path_arg(self, path: &Path) -> Self {
        let arg = path.to_string_lossy().into_owned();
        self.arg(arg)
    }

    /// Append multiple arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Program file name, for messages
    pub fn tool_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.program.to_string_lossy().into_owned())
    }

    /// The exact command line, for diagnostics
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.to_string_lossy().into_owned())
            .chain(self.args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Captured result of a finished (or killed) tool process
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    /// Exit code; `None` when the process was killed
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
    pub timed_out: bool,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }
}

/// Port for running external media tools
#[async_trait]
pub trait ExecutePort: Send + Sync {
    /// Run the invocation to completion or timeout.
    ///
    /// A non-zero exit or a timeout is reported in [`ToolOutput`]; only a
    /// failure to start the process is an `Err`.
    async fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput, DomainError>;
}

/// Port for an identifier-keyed registry of entities
///
/// Implementations must be safe for concurrent create/delete from
/// multiple requests.
pub trait Repository<T: Identified + Clone>: Send + Sync {
    /// Store an entity under its identifier
    fn insert(&self, entity: T);

    /// Look up an entity
    fn get(&self, id: &str) -> Result<T, DomainError>;

    /// Remove and return an entity
    fn remove(&self, id: &str) -> Result<T, DomainError>;

    /// Snapshot of all entities; order carries no meaning
    fn list(&self) -> Vec<T>;

    /// True when the identifier is registered
    fn contains(&self, id: &str) -> bool {
        self.get(id).is_ok()
    }
}
