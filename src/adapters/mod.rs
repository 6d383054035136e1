// Adapters - External system implementations

pub mod exec_process;
pub mod memory_registry;
pub mod mock_tools;
pub mod probe_ffprobe;
pub mod toml_config;
pub mod tracing_log;

// Re-export adapters
pub use exec_process::ProcessExecAdapter;
pub use memory_registry::InMemoryRegistry;
pub use mock_tools::ScriptedExecAdapter;
pub use probe_ffprobe::FFprobeAdapter;
pub use toml_config::AppConfig;
pub use tracing_log::LogFormat;
