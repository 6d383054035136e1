//! reelcut library
//!
//! Multi-camera highlight clips and reels built on ffmpeg stream copy:
//! stream probing and compatibility checks, two-stage precise segment
//! extraction, list-file concatenation, and in-memory clip and reel
//! registries.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod engine;
pub mod output;
pub mod ports;
pub mod probe;
pub mod utils;

// Re-export commonly used types
pub use adapters::AppConfig;
pub use app::{AppContainer, ClipManager, DefaultAppContainer, ReelManager};
pub use domain::errors::DomainError;
pub use domain::model::{Clip, OperationOutcome, Reel, ScoreboardSpec, Segment, VideoStreamInfo};
