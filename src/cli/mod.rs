//! CLI module for reelcut
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::adapters::LogFormat;

pub mod args;
pub mod commands;

/// reelcut - multi-camera highlight clips and reels
///
/// Segments are cut and joined with lossless stream copy. Only the optional
/// scoreboard overlay re-encodes.
#[derive(Parser, Debug)]
#[command(name = "reelcut")]
#[command(about = "Build highlight clips and reels from multi-camera footage")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Config file (default: ./reelcut.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Logging level or filter directive
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(long, value_enum, global = true)]
    pub log_format: Option<LogFormat>,

    /// Output root for clips and reels
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Registry snapshot file (default: <output_dir>/registry.json)
    #[arg(long, global = true)]
    pub state: Option<PathBuf>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Describe the primary video stream of a file
    Probe(args::ProbeArgs),
    /// Check whether files can be joined by stream copy
    Validate(args::ValidateArgs),
    /// Cut one time window out of a file
    Extract(args::ExtractArgs),
    /// Join files in order
    Concat(args::ConcatArgs),
    /// Build and register a clip from camera segments
    Clip(args::ClipArgs),
    /// Build and register a reel from existing clips
    Reel(args::ReelArgs),
    /// List registered clips and reels
    List(args::ListArgs),
    /// Delete a clip and its file
    DeleteClip(args::DeleteArgs),
    /// Delete a reel and its file
    DeleteReel(args::DeleteArgs),
}

impl Commands {
    /// Whether the command changes the clip or reel registry
    pub fn mutates_registry(&self) -> bool {
        matches!(
            self,
            Commands::Clip(_) | Commands::Reel(_) | Commands::DeleteClip(_) | Commands::DeleteReel(_)
        )
    }

    /// Whether the command reads the clip or reel registry
    pub fn uses_registry(&self) -> bool {
        self.mutates_registry() || matches!(self, Commands::List(_))
    }
}
