//! reelcut CLI
//!
//! Builds highlight clips and reels from multi-camera footage with
//! lossless stream copy.
//!
//! # Usage
//!
//! ```bash
//! reelcut validate --input cam1.mp4 --input cam2.mp4
//! reelcut clip --camera C1=cam1.mp4 --camera C2=cam2.mp4 \
//!     --segment C1,10.0,15.0 --segment C2,15.0,22.0
//! reelcut reel --clip clip_0a1b2c3d4e5f --clip clip_5f4e3d2c1b0a
//! reelcut list
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use reelcut::adapters::tracing_log;
use reelcut::app::DefaultAppContainer;
use reelcut::cli::{commands, Cli};
use reelcut::config_initialization::{initialize_configuration_hierarchy, state_path};

/// Main entry point for the reelcut CLI application
#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    let config = initialize_configuration_hierarchy(&cli)?;
    tracing_log::init(&config.log_level, config.log_format).context("Failed to initialize logging")?;

    info!("Starting reelcut");
    let state = state_path(&cli, &config);
    let container = DefaultAppContainer::new(config);

    // Execute the requested command
    commands::execute(&container, cli.command, &state).await?;

    info!("reelcut completed successfully");
    Ok(())
}
