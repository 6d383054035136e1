//! Command implementations

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::app::{AppContainer, DefaultAppContainer};
use crate::cli::args::*;
use crate::cli::Commands;
use crate::domain::model::{OperationOutcome, VideoStreamInfo};
use crate::probe::validator::distinct_paths;
use crate::utils::{format_duration, format_file_size};

/// Run one command, loading the registry snapshot first and saving it
/// afterwards when the command changed it
pub async fn execute(container: &DefaultAppContainer, command: Commands, state: &Path) -> Result<()> {
    if command.uses_registry() {
        container
            .load_state(state)
            .await
            .with_context(|| format!("Failed to load registry from {}", state.display()))?;
    }
    let mutates = command.mutates_registry();

    match command {
        Commands::Probe(args) => probe(container, args).await?,
        Commands::Validate(args) => validate(container, args).await?,
        Commands::Extract(args) => extract(container, args).await?,
        Commands::Concat(args) => concat(container, args).await?,
        Commands::Clip(args) => clip(container, args).await?,
        Commands::Reel(args) => reel(container, args).await?,
        Commands::List(args) => list(container, args)?,
        Commands::DeleteClip(args) => delete_clip(container, args).await?,
        Commands::DeleteReel(args) => delete_reel(container, args).await?,
    }

    if mutates {
        container
            .save_state(state)
            .await
            .with_context(|| format!("Failed to save registry to {}", state.display()))?;
    }
    Ok(())
}

/// Execute the probe command
pub async fn probe(container: &impl AppContainer, args: ProbeArgs) -> Result<()> {
    info!("Input: {}", args.input.display());

    let stream = container
        .validator()
        .describe(&args.input)
        .await
        .context("Failed to inspect input file")?;

    if args.json {
        print_json(&stream)?;
    } else {
        display_stream_info(&args.input, &stream);
    }
    Ok(())
}

/// Execute the validate command; incompatible inputs are an error
pub async fn validate(container: &impl AppContainer, args: ValidateArgs) -> Result<()> {
    let report = container
        .validator()
        .validate(&args.inputs)
        .await
        .context("Failed to probe inputs")?;

    print_json(&report)?;
    match report.reason {
        Some(reason) if !report.compatible => {
            error!("Inputs cannot be joined by stream copy: {}", reason);
            Err(anyhow::anyhow!("Incompatible inputs: {}", reason))
        }
        _ => {
            info!("{} inputs are stream-copy compatible", args.inputs.len());
            Ok(())
        }
    }
}

/// Execute the extract command
pub async fn extract(container: &DefaultAppContainer, args: ExtractArgs) -> Result<()> {
    info!(
        "Extracting {:.3}s-{:.3}s from {}",
        args.start,
        args.end,
        args.input.display()
    );

    let outcome = container
        .extractor()
        .extract(&args.input, args.start, args.end, &args.output)
        .await
        .into_result()
        .context("Extraction failed")?;

    display_outcome(&outcome);
    Ok(())
}

/// Execute the concat command
pub async fn concat(container: &DefaultAppContainer, args: ConcatArgs) -> Result<()> {
    info!("Joining {} inputs into {}", args.inputs.len(), args.output.display());

    let outcome = container
        .concatenator()
        .concat(&args.inputs, &args.output)
        .await
        .into_result()
        .context("Concatenation failed")?;

    display_outcome(&outcome);
    Ok(())
}

/// Execute the clip command
pub async fn clip(container: &impl AppContainer, args: ClipArgs) -> Result<()> {
    let cameras: HashMap<String, PathBuf> = args.cameras.iter().cloned().collect();

    if args.validate {
        let referenced = distinct_paths(
            args.segments
                .iter()
                .filter_map(|segment| cameras.get(&segment.camera_id).cloned()),
        );
        container
            .validator()
            .ensure_compatible(&referenced)
            .await
            .context("Camera compatibility check failed")?;
    }

    let scoreboard = args.scoreboard();
    let clip = container
        .clip_manager()
        .create(&args.segments, &cameras, scoreboard.as_ref())
        .await
        .context("Failed to create clip")?;

    print_json(&clip)?;
    Ok(())
}

/// Execute the reel command
pub async fn reel(container: &impl AppContainer, args: ReelArgs) -> Result<()> {
    let reel = container
        .reel_manager()
        .create(&args.clips)
        .await
        .context("Failed to create reel")?;

    print_json(&reel)?;
    Ok(())
}

#[derive(Serialize)]
struct Listing<C, R> {
    clips: Vec<C>,
    reels: Vec<R>,
}

/// Execute the list command
pub fn list(container: &impl AppContainer, args: ListArgs) -> Result<()> {
    let mut clips = container.clip_manager().list();
    let mut reels = container.reel_manager().list();
    clips.sort_by_key(|clip| clip.created_at);
    reels.sort_by_key(|reel| reel.created_at);

    if args.json {
        return print_json(&Listing { clips, reels });
    }

    println!("Clips ({})", clips.len());
    for clip in &clips {
        println!(
            "  {}  {:>8.2}s  {:>10}  {}",
            clip.clip_id,
            clip.duration_s,
            format_file_size(clip.filesize_bytes),
            clip.output_path.display()
        );
    }
    println!("Reels ({})", reels.len());
    let reel_manager = container.reel_manager();
    for reel in &reels {
        println!(
            "  {}  {:>8.2}s  {:>10}  {}",
            reel.reel_id,
            reel.duration_s,
            format_file_size(reel.filesize_bytes),
            reel.clip_ids.join(",")
        );
        let dangling = reel_manager.dangling_clips(&reel.reel_id)?;
        if !dangling.is_empty() {
            warn!(reel_id = %reel.reel_id, "References deleted clips: {}", dangling.join(","));
        }
    }
    Ok(())
}

/// Execute the delete-clip command
pub async fn delete_clip(container: &impl AppContainer, args: DeleteArgs) -> Result<()> {
    container
        .clip_manager()
        .delete(&args.id)
        .await
        .with_context(|| format!("Failed to delete clip {}", args.id))?;
    println!("Deleted clip {}", args.id);
    Ok(())
}

/// Execute the delete-reel command
pub async fn delete_reel(container: &impl AppContainer, args: DeleteArgs) -> Result<()> {
    container
        .reel_manager()
        .delete(&args.id)
        .await
        .with_context(|| format!("Failed to delete reel {}", args.id))?;
    println!("Deleted reel {}", args.id);
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output to JSON")?;
    println!("{}", json);
    Ok(())
}

/// Display stream information in human-readable format
fn display_stream_info(path: &Path, stream: &VideoStreamInfo) {
    println!("Video Stream");
    println!("============");
    println!("File: {}", path.display());
    println!("Codec: {} ({}, level {})", stream.codec, stream.profile, stream.level);
    println!("Resolution: {}", stream.resolution());
    println!("Pixel Format: {}", stream.pixel_format);
    println!(
        "Frame Rate: {} (avg {})",
        stream.frame_rate, stream.avg_frame_rate
    );
    println!("Duration: {:.3}s", stream.duration);
    println!("Frames: {}", stream.frame_count);
    println!("Time Base: {}", stream.time_base);
    println!("Color Range: {}", stream.color_range);
    println!("Sample Aspect Ratio: {}", stream.sample_aspect_ratio);
}

/// Display a finished operation in human-readable format
fn display_outcome(outcome: &OperationOutcome) {
    println!("Output: {}", outcome.target.display());
    println!("Size: {}", format_file_size(outcome.file_size));
    println!("Elapsed: {}", format_duration(outcome.elapsed));
    println!("Throughput: {:.2} Mbit/s", outcome.throughput_mbps);
    println!("Command: {}", outcome.command);
}
