//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;

use crate::domain::model::{Score, ScoreboardSpec, Segment, TimeSpec};

/// Arguments for the probe command
#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the validate command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Input video files; every file is compared against the first
    #[arg(short, long = "input", required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,
}

/// Arguments for the extract command
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: PathBuf,

    /// Start time (seconds, MM:SS.ms, or HH:MM:SS.ms)
    #[arg(short, long, value_parser = parse_time)]
    pub start: f64,

    /// End time (seconds, MM:SS.ms, or HH:MM:SS.ms)
    #[arg(short, long, value_parser = parse_time)]
    pub end: f64,

    /// Output file path
    #[arg(short, long)]
    pub output: PathBuf,
}

/// Arguments for the concat command
#[derive(Args, Debug)]
pub struct ConcatArgs {
    /// Input files, joined in the given order
    #[arg(short, long = "input", required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,

    /// Output file path
    #[arg(short, long)]
    pub output: PathBuf,
}

/// Arguments for the clip command
#[derive(Args, Debug)]
pub struct ClipArgs {
    /// Camera file as ID=PATH, e.g. C1=/footage/cam1.mp4
    #[arg(long = "camera", required = true, value_parser = parse_camera)]
    pub cameras: Vec<(String, PathBuf)>,

    /// Segment as CAMERA,START,END, e.g. C1,10.0,15.0
    #[arg(long = "segment", required = true, value_parser = parse_segment)]
    pub segments: Vec<Segment>,

    /// Check stream compatibility of the referenced cameras first
    #[arg(long)]
    pub validate: bool,

    /// Scoreboard name for the first team
    #[arg(long, requires = "team_b", requires = "score_before", requires = "score_after")]
    pub team_a: Option<String>,

    /// Scoreboard name for the second team
    #[arg(long, requires = "team_a")]
    pub team_b: Option<String>,

    /// Score shown up to the goal, as A-B
    #[arg(long, value_parser = parse_score, requires = "team_a")]
    pub score_before: Option<Score>,

    /// Score shown after the goal, as A-B
    #[arg(long, value_parser = parse_score, requires = "team_a")]
    pub score_after: Option<Score>,

    /// Goal instant within the clip (defaults to the midpoint)
    #[arg(long, value_parser = parse_time, requires = "team_a")]
    pub goal_time: Option<f64>,
}

impl ClipArgs {
    /// Scoreboard overlay requested by the team/score flags, if any
    pub fn scoreboard(&self) -> Option<ScoreboardSpec> {
        match (&self.team_a, &self.team_b, self.score_before, self.score_after) {
            (Some(team_a), Some(team_b), Some(before), Some(after)) => Some(ScoreboardSpec {
                team_a: team_a.clone(),
                team_b: team_b.clone(),
                before,
                after,
                goal_time_s: self.goal_time,
            }),
            _ => None,
        }
    }
}

/// Arguments for the reel command
#[derive(Args, Debug)]
pub struct ReelArgs {
    /// Clip ids, joined in the given order
    #[arg(long = "clip", required = true, num_args = 1..)]
    pub clips: Vec<String>,
}

/// Arguments for the list command
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the delete-clip and delete-reel commands
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Identifier to delete
    pub id: String,
}

fn parse_time(value: &str) -> Result<f64, String> {
    TimeSpec::parse(value)
        .map(|t| t.seconds)
        .map_err(|e| e.to_string())
}

fn parse_score(value: &str) -> Result<Score, String> {
    Score::parse(value).map_err(|e| e.to_string())
}

fn parse_camera(value: &str) -> Result<(String, PathBuf), String> {
    match value.split_once('=') {
        Some((id, path)) if !id.trim().is_empty() && !path.trim().is_empty() => {
            Ok((id.trim().to_string(), PathBuf::from(path.trim())))
        }
        _ => Err(format!("expected ID=PATH, got '{}'", value)),
    }
}

fn parse_segment(value: &str) -> Result<Segment, String> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    match parts.as_slice() {
        [camera, start, end] if !camera.is_empty() => {
            Ok(Segment::new(*camera, parse_time(start)?, parse_time(end)?))
        }
        _ => Err(format!("expected CAMERA,START,END, got '{}'", value)),
    }
}
