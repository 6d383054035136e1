// Domain models - Core types and data structures

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

/// Time specification with precision - represents time in seconds with fractional precision
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct TimeSpec {
    pub seconds: f64,
}

impl TimeSpec {
    /// Create a new TimeSpec from seconds
    pub fn from_seconds(seconds: f64) -> Self {
        Self { seconds }
    }

    /// Parse time string in various formats
    pub fn parse(time_str: &str) -> Result<Self, DomainError> {
        let trimmed = time_str.trim();

        // Plain seconds
        if let Ok(seconds) = trimmed.parse::<f64>() {
            if !seconds.is_finite() || seconds < 0.0 {
                return Err(DomainError::Validation(format!(
                    "Time must be a non-negative number of seconds: {}",
                    time_str
                )));
            }
            return Ok(Self::from_seconds(seconds));
        }

        let parts: Vec<&str> = trimmed.split(':').collect();
        let invalid = |what: &str| DomainError::Validation(format!("Invalid {} in '{}'", what, time_str));

        match parts.as_slice() {
            [minutes, seconds] => {
                let minutes = minutes.parse::<u32>().map_err(|_| invalid("minutes"))?;
                let seconds = seconds.parse::<f64>().map_err(|_| invalid("seconds"))?;
                if !(0.0..60.0).contains(&seconds) {
                    return Err(invalid("seconds"));
                }
                Ok(Self::from_seconds(minutes as f64 * 60.0 + seconds))
            }
            [hours, minutes, seconds] => {
                let hours = hours.parse::<u32>().map_err(|_| invalid("hours"))?;
                let minutes = minutes.parse::<u32>().map_err(|_| invalid("minutes"))?;
                let seconds = seconds.parse::<f64>().map_err(|_| invalid("seconds"))?;
                if minutes >= 60 {
                    return Err(invalid("minutes"));
                }
                if !(0.0..60.0).contains(&seconds) {
                    return Err(invalid("seconds"));
                }
                Ok(Self::from_seconds(
                    hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds,
                ))
            }
            _ => Err(DomainError::Validation(format!(
                "Invalid time '{}'. Supported formats: seconds (12.5), MM:SS.ms (2:30.5), HH:MM:SS.ms (1:02:30.5)",
                time_str
            ))),
        }
    }

    /// Format as HH:MM:SS.ms
    pub fn format_hms(&self) -> String {
        let total_ms = (self.seconds * 1000.0).round() as u64;
        let hours = total_ms / 3_600_000;
        let minutes = (total_ms % 3_600_000) / 60_000;
        let seconds = (total_ms % 60_000) / 1000;
        let milliseconds = total_ms % 1000;

        if hours > 0 {
            format!("{}:{:02}:{:02}.{:03}", hours, minutes, seconds, milliseconds)
        } else {
            format!("{}:{:02}.{:03}", minutes, seconds, milliseconds)
        }
    }
}

impl fmt::Display for TimeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_hms())
    }
}

/// Rational number as reported by the probing tool (frame rates, time bases)
///
/// Equality is exact on the rational value: `30/1 == 60/2`, but
/// `30000/1001 != 2997/100` even though both print as 29.97.
#[derive(Debug, Clone, Copy, Eq)]
pub struct Rational {
    pub num: i64,
    pub den: i64,
}

impl Rational {
    /// Create a new rational.
    ///
    /// `i64::MIN` is refused in either position since it has no negation.
    pub fn new(num: i64, den: i64) -> Result<Self, DomainError> {
        if den == 0 {
            return Err(DomainError::Validation(
                "Rational denominator cannot be zero".to_string(),
            ));
        }
        if num == i64::MIN || den == i64::MIN {
            return Err(DomainError::Validation(format!(
                "Rational {}/{} is out of range",
                num, den
            )));
        }
        Ok(Self { num, den })
    }

    /// Parse `num/den` or a bare integer
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        let (num, den) = match value.split_once('/') {
            Some((num, den)) => (num.trim().parse::<i64>().ok()?, den.trim().parse::<i64>().ok()?),
            None => (value.parse::<i64>().ok()?, 1),
        };
        Self::new(num, den).ok()
    }

    /// Floating point approximation, for display only
    pub fn to_f64(&self) -> f64 {
        self.num as f64 / self.den as f64
    }
}

impl PartialEq for Rational {
    fn eq(&self, other: &Self) -> bool {
        // Cross-multiplied in i128 so no pair of i64 parts can overflow
        self.num as i128 * other.den as i128 == other.num as i128 * self.den as i128
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

/// Primary video stream description, produced fresh on every probe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoStreamInfo {
    pub codec: String,
    pub profile: String,
    pub level: i64,
    pub width: u32,
    pub height: u32,
    pub pixel_format: String,
    /// Nominal frame rate as reported (`r_frame_rate`)
    pub frame_rate: String,
    /// Average frame rate as reported (`avg_frame_rate`)
    pub avg_frame_rate: String,
    pub duration: f64,
    pub frame_count: u64,
    pub time_base: String,
    pub color_range: String,
    pub sample_aspect_ratio: String,
}

impl VideoStreamInfo {
    /// Nominal frame rate as an exact rational, if parsable
    pub fn nominal_frame_rate(&self) -> Option<Rational> {
        Rational::parse(&self.frame_rate)
    }

    /// `WIDTHxHEIGHT`
    pub fn resolution(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

/// Why an external operation did not succeed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutcomeFailure {
    /// Preconditions failed; the tool was never started
    InvalidInput,
    /// Tool exited non-zero or could not be started
    ToolFailed,
    /// Tool exceeded its timeout and was killed
    TimedOut,
    /// Tool reported success but the output is zero bytes
    EmptyOutput,
    /// Tool reported success but the output does not exist
    MissingOutput,
    /// Local filesystem operation failed
    Io,
}

/// Result of exactly one external-tool invocation (or the file copy standing in for one)
#[derive(Debug, Clone, Serialize)]
pub struct OperationOutcome {
    pub success: bool,
    pub output_path: Option<PathBuf>,
    /// Requested output location, kept for diagnostics even on failure
    pub target: PathBuf,
    pub elapsed: Duration,
    pub command: String,
    pub exit_code: i32,
    pub diagnostics: String,
    pub file_size: u64,
    pub throughput_mbps: f64,
    pub failure: Option<OutcomeFailure>,
}

impl OperationOutcome {
    /// Successful outcome; throughput is derived from size and elapsed time
    pub fn succeeded(
        target: PathBuf,
        elapsed: Duration,
        command: String,
        diagnostics: String,
        file_size: u64,
    ) -> Self {
        let secs = elapsed.as_secs_f64();
        let throughput_mbps = if secs > 0.0 {
            (file_size as f64 * 8.0 / 1_000_000.0) / secs
        } else {
            0.0
        };
        Self {
            success: true,
            output_path: Some(target.clone()),
            target,
            elapsed,
            command,
            exit_code: 0,
            diagnostics,
            file_size,
            throughput_mbps,
            failure: None,
        }
    }

    /// Failed outcome after (or instead of) a tool run
    pub fn failed(
        failure: OutcomeFailure,
        target: PathBuf,
        elapsed: Duration,
        command: String,
        exit_code: i32,
        diagnostics: String,
    ) -> Self {
        Self {
            success: false,
            output_path: None,
            target,
            elapsed,
            command,
            exit_code,
            diagnostics,
            file_size: 0,
            throughput_mbps: 0.0,
            failure: Some(failure),
        }
    }

    /// Precondition failure; no command was run
    pub fn rejected(target: PathBuf, reason: impl Into<String>) -> Self {
        Self::failed(
            OutcomeFailure::InvalidInput,
            target,
            Duration::ZERO,
            String::new(),
            -1,
            reason.into(),
        )
    }

    /// Name of the program that produced this outcome
    pub fn tool(&self) -> String {
        self.command
            .split_whitespace()
            .next()
            .unwrap_or("tool")
            .to_string()
    }

    /// Convert a failed outcome into the matching domain error
    pub fn into_result(self) -> Result<Self, DomainError> {
        match self.failure {
            None => Ok(self),
            Some(OutcomeFailure::InvalidInput) => Err(DomainError::Validation(self.diagnostics)),
            Some(OutcomeFailure::ToolFailed) => Err(DomainError::ToolInvocation {
                tool: self.tool(),
                exit_code: self.exit_code,
                diagnostics: self.diagnostics,
            }),
            Some(OutcomeFailure::TimedOut) => Err(DomainError::Timeout {
                tool: self.tool(),
                seconds: self.elapsed.as_secs(),
            }),
            Some(OutcomeFailure::EmptyOutput) | Some(OutcomeFailure::MissingOutput) => {
                Err(DomainError::EmptyOrMissingOutput { path: self.target })
            }
            Some(OutcomeFailure::Io) => Err(DomainError::io(
                format!("producing {}", self.target.display()),
                std::io::Error::other(self.diagnostics),
            )),
        }
    }
}

/// One camera view within a clip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub camera_id: String,
    pub start_s: f64,
    pub end_s: f64,
}

impl Segment {
    pub fn new(camera_id: impl Into<String>, start_s: f64, end_s: f64) -> Self {
        Self {
            camera_id: camera_id.into(),
            start_s,
            end_s,
        }
    }

    /// Requested span in seconds
    pub fn duration(&self) -> f64 {
        self.end_s - self.start_s
    }
}

/// A segment resolved against a concrete source file
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentSource {
    pub path: PathBuf,
    pub start_s: f64,
    pub end_s: f64,
}

impl SegmentSource {
    pub fn new(path: impl Into<PathBuf>, start_s: f64, end_s: f64) -> Self {
        Self {
            path: path.into(),
            start_s,
            end_s,
        }
    }
}

/// Entities stored in a registry
pub trait Identified {
    /// Human-readable entity kind used in NotFound errors
    const KIND: &'static str;

    fn id(&self) -> &str;
}

/// A stream-copied highlight clip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    pub clip_id: String,
    pub segments: Vec<Segment>,
    pub output_path: PathBuf,
    pub filesize_bytes: u64,
    /// Sum of requested segment spans, not re-measured from the file
    pub duration_s: f64,
    pub created_at: DateTime<Utc>,
}

impl Identified for Clip {
    const KIND: &'static str = "Clip";

    fn id(&self) -> &str {
        &self.clip_id
    }
}

/// A highlight reel; references clips by id only and does not own them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reel {
    pub reel_id: String,
    pub clip_ids: Vec<String>,
    pub output_path: PathBuf,
    pub filesize_bytes: u64,
    pub duration_s: f64,
    pub created_at: DateTime<Utc>,
}

impl Identified for Reel {
    const KIND: &'static str = "Reel";

    fn id(&self) -> &str {
        &self.reel_id
    }
}

/// Score line for the two teams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub team_a: u32,
    pub team_b: u32,
}

impl Score {
    pub fn new(team_a: u32, team_b: u32) -> Self {
        Self { team_a, team_b }
    }

    /// Parse `A-B`, e.g. `2-1`
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        let invalid = || DomainError::Validation(format!("Invalid score '{}', expected A-B", value));
        let (a, b) = value.trim().split_once('-').ok_or_else(invalid)?;
        Ok(Self {
            team_a: a.trim().parse().map_err(|_| invalid())?,
            team_b: b.trim().parse().map_err(|_| invalid())?,
        })
    }
}

/// Burned-in scoreboard switched from `before` to `after` at the goal instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreboardSpec {
    pub team_a: String,
    pub team_b: String,
    pub before: Score,
    pub after: Score,
    /// Offset within the clip; defaults to the clip midpoint
    #[serde(default)]
    pub goal_time_s: Option<f64>,
}

impl ScoreboardSpec {
    /// Scoreboard line for a given score
    pub fn label(&self, score: Score) -> String {
        format!(
            "{} {} - {} {}",
            self.team_a, score.team_a, score.team_b, self.team_b
        )
    }
}
