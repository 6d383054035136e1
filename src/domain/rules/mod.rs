// Domain rules - Business logic and policies

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use crate::domain::errors::*;
use crate::domain::model::*;

/// First attribute that prevents two streams from being joined by stream copy
#[derive(Debug, Clone, PartialEq)]
pub enum StreamMismatch {
    Codec { expected: String, actual: String },
    Profile { expected: String, actual: String },
    Resolution { expected: String, actual: String },
    PixelFormat { expected: String, actual: String },
    FrameRate { expected: String, actual: String },
}

impl fmt::Display for StreamMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (what, expected, actual) = match self {
            StreamMismatch::Codec { expected, actual } => ("codec", expected, actual),
            StreamMismatch::Profile { expected, actual } => ("profile", expected, actual),
            StreamMismatch::Resolution { expected, actual } => ("resolution", expected, actual),
            StreamMismatch::PixelFormat { expected, actual } => ("pix_fmt", expected, actual),
            StreamMismatch::FrameRate { expected, actual } => ("frame rate", expected, actual),
        };
        write!(f, "{} mismatch: {} != {}", what, actual, expected)
    }
}

/// Business rules for stream-copy compatibility
pub struct CompatibilityRules;

impl CompatibilityRules {
    /// Compare a candidate against the reference stream.
    ///
    /// Order is fixed: codec, profile, resolution, pixel format, nominal
    /// frame rate. Only the first mismatch is reported.
    pub fn first_mismatch(
        reference: &VideoStreamInfo,
        candidate: &VideoStreamInfo,
    ) -> Option<StreamMismatch> {
        if candidate.codec != reference.codec {
            return Some(StreamMismatch::Codec {
                expected: reference.codec.clone(),
                actual: candidate.codec.clone(),
            });
        }
        if candidate.profile != reference.profile {
            return Some(StreamMismatch::Profile {
                expected: reference.profile.clone(),
                actual: candidate.profile.clone(),
            });
        }
        if candidate.width != reference.width || candidate.height != reference.height {
            return Some(StreamMismatch::Resolution {
                expected: reference.resolution(),
                actual: candidate.resolution(),
            });
        }
        if candidate.pixel_format != reference.pixel_format {
            return Some(StreamMismatch::PixelFormat {
                expected: reference.pixel_format.clone(),
                actual: candidate.pixel_format.clone(),
            });
        }
        if !Self::same_frame_rate(reference, candidate) {
            return Some(StreamMismatch::FrameRate {
                expected: reference.frame_rate.clone(),
                actual: candidate.frame_rate.clone(),
            });
        }
        None
    }

    /// Rational equality when both rates parse, otherwise exact text equality
    fn same_frame_rate(reference: &VideoStreamInfo, candidate: &VideoStreamInfo) -> bool {
        match (reference.nominal_frame_rate(), candidate.nominal_frame_rate()) {
            (Some(a), Some(b)) => a == b,
            _ => reference.frame_rate == candidate.frame_rate,
        }
    }
}

/// Seek parameters for a precise stream-copy extraction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeekPlan {
    /// Applied before the input is opened (keyframe-aligned, fast)
    pub coarse_s: f64,
    /// Residual applied after the input is opened (frame-accurate)
    pub fine_s: f64,
    /// Requested output duration
    pub duration_s: f64,
}

/// Two-stage seek planning
pub struct SeekPlanner;

impl SeekPlanner {
    /// Split `start_s` into a coarse pre-input seek and a fine post-input residual
    pub fn plan(start_s: f64, end_s: f64, preroll_s: f64) -> Result<SeekPlan, DomainError> {
        TimeRangeRules::validate(start_s, end_s)?;
        let coarse_s = (start_s - preroll_s.max(0.0)).max(0.0);
        let fine_s = (start_s - coarse_s).max(0.0);
        Ok(SeekPlan {
            coarse_s,
            fine_s,
            duration_s: end_s - start_s,
        })
    }
}

/// Time window checks
pub struct TimeRangeRules;

impl TimeRangeRules {
    /// `start_s >= 0` and `end_s > start_s`, both finite
    pub fn validate(start_s: f64, end_s: f64) -> Result<(), DomainError> {
        if !start_s.is_finite() || !end_s.is_finite() {
            return Err(DomainError::Validation(format!(
                "Invalid time range: {} to {}",
                start_s, end_s
            )));
        }
        if start_s < 0.0 {
            return Err(DomainError::Validation(format!(
                "Invalid time range: start_s ({}) must be >= 0",
                start_s
            )));
        }
        if end_s <= start_s {
            return Err(DomainError::Validation(format!(
                "Invalid time range: end_s ({}) must be > start_s ({})",
                end_s, start_s
            )));
        }
        Ok(())
    }
}

/// Business rules for clip segment lists
pub struct SegmentRules;

impl SegmentRules {
    /// Resolve every segment against the camera map, rejecting the first invalid one
    pub fn resolve(
        segments: &[Segment],
        camera_files: &HashMap<String, PathBuf>,
    ) -> Result<Vec<SegmentSource>, DomainError> {
        if segments.is_empty() {
            return Err(DomainError::Validation("No segments provided".to_string()));
        }

        segments
            .iter()
            .enumerate()
            .map(|(index, segment)| {
                let path = camera_files.get(&segment.camera_id).ok_or_else(|| {
                    DomainError::Validation(format!(
                        "Segment {}: camera {} not found in provided files",
                        index, segment.camera_id
                    ))
                })?;
                TimeRangeRules::validate(segment.start_s, segment.end_s).map_err(|e| {
                    DomainError::Validation(format!(
                        "Segment {} ({}): {}",
                        index,
                        segment.camera_id,
                        strip_prefix(&e)
                    ))
                })?;
                Ok(SegmentSource::new(path.clone(), segment.start_s, segment.end_s))
            })
            .collect()
    }

    /// Sum of requested spans; the bookkeeping duration of a clip
    pub fn total_duration(segments: &[Segment]) -> f64 {
        segments.iter().map(Segment::duration).sum()
    }
}

fn strip_prefix(error: &DomainError) -> String {
    match error {
        DomainError::Validation(message) => message.clone(),
        other => other.to_string(),
    }
}

/// Business rules for the scoreboard overlay
pub struct OverlayRules;

impl OverlayRules {
    /// Crossover instant: requested offset (midpoint when absent) clamped into `[0, total]`
    pub fn goal_time(requested: Option<f64>, total_duration_s: f64) -> f64 {
        let total = total_duration_s.max(0.0);
        match requested {
            Some(t) if t.is_finite() => t.clamp(0.0, total),
            _ => total / 2.0,
        }
    }

    /// Escape text for a drawtext `text=` value inside a `-vf` graph.
    ///
    /// ffmpeg strips one escaping level per layer: drawtext expansion
    /// (`\\`, `%`), the filter option list, then the graph itself.
    pub fn escape_text(text: &str) -> String {
        let flattened: String = text
            .chars()
            .map(|ch| if ch == '\n' || ch == '\r' { ' ' } else { ch })
            .collect();
        Self::escape_option(&escape_with(&flattened, &['\\', '%']))
    }

    /// Escape a plain filter option value (a font path, say) for a `-vf` graph
    pub fn escape_option(value: &str) -> String {
        let option_level = escape_with(value, &['\\', '\'', ':']);
        escape_with(&option_level, &['\\', '\'', '[', ']', ',', ';'])
    }
}

/// Backslash-prefix every char in `special`
fn escape_with(value: &str, special: &[char]) -> String {
    let mut escaped = String::with_capacity(value.len() + 8);
    for ch in value.chars() {
        if special.contains(&ch) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
