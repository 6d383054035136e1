//! Probe output inspection
//!
//! Turns the structured JSON emitted by ffprobe into [`VideoStreamInfo`].

use serde::Deserialize;
use serde_json::Value;

use crate::domain::model::VideoStreamInfo;

/// Stream fields requested from the probing tool, in request order
pub const STREAM_ENTRIES: &str = "stream=codec_name,profile,level,width,height,pix_fmt,\
r_frame_rate,avg_frame_rate,duration,nb_frames,time_base,color_range,sample_aspect_ratio";

#[derive(Debug, Deserialize)]
struct ProbeDocument {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProbeStream {
    codec_name: Option<String>,
    profile: Option<String>,
    level: Option<i64>,
    width: Option<u32>,
    height: Option<u32>,
    pix_fmt: Option<String>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
    // ffprobe prints these as strings; tolerate numbers too
    duration: Option<Value>,
    nb_frames: Option<Value>,
    time_base: Option<String>,
    color_range: Option<String>,
    sample_aspect_ratio: Option<String>,
}

/// Parser for ffprobe JSON
pub struct StreamInspector;

impl StreamInspector {
    /// Parse the first video stream from ffprobe `-of json` output
    pub fn parse_video_stream(json: &str) -> Result<VideoStreamInfo, String> {
        let document: ProbeDocument =
            serde_json::from_str(json).map_err(|e| format!("invalid probe output: {}", e))?;

        let stream = document
            .streams
            .into_iter()
            .next()
            .ok_or_else(|| "no video stream found".to_string())?;

        Ok(VideoStreamInfo {
            codec: stream.codec_name.unwrap_or_default(),
            profile: stream.profile.unwrap_or_default(),
            level: stream.level.unwrap_or(0),
            width: stream.width.unwrap_or(0),
            height: stream.height.unwrap_or(0),
            pixel_format: stream.pix_fmt.unwrap_or_default(),
            frame_rate: stream.r_frame_rate.unwrap_or_default(),
            avg_frame_rate: stream.avg_frame_rate.unwrap_or_default(),
            duration: number(stream.duration.as_ref()).unwrap_or(0.0),
            frame_count: number(stream.nb_frames.as_ref()).map(|n| n as u64).unwrap_or(0),
            time_base: stream.time_base.unwrap_or_default(),
            color_range: stream.color_range.unwrap_or_default(),
            sample_aspect_ratio: stream
                .sample_aspect_ratio
                .unwrap_or_else(|| "1:1".to_string()),
        })
    }
}

fn number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}
