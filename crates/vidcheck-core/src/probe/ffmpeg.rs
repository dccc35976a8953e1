//! Decode backend built on the `ffprobe` and `ffmpeg` command-line tools.
//!
//! `ffprobe` supplies the frame count and frame rate when a source is opened;
//! each decode attempt runs `ffmpeg` to extract exactly one raw frame at the
//! timestamp of the current position.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, trace};

use super::backend::{BackendError, DecodeBackend, VideoSource};
use crate::error::Error;

const FFPROBE: &str = "ffprobe";
const FFMPEG: &str = "ffmpeg";

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
    format: Option<FfprobeFormat>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    nb_frames: Option<String>,
    avg_frame_rate: Option<String>,
    r_frame_rate: Option<String>,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

/// Stream facts needed to address frames by index.
#[derive(Debug, Clone, Copy, PartialEq)]
struct StreamInfo {
    frame_count: i64,
    frame_rate: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct FfmpegBackend {
    ffprobe: PathBuf,
    ffmpeg: PathBuf,
}

impl FfmpegBackend {
    /// Resolve both tools, preferring configured paths over a `PATH` lookup.
    pub fn locate(ffprobe: Option<&Path>, ffmpeg: Option<&Path>) -> Result<Self, Error> {
        Ok(Self {
            ffprobe: tool_path(FFPROBE, ffprobe)?,
            ffmpeg: tool_path(FFMPEG, ffmpeg)?,
        })
    }
}

fn tool_path(name: &str, configured: Option<&Path>) -> Result<PathBuf, Error> {
    if let Some(path) = configured {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        debug!("Configured {} path {} does not exist", name, path.display());
    }
    which::which(name).map_err(|_| Error::ToolNotFound(name.to_string()))
}

impl DecodeBackend for FfmpegBackend {
    fn open(&self, path: &Path) -> Result<Box<dyn VideoSource>, BackendError> {
        let output = Command::new(&self.ffprobe)
            .args([
                "-v",
                "error",
                "-select_streams",
                "v:0",
                "-show_entries",
                "stream=nb_frames,avg_frame_rate,r_frame_rate,duration:format=duration",
                "-of",
                "json",
            ])
            .arg(path)
            .output()
            .map_err(|source| BackendError::Spawn {
                tool: FFPROBE.to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(BackendError::ToolFailed {
                tool: FFPROBE.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let info = parse_ffprobe_output(&output.stdout)?;
        debug!(
            "Opened {}: {} frames at {:?} fps",
            path.display(),
            info.frame_count,
            info.frame_rate
        );

        Ok(Box::new(FfmpegSource {
            ffmpeg: self.ffmpeg.clone(),
            path: path.to_path_buf(),
            info,
            position: 0,
        }))
    }
}

fn parse_ffprobe_output(stdout: &[u8]) -> Result<StreamInfo, BackendError> {
    let parsed: FfprobeOutput =
        serde_json::from_slice(stdout).map_err(|e| BackendError::Parse {
            tool: FFPROBE.to_string(),
            message: e.to_string(),
        })?;

    let stream = parsed.streams.first().ok_or(BackendError::NoVideoStream)?;

    let frame_rate = stream
        .avg_frame_rate
        .as_deref()
        .and_then(parse_frame_rate)
        .or_else(|| stream.r_frame_rate.as_deref().and_then(parse_frame_rate));

    let counted = stream
        .nb_frames
        .as_deref()
        .and_then(|s| s.parse::<i64>().ok())
        .filter(|&n| n > 0);

    // Containers without a frame index get an estimate from the duration.
    let frame_count = counted.unwrap_or_else(|| {
        let duration = stream
            .duration
            .as_deref()
            .and_then(parse_seconds)
            .or_else(|| {
                parsed
                    .format
                    .as_ref()
                    .and_then(|f| f.duration.as_deref())
                    .and_then(parse_seconds)
            });
        match (duration, frame_rate) {
            (Some(secs), Some(fps)) => (secs * fps).round() as i64,
            _ => 0,
        }
    });

    Ok(StreamInfo {
        frame_count,
        frame_rate,
    })
}

fn parse_frame_rate(s: &str) -> Option<f64> {
    let rate = match s.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.parse().ok()?;
            let den: f64 = den.parse().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => s.parse().ok()?,
    };
    (rate.is_finite() && rate > 0.0).then_some(rate)
}

fn parse_seconds(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|d| d.is_finite() && *d > 0.0)
}

struct FfmpegSource {
    ffmpeg: PathBuf,
    path: PathBuf,
    info: StreamInfo,
    position: u64,
}

impl FfmpegSource {
    fn timestamp(&self) -> Option<f64> {
        self.info.frame_rate.map(|fps| self.position as f64 / fps)
    }
}

impl VideoSource for FfmpegSource {
    fn frame_count(&mut self) -> Result<i64, BackendError> {
        Ok(self.info.frame_count)
    }

    fn seek(&mut self, frame: u64) -> Result<bool, BackendError> {
        if self.info.frame_rate.is_none() || frame >= self.info.frame_count.max(0) as u64 {
            return Ok(false);
        }
        self.position = frame;
        Ok(true)
    }

    fn decode(&mut self) -> Result<Option<Vec<u8>>, BackendError> {
        let Some(timestamp) = self.timestamp() else {
            return Ok(None);
        };

        let output = Command::new(&self.ffmpeg)
            .args(["-nostdin", "-v", "error", "-ss"])
            .arg(format!("{:.6}", timestamp))
            .arg("-i")
            .arg(&self.path)
            .args([
                "-map", "0:v:0", "-frames:v", "1", "-an", "-sn", "-f", "rawvideo", "-pix_fmt",
                "gray", "-",
            ])
            .output()
            .map_err(|source| BackendError::Spawn {
                tool: FFMPEG.to_string(),
                source,
            })?;

        self.position += 1;

        if !output.status.success() {
            trace!(
                "ffmpeg could not decode {} at {:.3}s: {}",
                self.path.display(),
                timestamp,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return Ok(None);
        }

        if output.stdout.is_empty() {
            return Ok(None);
        }
        Ok(Some(output.stdout))
    }
}
