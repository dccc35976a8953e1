pub mod backend;
pub mod checkpoint;
pub mod ffmpeg;

pub use backend::{BackendError, DecodeBackend, VideoSource};
pub use checkpoint::{checkpoints, frame_window, FrameWindow, SamplingPolicy};
pub use ffmpeg::FfmpegBackend;

use std::fmt;
use std::path::Path;
use tracing::debug;

use crate::progress::ProgressReporter;

/// Actionable failure class of a corrupted file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The container could not be opened at all.
    OpenFailure,
    /// The container opened but sampled content could not be decoded.
    DecodeFailure,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::OpenFailure => write!(f, "OpenFailure"),
            ErrorCategory::DecodeFailure => write!(f, "DecodeFailure"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeFailure {
    FrameCountUnavailable,
    CheckpointExhausted { checkpoint: u64 },
    Backend(String),
}

impl fmt::Display for DecodeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeFailure::FrameCountUnavailable => write!(f, "frame count unavailable"),
            DecodeFailure::CheckpointExhausted { checkpoint } => {
                write!(f, "all frames around checkpoint {} failed", checkpoint)
            }
            DecodeFailure::Backend(message) => write!(f, "backend error: {}", message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Ok,
    OpenFailure,
    DecodeFailure(DecodeFailure),
}

impl ProbeOutcome {
    pub fn category(&self) -> Option<ErrorCategory> {
        match self {
            ProbeOutcome::Ok => None,
            ProbeOutcome::OpenFailure => Some(ErrorCategory::OpenFailure),
            ProbeOutcome::DecodeFailure(_) => Some(ErrorCategory::DecodeFailure),
        }
    }

    /// Human-readable description used in report lines.
    pub fn description(&self) -> String {
        match self {
            ProbeOutcome::Ok => "ok".to_string(),
            ProbeOutcome::OpenFailure => {
                format!("{}: container could not be opened", ErrorCategory::OpenFailure)
            }
            ProbeOutcome::DecodeFailure(reason) => {
                format!("{}: {}", ErrorCategory::DecodeFailure, reason)
            }
        }
    }
}

/// Classification of one file plus the trace of every attempt that led to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub outcome: ProbeOutcome,
    pub steps: Vec<String>,
}

impl ProbeResult {
    pub fn is_ok(&self) -> bool {
        self.outcome == ProbeOutcome::Ok
    }

    pub fn category(&self) -> Option<ErrorCategory> {
        self.outcome.category()
    }
}

/// Samples a bounded number of frames per video through a [`DecodeBackend`].
pub struct VideoProbe<'a> {
    backend: &'a dyn DecodeBackend,
    policy: SamplingPolicy,
}

impl<'a> VideoProbe<'a> {
    pub fn new(backend: &'a dyn DecodeBackend, policy: SamplingPolicy) -> Self {
        Self { backend, policy }
    }

    /// Classify `path`. Never fails: backend errors become `DecodeFailure`
    /// and the decode handle is dropped before returning.
    pub fn probe(&self, path: &Path, reporter: &dyn ProgressReporter) -> ProbeResult {
        let mut steps = Vec::new();

        let mut source = match self.backend.open(path) {
            Ok(source) => source,
            Err(err) => {
                debug!("Open failed for {}: {}", path.display(), err);
                steps.push("open: failed".to_string());
                return ProbeResult {
                    outcome: ProbeOutcome::OpenFailure,
                    steps,
                };
            }
        };
        steps.push("open: success".to_string());

        let outcome = match self.sample(source.as_mut(), path, &mut steps, reporter) {
            Ok(outcome) => outcome,
            Err(err) => {
                debug!("Backend error while probing {}: {}", path.display(), err);
                steps.push(format!("backend error: {}", err));
                ProbeOutcome::DecodeFailure(DecodeFailure::Backend(err.to_string()))
            }
        };
        drop(source);

        ProbeResult { outcome, steps }
    }

    fn sample(
        &self,
        source: &mut dyn VideoSource,
        path: &Path,
        steps: &mut Vec<String>,
        reporter: &dyn ProgressReporter,
    ) -> Result<ProbeOutcome, BackendError> {
        let total = source.frame_count()?;
        if total <= 0 {
            steps.push("frame count unavailable".to_string());
            return Ok(ProbeOutcome::DecodeFailure(
                DecodeFailure::FrameCountUnavailable,
            ));
        }
        let total = total as u64;

        let points = checkpoints(total, self.policy.checkpoints);
        for (index, &checkpoint) in points.iter().enumerate() {
            let ordinal = index + 1;
            let window = frame_window(checkpoint, total, self.policy.window);

            let mut hit = false;
            for frame in window.frames() {
                let decoded =
                    source.seek(frame)? && source.decode()?.is_some_and(|buf| !buf.is_empty());
                steps.push(format!(
                    "[attempt {}] probing frame {}: {}",
                    ordinal,
                    frame,
                    if decoded { "success" } else { "failure" }
                ));
                if decoded {
                    hit = true;
                    break;
                }
            }

            reporter.on_checkpoint(path, ordinal, points.len(), hit);

            if !hit {
                let reason = DecodeFailure::CheckpointExhausted { checkpoint };
                steps.push(reason.to_string());
                return Ok(ProbeOutcome::DecodeFailure(reason));
            }
        }

        Ok(ProbeOutcome::Ok)
    }
}
