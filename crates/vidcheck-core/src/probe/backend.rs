use std::io;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to run {tool}: {source}")]
    Spawn { tool: String, source: io::Error },

    #[error("{tool} failed: {stderr}")]
    ToolFailed { tool: String, stderr: String },

    #[error("unreadable {tool} output: {message}")]
    Parse { tool: String, message: String },

    #[error("no video stream")]
    NoVideoStream,

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Opens video sources. Implementations must be shareable across threads so a
/// single backend can serve a whole scan.
pub trait DecodeBackend: Send + Sync {
    fn open(&self, path: &Path) -> Result<Box<dyn VideoSource>, BackendError>;
}

/// An open decode handle. The handle is released when dropped.
pub trait VideoSource {
    /// Total frame count as reported by the container; may be zero or negative
    /// when the metadata is missing.
    fn frame_count(&mut self) -> Result<i64, BackendError>;

    /// Position the source on `frame`. `Ok(false)` means the seek was refused.
    fn seek(&mut self, frame: u64) -> Result<bool, BackendError>;

    /// Decode the frame at the current position. `Ok(None)` is a failed decode,
    /// `Err` is a backend malfunction.
    fn decode(&mut self) -> Result<Option<Vec<u8>>, BackendError>;
}
