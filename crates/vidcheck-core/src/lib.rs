pub mod config;
pub mod engine;
pub mod error;
pub mod probe;
pub mod progress;
pub mod scanner;
pub mod session;
pub mod storage;

pub use config::AppConfig;
pub use engine::{FileOutcome, ScanController, ScanRun, ScanStats, ScanSummary};
pub use error::Error;
pub use probe::{ErrorCategory, ProbeOutcome, ProbeResult, VideoProbe};
pub use progress::{ProgressReporter, SilentReporter};
pub use session::{ScanSession, SessionId};
