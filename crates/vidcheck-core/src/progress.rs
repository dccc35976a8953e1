use std::path::Path;

use crate::engine::ScanStats;
use crate::probe::ProbeResult;

/// Trait for reporting scan progress.
///
/// The CLI implements it with indicatif; tests and library callers can use
/// [`SilentReporter`]. All methods have default no-op implementations and none
/// of them influence classification.
pub trait ProgressReporter: Send + Sync {
    fn on_discovery_start(&self, _root: &Path) {}
    fn on_discovery_complete(&self, _candidates: usize, _duration_secs: f64) {}
    fn on_resume(&self, _skipped: usize, _remaining: usize) {}
    fn on_file_start(&self, _stats: &ScanStats, _path: &Path) {}
    fn on_checkpoint(&self, _path: &Path, _ordinal: usize, _checkpoints: usize, _success: bool) {}
    fn on_file_complete(&self, _stats: &ScanStats, _path: &Path, _result: &ProbeResult) {}
    fn on_scan_complete(&self, _stats: &ScanStats, _duration_secs: f64) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
