use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::error::Error;
use crate::probe::{DecodeBackend, ProbeResult, VideoProbe};
use crate::progress::ProgressReporter;
use crate::scanner;
use crate::session::{ScanSession, SessionId};
use crate::storage::{ProgressStore, ReportEntry, ReportSink};

/// Running counters, for display only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Candidates left to probe after resume filtering.
    pub total_candidates: usize,
    /// Candidates skipped because a previous run already processed them.
    pub skipped: usize,
    pub processed: usize,
    pub corrupted: usize,
}

#[derive(Debug)]
pub struct ScanSummary {
    pub session: SessionId,
    pub stats: ScanStats,
    pub report_path: PathBuf,
    pub duration: Duration,
}

/// What happened to one candidate.
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub result: ProbeResult,
    pub reported: bool,
}

/// Drives a resumable scan: discovery, per-file probing with write-through
/// progress, and incremental reporting. Storage is reached only through the
/// injected [`ProgressStore`] and [`ReportSink`].
pub struct ScanController<'a> {
    config: &'a AppConfig,
    backend: &'a dyn DecodeBackend,
    store: &'a dyn ProgressStore,
    report: &'a dyn ReportSink,
    session: SessionId,
    resume: bool,
}

impl<'a> ScanController<'a> {
    pub fn new(
        config: &'a AppConfig,
        backend: &'a dyn DecodeBackend,
        store: &'a dyn ProgressStore,
        report: &'a dyn ReportSink,
        session: SessionId,
    ) -> Self {
        Self {
            config,
            backend,
            store,
            report,
            session,
            resume: false,
        }
    }

    pub fn with_resume(mut self, resume: bool) -> Self {
        self.resume = resume;
        self
    }

    /// Probe every candidate under `root` and finalize.
    pub fn run(&self, root: &Path, reporter: &dyn ProgressReporter) -> Result<ScanSummary, Error> {
        self.start(root, reporter)?.finish()
    }

    /// Discover candidates and, when resuming, drop the ones already processed.
    /// A missing root aborts here, before any artifact is touched.
    pub fn start<'r>(
        &'r self,
        root: &Path,
        reporter: &'r dyn ProgressReporter,
    ) -> Result<ScanRun<'r>, Error> {
        let started = Instant::now();

        info!("Discovering videos under {}", root.display());
        reporter.on_discovery_start(root);
        let discovered = scanner::discover_video_files(
            root,
            &self.config.extensions,
            &self.config.ignore_patterns,
        )?;
        reporter.on_discovery_complete(discovered.len(), started.elapsed().as_secs_f64());
        debug!("{} candidate videos found", discovered.len());

        let mut candidates = discovered;
        let discovered_count = candidates.len();

        let session = if self.resume {
            let processed = self.store.load(&self.session)?;
            let session = ScanSession::with_processed(self.session.clone(), processed);
            let before = candidates.len();
            candidates.retain(|path| !session.is_processed(&record_key(path)));
            let skipped = before - candidates.len();
            info!(
                "Resuming session {}: skipping {} processed files, {} remaining",
                self.session, skipped, candidates.len()
            );
            reporter.on_resume(skipped, candidates.len());
            session
        } else {
            ScanSession::new(self.session.clone())
        };

        let stats = ScanStats {
            total_candidates: candidates.len(),
            skipped: discovered_count - candidates.len(),
            ..ScanStats::default()
        };

        Ok(ScanRun {
            controller: self,
            reporter,
            probe: VideoProbe::new(self.backend, self.config.sampling),
            candidates,
            next: 0,
            session,
            stats,
            started,
        })
    }
}

/// A scan in its probing phase. Each [`step`](ScanRun::step) handles one file;
/// dropping the run before [`finish`](ScanRun::finish) leaves the progress
/// record in place for a later resume.
pub struct ScanRun<'r> {
    controller: &'r ScanController<'r>,
    reporter: &'r dyn ProgressReporter,
    probe: VideoProbe<'r>,
    candidates: Vec<PathBuf>,
    next: usize,
    session: ScanSession,
    stats: ScanStats,
    started: Instant,
}

impl<'r> ScanRun<'r> {
    pub fn stats(&self) -> &ScanStats {
        &self.stats
    }

    pub fn session(&self) -> &ScanSession {
        &self.session
    }

    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }

    /// Probe the next candidate. `Ok(None)` once every candidate is done.
    pub fn step(&mut self) -> Result<Option<FileOutcome>, Error> {
        let Some(path) = self.candidates.get(self.next).cloned() else {
            return Ok(None);
        };
        self.next += 1;

        // The backend opens the real path; the lossy string only keys the
        // record and the report.
        let key = record_key(&path);
        self.reporter.on_file_start(&self.stats, &path);

        let result = self.probe.probe(&path, self.reporter);
        log_steps(&key, &result);

        // Report before marking processed: a crash in between re-probes the
        // file on resume instead of losing the finding.
        let entry = ReportEntry::from_outcome(&key, &result.outcome);
        if let Some(entry) = &entry {
            self.controller.report.append(entry)?;
            self.stats.corrupted += 1;
        }

        if self.session.mark_processed(&key) {
            self.controller
                .store
                .save(self.session.id(), self.session.processed())?;
        } else {
            warn!("{} was already recorded as processed", key);
        }
        self.stats.processed += 1;

        self.reporter.on_file_complete(&self.stats, &path, &result);

        Ok(Some(FileOutcome {
            path,
            result,
            reported: entry.is_some(),
        }))
    }

    /// Probe whatever is left, then delete the progress record.
    pub fn finish(mut self) -> Result<ScanSummary, Error> {
        while self.step()?.is_some() {}

        self.controller.store.clear(self.session.id())?;
        let duration = self.started.elapsed();
        self.reporter
            .on_scan_complete(&self.stats, duration.as_secs_f64());
        info!(
            "Scan complete: {} processed, {} corrupted in {:.2}s",
            self.stats.processed,
            self.stats.corrupted,
            duration.as_secs_f64()
        );

        Ok(ScanSummary {
            session: self.session.id().clone(),
            stats: self.stats,
            report_path: self.controller.report.location(),
            duration,
        })
    }
}

fn record_key(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn log_steps(path: &str, result: &ProbeResult) {
    if result.is_ok() {
        debug!("{}: ok", path);
        for step in &result.steps {
            debug!("  {}", step);
        }
    } else {
        info!("{}: {}", path, result.outcome.description());
        for step in &result.steps {
            info!("  {}", step);
        }
    }
}
