use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use vidcheck_core::{ProbeResult, ProgressReporter, ScanStats};

const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// CLI progress reporter using indicatif progress bars.
///
/// - Discovery phase: spinner (candidate count unknown upfront)
/// - Probe phase: bar over the remaining files, message shows the current
///   file, its checkpoint and the corrupted count so far
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn set_bar(&self, pb: ProgressBar) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(old) = guard.take() {
                old.finish_and_clear();
            }
            *guard = Some(pb);
        }
    }

    fn finish_bar(&self) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.bar.lock() {
            if let Some(pb) = guard.as_ref() {
                f(pb);
            }
        }
    }

    fn probe_bar(total: usize) -> ProgressBar {
        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::with_template(
                "  {spinner:.cyan} Probing [{bar:30.cyan/dim}] {pos}/{len} ({percent}%) {msg}",
            )
            .unwrap()
            .progress_chars("━╸─")
            .tick_chars(TICK_CHARS),
        );
        pb.enable_steady_tick(Duration::from_millis(80));
        pb
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl ProgressReporter for CliReporter {
    fn on_discovery_start(&self, root: &Path) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_chars(TICK_CHARS),
        );
        pb.set_message(format!("Discovering videos under {}...", root.display()));
        pb.enable_steady_tick(Duration::from_millis(80));
        self.set_bar(pb);
    }

    fn on_discovery_complete(&self, candidates: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Discovery complete: {} videos in {:.2}s",
            candidates, duration_secs
        );
    }

    fn on_resume(&self, skipped: usize, remaining: usize) {
        eprintln!(
            "  \x1b[33m↻\x1b[0m Resuming: skipping {} processed files, {} remaining",
            skipped, remaining
        );
    }

    fn on_file_start(&self, stats: &ScanStats, path: &Path) {
        let needs_bar = self.bar.lock().map(|g| g.is_none()).unwrap_or(false);
        if needs_bar {
            self.set_bar(Self::probe_bar(stats.total_candidates));
        }
        let name = display_name(path);
        let corrupted = stats.corrupted;
        self.with_bar(|pb| {
            pb.set_position(stats.processed as u64);
            pb.set_message(format!("{} | corrupted: {}", name, corrupted));
        });
    }

    fn on_checkpoint(&self, path: &Path, ordinal: usize, checkpoints: usize, _success: bool) {
        let name = display_name(path);
        self.with_bar(|pb| {
            pb.set_message(format!("{} - checkpoint {}/{}", name, ordinal, checkpoints));
        });
    }

    fn on_file_complete(&self, stats: &ScanStats, path: &Path, result: &ProbeResult) {
        let line = (!result.is_ok()).then(|| {
            format!(
                "  \x1b[31m✗\x1b[0m {} | {}",
                path.display(),
                result.outcome.description()
            )
        });
        self.with_bar(|pb| {
            pb.set_position(stats.processed as u64);
            if let Some(line) = line {
                pb.println(line);
            }
        });
    }

    fn on_scan_complete(&self, stats: &ScanStats, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Probe complete: {} files, {} corrupted in {:.2}s",
            stats.processed, stats.corrupted, duration_secs
        );
    }
}
