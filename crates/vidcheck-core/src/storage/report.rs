use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::Error;
use crate::probe::{ErrorCategory, ProbeOutcome};

/// One corrupted file as written to the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    pub path: String,
    pub category: ErrorCategory,
    pub description: String,
}

impl ReportEntry {
    /// `None` for intact files; they never reach the report.
    pub fn from_outcome(path: &str, outcome: &ProbeOutcome) -> Option<Self> {
        outcome.category().map(|category| ReportEntry {
            path: path.to_string(),
            category,
            description: outcome.description(),
        })
    }
}

impl fmt::Display for ReportEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {}", self.path, self.description)
    }
}

/// Append-only destination for corruption findings.
pub trait ReportSink: Send + Sync {
    /// Must be durable when it returns.
    fn append(&self, entry: &ReportEntry) -> Result<(), Error>;

    fn location(&self) -> PathBuf;
}

/// Plain-text report, one `<path> | <description>` line per corrupted file.
/// The file is only created once there is something to write.
pub struct FileReport {
    path: PathBuf,
}

impl FileReport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_line(&self, entry: &ReportEntry) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", entry)?;
        file.sync_data()
    }
}

impl ReportSink for FileReport {
    fn append(&self, entry: &ReportEntry) -> Result<(), Error> {
        self.write_line(entry).map_err(|source| Error::Report {
            path: self.path.clone(),
            source,
        })?;
        debug!("Reported {} to {}", entry.path, self.path.display());
        Ok(())
    }

    fn location(&self) -> PathBuf {
        std::path::absolute(&self.path).unwrap_or_else(|_| self.path.clone())
    }
}
