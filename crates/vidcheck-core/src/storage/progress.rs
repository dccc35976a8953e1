use std::collections::BTreeSet;
use std::fs;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

use crate::error::Error;
use crate::session::SessionId;

/// Durable record of the paths already processed in a session.
pub trait ProgressStore: Send + Sync {
    /// Empty set when the session has no record.
    fn load(&self, session: &SessionId) -> Result<BTreeSet<String>, Error>;

    /// Replace the record wholesale. Called after every file.
    fn save(&self, session: &SessionId, processed: &BTreeSet<String>) -> Result<(), Error>;

    fn clear(&self, session: &SessionId) -> Result<(), Error>;

    /// Most recent session that still has a record, if the store can list them.
    fn latest_session(&self) -> Result<Option<SessionId>, Error> {
        Ok(None)
    }
}

/// Hidden flat files `.<prefix>_progress_<id>.txt`, one path per line.
pub struct FileProgressStore {
    dir: PathBuf,
    prefix: String,
}

impl FileProgressStore {
    pub fn new(dir: impl Into<PathBuf>, prefix: &str) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.to_string(),
        }
    }

    pub fn record_path(&self, session: &SessionId) -> PathBuf {
        self.dir.join(session.progress_file_name(&self.prefix))
    }

    fn session_from_file_name(&self, name: &str) -> Option<SessionId> {
        let id = name
            .strip_prefix('.')?
            .strip_prefix(self.prefix.as_str())?
            .strip_prefix("_progress_")?
            .strip_suffix(".txt")?;
        SessionId::parse(id)
    }
}

fn write_record(path: &Path, processed: &BTreeSet<String>) -> io::Result<()> {
    // Write beside the record and rename over it so readers never see a torn file.
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    let mut file = fs::File::create(&tmp_path)?;
    for entry in processed {
        // One path per line: a path with a line break cannot round-trip and is
        // left out, so a resumed scan probes that file again.
        if entry.contains(['\n', '\r']) {
            warn!("Not recording {:?}: path contains a line break", entry);
            continue;
        }
        writeln!(file, "{}", entry)?;
    }
    file.sync_all()?;
    drop(file);

    fs::rename(&tmp_path, path)
}

impl ProgressStore for FileProgressStore {
    fn load(&self, session: &SessionId) -> Result<BTreeSet<String>, Error> {
        let path = self.record_path(session);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("No progress record at {}", path.display());
                return Ok(BTreeSet::new());
            }
            Err(source) => return Err(Error::ProgressStore { path, source }),
        };

        let processed: BTreeSet<String> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        debug!(
            "Loaded {} processed paths from {}",
            processed.len(),
            path.display()
        );
        Ok(processed)
    }

    fn save(&self, session: &SessionId, processed: &BTreeSet<String>) -> Result<(), Error> {
        let path = self.record_path(session);
        write_record(&path, processed).map_err(|source| Error::ProgressStore {
            path: path.clone(),
            source,
        })?;
        trace!("Saved {} processed paths to {}", processed.len(), path.display());
        Ok(())
    }

    fn clear(&self, session: &SessionId) -> Result<(), Error> {
        let path = self.record_path(session);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!("Removed progress record {}", path.display());
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(Error::ProgressStore { path, source }),
        }
    }

    fn latest_session(&self) -> Result<Option<SessionId>, Error> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(Error::ProgressStore {
                    path: self.dir.clone(),
                    source,
                })
            }
        };

        let latest = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name();
                self.session_from_file_name(&name.to_string_lossy())
            })
            .max();
        Ok(latest)
    }
}
