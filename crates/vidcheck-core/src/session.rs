use chrono::{Local, NaiveDateTime};
use std::collections::BTreeSet;
use std::fmt;

const SESSION_ID_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Timestamp-qualified key shared by a run's report and progress record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn now() -> Self {
        SessionId(Local::now().format(SESSION_ID_FORMAT).to_string())
    }

    /// Accepts only ids in `YYYYMMDD-HHMMSS` form.
    pub fn parse(id: &str) -> Option<Self> {
        NaiveDateTime::parse_from_str(id, SESSION_ID_FORMAT)
            .ok()
            .map(|_| SessionId(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `<prefix>_<id>.txt`
    pub fn report_file_name(&self, prefix: &str) -> String {
        format!("{}_{}.txt", prefix, self.0)
    }

    /// `.<prefix>_progress_<id>.txt`
    pub fn progress_file_name(&self, prefix: &str) -> String {
        format!(".{}_progress_{}.txt", prefix, self.0)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Paths already processed in one resumable run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSession {
    id: SessionId,
    processed: BTreeSet<String>,
}

impl ScanSession {
    pub fn new(id: SessionId) -> Self {
        Self::with_processed(id, BTreeSet::new())
    }

    pub fn with_processed(id: SessionId, processed: BTreeSet<String>) -> Self {
        Self { id, processed }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn is_processed(&self, path: &str) -> bool {
        self.processed.contains(path)
    }

    /// Returns `false` if the path was already recorded.
    pub fn mark_processed(&mut self, path: &str) -> bool {
        self.processed.insert(path.to_string())
    }

    pub fn processed(&self) -> &BTreeSet<String> {
        &self.processed
    }

    pub fn len(&self) -> usize {
        self.processed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_names() {
        let id = SessionId::parse("20240131-235959").unwrap();
        assert_eq!(id.report_file_name("video_report"), "video_report_20240131-235959.txt");
        assert_eq!(
            id.progress_file_name("video_report"),
            ".video_report_progress_20240131-235959.txt"
        );
    }

    #[test]
    fn test_parse_rejects_malformed_ids() {
        assert!(SessionId::parse("20240131").is_none());
        assert!(SessionId::parse("2024-01-31 23:59:59").is_none());
        assert!(SessionId::parse("20241399-000000").is_none());
    }

    #[test]
    fn test_now_round_trips_through_parse() {
        let id = SessionId::now();
        assert_eq!(SessionId::parse(id.as_str()), Some(id));
    }

    #[test]
    fn test_mark_processed_once() {
        let mut session = ScanSession::new(SessionId::now());
        assert!(session.mark_processed("/videos/a.mp4"));
        assert!(!session.mark_processed("/videos/a.mp4"));
        assert_eq!(session.len(), 1);
        assert!(session.is_processed("/videos/a.mp4"));
    }
}
