pub mod progress;
pub mod report;

pub use progress::{FileProgressStore, ProgressStore};
pub use report::{FileReport, ReportEntry, ReportSink};
