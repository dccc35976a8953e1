use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Required tool not found: {0}")]
    ToolNotFound(String),

    #[error("Progress record {}: {source}", path.display())]
    ProgressStore { path: PathBuf, source: io::Error },

    #[error("Report file {}: {source}", path.display())]
    Report { path: PathBuf, source: io::Error },
}
