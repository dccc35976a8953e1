use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "vidcheck")]
#[command(about = "Audit a directory tree of videos for corruption by sampled decoding", long_about = None)]
pub struct Cli {
    /// Directory to scan recursively
    pub directory: PathBuf,

    /// Base name for the report and progress files
    #[arg(long, value_name = "PREFIX")]
    pub output: Option<String>,

    /// Directory the report and progress files are written to
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Skip files already processed by an interrupted session
    #[arg(long)]
    pub resume: bool,

    /// Session to resume (YYYYMMDD-HHMMSS); defaults to the most recent one
    #[arg(long, value_name = "ID", requires = "resume")]
    pub session: Option<String>,

    /// Configuration file to use instead of ./Config.toml
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["vidcheck", "/media"]).unwrap();
        assert_eq!(cli.directory, PathBuf::from("/media"));
        assert_eq!(cli.output, None);
        assert!(!cli.resume);
    }

    #[test]
    fn test_session_requires_resume() {
        assert!(Cli::try_parse_from(["vidcheck", "/media", "--session", "20240101-000000"]).is_err());
        let cli = Cli::try_parse_from([
            "vidcheck",
            "/media",
            "--resume",
            "--session",
            "20240101-000000",
            "--output",
            "archive",
        ])
        .unwrap();
        assert!(cli.resume);
        assert_eq!(cli.session.as_deref(), Some("20240101-000000"));
        assert_eq!(cli.output.as_deref(), Some("archive"));
    }

    #[test]
    fn test_directory_is_required() {
        assert!(Cli::try_parse_from(["vidcheck"]).is_err());
    }
}
