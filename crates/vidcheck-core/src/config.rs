use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::probe::SamplingPolicy;

/// Video container suffixes recognised by discovery, matched case-insensitively.
pub const VIDEO_EXTENSIONS: &[&str] = &[
    ".mp4", ".avi", ".mov", ".mkv", ".flv", ".wmv", ".webm", ".m4v", ".mpeg", ".mpg", ".3gp",
    ".ts", ".mts", ".m2ts", ".vob", ".ogv", ".drc", ".mxf", ".rmvb", ".swf", ".divx",
];

pub const DEFAULT_OUTPUT_PREFIX: &str = "video_report";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub output_prefix: String,
    pub output_dir: PathBuf,
    pub extensions: Vec<String>,
    pub ignore_patterns: Vec<String>,
    pub sampling: SamplingPolicy,
    pub ffprobe_path: Option<PathBuf>,
    pub ffmpeg_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_prefix: DEFAULT_OUTPUT_PREFIX.to_string(),
            output_dir: PathBuf::from("."),
            extensions: VIDEO_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
            ignore_patterns: Vec::new(),
            sampling: SamplingPolicy::default(),
            ffprobe_path: None,
            ffmpeg_path: None,
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output_prefix.trim().is_empty() {
            return Err(ConfigError::Message("output_prefix must not be empty".into()));
        }
        if self.extensions.is_empty() {
            return Err(ConfigError::Message("extensions must list at least one suffix".into()));
        }
        if self.sampling.checkpoints == 0 {
            return Err(ConfigError::Message("sampling.checkpoints must be at least 1".into()));
        }
        if self.sampling.window == 0 {
            return Err(ConfigError::Message("sampling.window must be at least 1".into()));
        }
        Ok(())
    }
}

/// Load `Config.toml` (or `config_file` when given), then overlay `VIDCHECK_*`
/// environment variables. Every key is optional.
pub fn load_configuration(config_file: Option<&Path>) -> Result<AppConfig, Error> {
    let file_source = match config_file {
        Some(path) => ConfigFile::from(path).required(true),
        None => ConfigFile::with_name("Config").required(false),
    };

    let builder = Config::builder()
        .add_source(file_source)
        .add_source(
            Environment::with_prefix("VIDCHECK")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("extensions")
                .with_list_parse_key("ignore_patterns"),
        )
        .build()?;

    let config = builder.try_deserialize::<AppConfig>()?;
    config.validate()?;
    Ok(config)
}
