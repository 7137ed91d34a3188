//! Configuration initialization and hierarchy management
//!
//! Precedence: CLI > environment (through clap's `env`) > settings file > defaults.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::adapters::toml_config::{ConfigFileError, FileSettings, TomlConfigAdapter};
use crate::cli::Cli;
use crate::utils::logging::LogFormat;

/// Binary used when nothing else names one
pub const DEFAULT_FFMPEG: &str = "ffmpeg";

/// Process-wide settings outside of the encode options themselves
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub ffmpeg: PathBuf,
    pub log_format: LogFormat,
    /// Settings file that was applied, if any
    pub source_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from(DEFAULT_FFMPEG),
            log_format: LogFormat::default(),
            source_file: None,
        }
    }
}

/// Resolve settings for this invocation, looking for the default file in `cwd`
pub fn initialize_configuration_hierarchy(cli: &Cli, cwd: &Path) -> Result<Settings, ConfigFileError> {
    let (file, source_file) = match &cli.config {
        Some(path) => (Some(TomlConfigAdapter::load(path)?), Some(path.clone())),
        None => {
            let file = TomlConfigAdapter::load_default(cwd)?;
            let origin = file
                .as_ref()
                .map(|_| cwd.join(crate::adapters::toml_config::DEFAULT_CONFIG_FILE));
            (file, origin)
        }
    };

    let settings = merge(cli, file.unwrap_or_default(), source_file);
    debug!("Resolved settings: {:?}", settings);
    Ok(settings)
}

fn merge(cli: &Cli, file: FileSettings, source_file: Option<PathBuf>) -> Settings {
    let defaults = Settings::default();
    Settings {
        ffmpeg: cli
            .ffmpeg
            .clone()
            .or(file.transcoder.ffmpeg)
            .unwrap_or(defaults.ffmpeg),
        log_format: cli
            .log_format
            .or(file.logging.format)
            .unwrap_or(defaults.log_format),
        source_file,
    }
}
