// TOML config adapter - Optional settings file

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::utils::logging::LogFormat;

/// File looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "html5video.toml";

/// Failures loading a settings file
#[derive(Error, Debug)]
pub enum ConfigFileError {
    #[error("Config file does not exist: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse TOML config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Settings read from a TOML file; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileSettings {
    pub transcoder: TranscoderSection,
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TranscoderSection {
    /// Path to the ffmpeg binary
    pub ffmpeg: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSection {
    pub format: Option<LogFormat>,
}

/// TOML configuration adapter
pub struct TomlConfigAdapter;

impl TomlConfigAdapter {
    /// Parse settings from TOML text
    pub fn parse(content: &str, origin: &Path) -> Result<FileSettings, ConfigFileError> {
        toml::from_str(content).map_err(|source| ConfigFileError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Load an explicitly named file; it must exist
    pub fn load(path: &Path) -> Result<FileSettings, ConfigFileError> {
        if !path.exists() {
            return Err(ConfigFileError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigFileError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    /// Load `html5video.toml` from `dir` if present
    pub fn load_default(dir: &Path) -> Result<Option<FileSettings>, ConfigFileError> {
        let path = dir.join(DEFAULT_CONFIG_FILE);
        if path.is_file() {
            Self::load(&path).map(Some)
        } else {
            Ok(None)
        }
    }
}
