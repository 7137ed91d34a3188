// Domain rules - Option validation

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use crate::domain::errors::ValidationError;
use crate::domain::model::*;
use crate::ports::FsPort;

/// Checks raw encode options and normalizes them into a [`ValidatedConfig`]
///
/// Rules run in a fixed order and the first violation is returned; later
/// rules are not evaluated.
pub struct OptionValidator;

impl OptionValidator {
    /// Validate options, touching the filesystem only to check the source exists
    pub async fn validate(
        opts: &EncodeOptions,
        fs: &dyn FsPort,
    ) -> Result<ValidatedConfig, ValidationError> {
        let source = Self::resolve_source(&opts.source, fs).await?;
        let src_name = source
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_default();

        let output = Self::resolve_output(&opts.output_template, &src_name, &source, fs).await?;

        Self::check_bitrate("videobitrate", &opts.video_bitrate, "700k")?;
        Self::check_bitrate("audiobitrate", &opts.audio_bitrate, "128k")?;

        let formats = Self::normalize_formats(&opts.formats)?;

        let width = Self::parse_dimension("Width", &opts.width)?;
        let height = Self::parse_dimension("Height", &opts.height)?;

        let poster_name = match &opts.poster {
            Some(template) => {
                let name = resolve_template(template, &src_name);
                if name.trim().is_empty() {
                    return Err(ValidationError::InvalidPosterName);
                }
                Some(name)
            }
            None => None,
        };

        let timestamp_secs = opts
            .poster_time
            .trim()
            .parse::<u64>()
            .map_err(|_| ValidationError::InvalidPosterTimestamp(opts.poster_time.clone()))?;

        if opts.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }

        let config = ValidatedConfig {
            source,
            output,
            video_bitrate: opts.video_bitrate.clone(),
            audio_bitrate: opts.audio_bitrate.clone(),
            formats,
            size: FrameSize::from_raw(width, height),
            poster: poster_name.map(|name| PosterSpec {
                name,
                timestamp_secs,
            }),
            only_poster: opts.only_poster,
            display: DisplayOptions {
                verbose: opts.verbose,
                show_progress: opts.show_progress,
            },
            timeout: Duration::from_secs(opts.timeout_secs),
            extra_options: opts.extra_options.clone(),
        };

        debug!("Validated configuration: {:?}", config);
        Ok(config)
    }

    async fn resolve_source(source: &str, fs: &dyn FsPort) -> Result<PathBuf, ValidationError> {
        let invalid = || ValidationError::InvalidSource {
            source_arg: source.to_string(),
        };

        if source.trim().is_empty() {
            return Err(invalid());
        }

        let path = Self::absolutize(Path::new(source), fs)
            .await
            .ok_or_else(invalid)?;

        if !fs.is_regular_file(&path).await {
            return Err(invalid());
        }
        Ok(path)
    }

    async fn resolve_output(
        template: &str,
        src_name: &str,
        source: &Path,
        fs: &dyn FsPort,
    ) -> Result<PathBuf, ValidationError> {
        let resolved = resolve_template(template, src_name);
        if resolved.trim().is_empty() {
            return Err(ValidationError::InvalidOutput);
        }

        match Self::absolutize(Path::new(&resolved), fs).await {
            Some(path) => Ok(path),
            // Without a working directory, fall back to the source's directory
            None => Ok(source
                .parent()
                .map(|dir| dir.join(&resolved))
                .unwrap_or_else(|| PathBuf::from(&resolved))),
        }
    }

    async fn absolutize(path: &Path, fs: &dyn FsPort) -> Option<PathBuf> {
        if path.is_absolute() {
            return Some(path.to_path_buf());
        }
        fs.current_dir().await.ok().map(|cwd| cwd.join(path))
    }

    /// Bitrates are `<digits>k`, suffix case-insensitive
    fn check_bitrate(
        field: &'static str,
        value: &str,
        example: &'static str,
    ) -> Result<(), ValidationError> {
        let trimmed = value.trim();
        let digits = trimmed
            .strip_suffix('k')
            .or_else(|| trimmed.strip_suffix('K'));

        match digits {
            Some(d) if !d.is_empty() && d.chars().all(|c| c.is_ascii_digit()) => Ok(()),
            _ => Err(ValidationError::InvalidBitrate {
                field,
                value: value.to_string(),
                example,
            }),
        }
    }

    fn normalize_formats(requested: &[String]) -> Result<Vec<Format>, ValidationError> {
        let first = match requested.first() {
            Some(first) => first,
            None => {
                return Err(ValidationError::InvalidFormats(
                    "You must specify at least one format in 'formats'.".to_string(),
                ))
            }
        };

        if first.trim().eq_ignore_ascii_case(FORMAT_ALL) {
            return Ok(Format::ALL.to_vec());
        }

        requested
            .iter()
            .map(|identifier| {
                Format::parse(identifier).ok_or_else(|| {
                    ValidationError::InvalidFormats(format!(
                        "Format '{}' is not a valid format. Use help to see the list of valid formats.",
                        identifier
                    ))
                })
            })
            .collect()
    }

    fn parse_dimension(dimension: &'static str, value: &str) -> Result<i64, ValidationError> {
        value
            .trim()
            .parse::<i64>()
            .map_err(|_| ValidationError::InvalidDimension {
                dimension,
                value: value.to_string(),
            })
    }
}

#[cfg(test)]
mod tests;
