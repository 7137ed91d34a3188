// Domain errors - Error types for the domain layer

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Option validation failures, one per rule checked by the validator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Source does not name an existing regular file
    #[error("'{source_arg}' is not a file and could not be processed. Please check that '{source_arg}' is a valid file and try again.")]
    InvalidSource { source_arg: String },

    /// Output name resolved to an empty string
    #[error("You must specify a name for the output videos.")]
    InvalidOutput,

    /// Bitrate is missing its kilobit suffix
    #[error("'{field}' expected to be in kilobits. Should end with 'k', e.g., '{example}'. Got '{value}'.")]
    InvalidBitrate {
        field: &'static str,
        value: String,
        example: &'static str,
    },

    /// Requested format list is empty or holds an unknown format
    #[error("{0}")]
    InvalidFormats(String),

    /// Width or height is not an integer
    #[error("{dimension} '{value}' cannot be interpreted as an integer value.")]
    InvalidDimension {
        dimension: &'static str,
        value: String,
    },

    /// Poster name resolved to an empty string
    #[error("You must specify a name for the poster image.")]
    InvalidPosterName,

    /// Poster timestamp is not a whole number of seconds
    #[error("Poster time '{0}' must be a whole number of seconds.")]
    InvalidPosterTimestamp(String),

    /// Timeout bound of zero
    #[error("Timeout must be a positive number of seconds.")]
    InvalidTimeout,
}

/// Failures while turning a validated configuration into jobs
#[derive(Error, Debug)]
pub enum PlanningError {
    #[error("Failed to create output directory '{}': {source}", path.display())]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures reported by the external transcoder
#[derive(Error, Debug)]
pub enum TranscodeError {
    /// Transcoder binary could not be started
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Reading the child's pipes or waiting on it failed
    #[error("I/O error while running {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Transcoder exited unsuccessfully
    #[error("{program} exited with status {status}: {stderr}")]
    Exited {
        program: String,
        status: String,
        stderr: String,
    },

    /// Transcoder exceeded its time bound and was killed
    #[error("{program} timed out after {after:?}")]
    Timeout { program: String, after: Duration },
}
