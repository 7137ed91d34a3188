//! Error handling module for html5video

use thiserror::Error;

use crate::adapters::toml_config::ConfigFileError;
use crate::domain::errors::{PlanningError, ValidationError};
use crate::engine::runner::RunError;

/// Main error type for html5video operations
#[derive(Error, Debug)]
pub enum Html5VideoError {
    /// Options failed validation; nothing was planned or run
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Output directory could not be created
    #[error(transparent)]
    Planning(#[from] PlanningError),

    /// Transcoder failed and the run was aborted
    #[error(transparent)]
    Run(#[from] RunError),

    /// Run finished but some jobs failed
    #[error("{failed} of {total} jobs failed")]
    JobsFailed { failed: usize, total: usize },

    /// Settings file problem
    #[error(transparent)]
    Config(#[from] ConfigFileError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Html5VideoError {
    /// Process exit status for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            Html5VideoError::Validation(_) => 2,
            Html5VideoError::Planning(_) => 3,
            Html5VideoError::Run(_) | Html5VideoError::JobsFailed { .. } => 4,
            Html5VideoError::Config(_) | Html5VideoError::Io(_) => 1,
        }
    }
}

/// Result type alias for html5video operations
pub type Html5VideoResult<T> = std::result::Result<T, Html5VideoError>;
