// Ports - Interface definitions (contracts)

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::errors::TranscodeError;
use crate::domain::model::{PosterJob, ProcessOutput, VideoJob};
use crate::engine::progress::ProgressHandler;

/// Port for the external transcoder
///
/// Implementations run exactly one invocation per call and must not return
/// before the invocation has finished, failed, or hit its time bound.
#[async_trait]
pub trait TranscoderPort: Send + Sync {
    /// Encode one video rendition, reporting progress while it runs
    async fn encode(
        &self,
        job: &VideoJob,
        timeout: Duration,
        progress: &dyn ProgressHandler,
    ) -> Result<ProcessOutput, TranscodeError>;

    /// Capture a single still frame, returning the produced file names
    async fn capture_frame(
        &self,
        job: &PosterJob,
        timeout: Duration,
    ) -> Result<Vec<String>, TranscodeError>;
}

/// Port for file system operations
#[async_trait]
pub trait FsPort: Send + Sync {
    /// Directory relative paths are resolved against
    async fn current_dir(&self) -> std::io::Result<PathBuf>;

    /// Whether the path names an existing regular file
    async fn is_regular_file(&self, path: &Path) -> bool;

    /// Create directory (including parent directories)
    async fn create_dir_all(&self, path: &Path) -> std::io::Result<()>;
}
