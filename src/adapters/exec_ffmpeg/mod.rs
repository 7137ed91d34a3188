//! FFmpeg execution adapter
//!
//! Runs the `ffmpeg` binary as a child process, one invocation per job.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::errors::TranscodeError;
use crate::domain::model::{PosterJob, ProcessOutput, VideoJob};
use crate::engine::progress::ProgressHandler;
use crate::ports::TranscoderPort;

pub mod command;
pub mod progress_parser;

pub use command::{scale_filter, TranscodeCommand};
pub use progress_parser::ProgressParser;

/// Channel count every rendition is encoded with
pub const AUDIO_CHANNELS: u32 = 2;

/// FFmpeg-based transcoder adapter
#[derive(Debug, Clone)]
pub struct FfmpegAdapter {
    program: PathBuf,
    verbose: bool,
}

impl FfmpegAdapter {
    /// Create adapter for the given ffmpeg binary
    pub fn new(program: impl Into<PathBuf>, verbose: bool) -> Self {
        Self {
            program: program.into(),
            verbose,
        }
    }

    /// Command configured for an encode job
    pub fn encode_command(&self, job: &VideoJob, timeout: Duration) -> TranscodeCommand {
        TranscodeCommand::new(&self.program, &job.source, timeout, !self.verbose)
            .with_video_bitrate(&job.video_bitrate)
            .with_video_codec(&job.video_codec)
            .with_audio_bitrate(&job.audio_bitrate)
            .with_audio_codec(&job.audio_codec)
            .with_audio_channels(AUDIO_CHANNELS)
            .with_format(&job.container)
            .with_size(&job.size)
            .with_extra_options(job.extra_options.iter().cloned())
    }

    /// Command configured for a poster job
    pub fn screenshot_command(&self, job: &PosterJob, timeout: Duration) -> TranscodeCommand {
        TranscodeCommand::new(&self.program, &job.source, timeout, !self.verbose)
            .with_size(&job.size)
    }
}

#[async_trait]
impl TranscoderPort for FfmpegAdapter {
    async fn encode(
        &self,
        job: &VideoJob,
        timeout: Duration,
        progress: &dyn ProgressHandler,
    ) -> Result<ProcessOutput, TranscodeError> {
        self.encode_command(job, timeout)
            .save(&job.output, progress)
            .await
    }

    async fn capture_frame(
        &self,
        job: &PosterJob,
        timeout: Duration,
    ) -> Result<Vec<String>, TranscodeError> {
        self.screenshot_command(job, timeout)
            .screenshot(job.timestamp_secs, &job.directory, &job.file_name)
            .await
    }
}
