//! Fluent builder for a single ffmpeg invocation

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tracing::{debug, trace, warn};

use super::progress_parser::{parse_duration_line, ProgressParser};
use crate::domain::errors::TranscodeError;
use crate::domain::model::ProcessOutput;
use crate::engine::progress::ProgressHandler;

/// Lines of stderr kept for error reports
const STDERR_TAIL_LINES: usize = 20;

/// One ffmpeg run, configured with chained setters
///
/// ```no_run
/// # use html5video::adapters::exec_ffmpeg::TranscodeCommand;
/// # use std::time::Duration;
/// let command = TranscodeCommand::new("ffmpeg", "/videos/movie.mov", Duration::from_secs(600), true)
///     .with_video_bitrate("700k")
///     .with_video_codec("libvpx")
///     .with_audio_bitrate("128k")
///     .with_audio_codec("libvorbis")
///     .with_audio_channels(2)
///     .with_format("webm")
///     .with_size("640x?");
/// ```
#[derive(Debug, Clone)]
pub struct TranscodeCommand {
    program: PathBuf,
    source: PathBuf,
    timeout: Duration,
    quiet: bool,
    video_bitrate: Option<String>,
    video_codec: Option<String>,
    audio_bitrate: Option<String>,
    audio_codec: Option<String>,
    audio_channels: Option<u32>,
    format: Option<String>,
    size: Option<String>,
    extra_options: Vec<String>,
}

impl TranscodeCommand {
    /// Start a command for `source`; `quiet` keeps ffmpeg's own log out of ours
    pub fn new(
        program: impl Into<PathBuf>,
        source: impl Into<PathBuf>,
        timeout: Duration,
        quiet: bool,
    ) -> Self {
        Self {
            program: program.into(),
            source: source.into(),
            timeout,
            quiet,
            video_bitrate: None,
            video_codec: None,
            audio_bitrate: None,
            audio_codec: None,
            audio_channels: None,
            format: None,
            size: None,
            extra_options: Vec::new(),
        }
    }

    pub fn with_video_bitrate(mut self, bitrate: impl Into<String>) -> Self {
        self.video_bitrate = Some(bitrate.into());
        self
    }

    pub fn with_video_codec(mut self, codec: impl Into<String>) -> Self {
        self.video_codec = Some(codec.into());
        self
    }

    pub fn with_audio_bitrate(mut self, bitrate: impl Into<String>) -> Self {
        self.audio_bitrate = Some(bitrate.into());
        self
    }

    pub fn with_audio_codec(mut self, codec: impl Into<String>) -> Self {
        self.audio_codec = Some(codec.into());
        self
    }

    pub fn with_audio_channels(mut self, channels: u32) -> Self {
        self.audio_channels = Some(channels);
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Size string (`WxH`, `Wx?`, `?xH`); empty keeps the source size
    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        let size = size.into();
        self.size = if size.is_empty() { None } else { Some(size) };
        self
    }

    /// Flags passed through verbatim before the output path
    pub fn with_extra_options(mut self, options: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.extra_options.extend(options.into_iter().map(Into::into));
        self
    }

    fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.to_string_lossy().to_string())
    }

    /// Arguments for an encode to `output`, progress written to stdout
    pub fn encode_args(&self, output: &Path) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "-hide_banner".into(),
            "-nostdin".into(),
            "-y".into(),
            "-i".into(),
            self.source.to_string_lossy().to_string(),
        ];

        if let Some(bitrate) = &self.video_bitrate {
            args.extend(["-b:v".to_string(), bitrate.clone()]);
        }
        if let Some(codec) = &self.video_codec {
            args.extend(["-c:v".to_string(), codec.clone()]);
        }
        if let Some(bitrate) = &self.audio_bitrate {
            args.extend(["-b:a".to_string(), bitrate.clone()]);
        }
        if let Some(codec) = &self.audio_codec {
            args.extend(["-c:a".to_string(), codec.clone()]);
        }
        if let Some(channels) = self.audio_channels {
            args.extend(["-ac".to_string(), channels.to_string()]);
        }
        if let Some(filter) = self.size.as_deref().and_then(scale_filter) {
            args.extend(["-vf".to_string(), filter]);
        }
        if let Some(format) = &self.format {
            args.extend(["-f".to_string(), format.clone()]);
        }
        args.extend(self.extra_options.iter().cloned());
        args.extend([
            "-progress".to_string(),
            "pipe:1".to_string(),
            "-nostats".to_string(),
        ]);
        args.push(output.to_string_lossy().to_string());
        args
    }

    /// Arguments for grabbing one frame at `timestamp_secs`
    pub fn screenshot_args(&self, timestamp_secs: u64, output: &Path) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "-hide_banner".into(),
            "-nostdin".into(),
            "-y".into(),
            "-ss".into(),
            timestamp_secs.to_string(),
            "-i".into(),
            self.source.to_string_lossy().to_string(),
            "-frames:v".into(),
            "1".into(),
        ];
        if let Some(filter) = self.size.as_deref().and_then(scale_filter) {
            args.extend(["-vf".to_string(), filter]);
        }
        args.push(output.to_string_lossy().to_string());
        args
    }

    /// Encode to `output`, forwarding progress until ffmpeg exits
    pub async fn save(
        &self,
        output: &Path,
        progress: &dyn ProgressHandler,
    ) -> Result<ProcessOutput, TranscodeError> {
        let args = self.encode_args(output);
        self.execute(args, Some(progress)).await
    }

    /// Capture one frame into `directory/file_name`, returning the produced names
    pub async fn screenshot(
        &self,
        timestamp_secs: u64,
        directory: &Path,
        file_name: &str,
    ) -> Result<Vec<String>, TranscodeError> {
        let args = self.screenshot_args(timestamp_secs, &directory.join(file_name));
        self.execute(args, None).await?;
        Ok(vec![file_name.to_string()])
    }

    fn spawn(&self, args: &[String]) -> Result<Child, TranscodeError> {
        debug!("{} {}", self.program.display(), args.join(" "));
        Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| TranscodeError::Spawn {
                program: self.program_name(),
                source,
            })
    }

    async fn execute(
        &self,
        args: Vec<String>,
        progress: Option<&dyn ProgressHandler>,
    ) -> Result<ProcessOutput, TranscodeError> {
        let program = self.program_name();
        let mut child = self.spawn(&args)?;
        let io_error = |source| TranscodeError::Io {
            program: program.clone(),
            source,
        };

        let stdout = child.stdout.take().ok_or_else(|| {
            io_error(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "stdout not captured"))
        })?;
        let stderr = child.stderr.take().ok_or_else(|| {
            io_error(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "stderr not captured"))
        })?;

        let mut stdout_lines = BufReader::new(stdout).lines();
        let mut stderr_lines = BufReader::new(stderr).lines();
        let mut parser = ProgressParser::new();
        let mut captured = ProcessOutput::default();
        let mut stderr_tail: Vec<String> = Vec::new();

        let drain = async {
            let mut stdout_open = true;
            let mut stderr_open = true;
            while stdout_open || stderr_open {
                tokio::select! {
                    line = stdout_lines.next_line(), if stdout_open => match line? {
                        Some(line) => {
                            if let (Some(snapshot), Some(handler)) = (parser.feed_line(&line), progress) {
                                handler.on_progress(&snapshot);
                            }
                            captured.stdout.push_str(&line);
                            captured.stdout.push('\n');
                        }
                        None => stdout_open = false,
                    },
                    line = stderr_lines.next_line(), if stderr_open => match line? {
                        Some(line) => {
                            if parser.duration().is_none() {
                                if let Some(duration) = parse_duration_line(&line) {
                                    parser.set_duration(duration);
                                }
                            }
                            if !self.quiet {
                                trace!(target: "ffmpeg", "{}", line);
                            }
                            captured.stderr.push_str(&line);
                            captured.stderr.push('\n');
                            stderr_tail.push(line);
                            if stderr_tail.len() > STDERR_TAIL_LINES {
                                stderr_tail.remove(0);
                            }
                        }
                        None => stderr_open = false,
                    },
                }
            }
            child.wait().await
        };

        let result = tokio::time::timeout(self.timeout, drain).await;
        let status = match result {
            Ok(result) => result.map_err(io_error)?,
            Err(_elapsed) => {
                warn!("{} exceeded {:?}, killing it", program, self.timeout);
                if let Err(e) = child.kill().await {
                    warn!("failed to kill {}: {}", program, e);
                }
                return Err(TranscodeError::Timeout {
                    program,
                    after: self.timeout,
                });
            }
        };

        if !status.success() {
            return Err(TranscodeError::Exited {
                program,
                status: status.to_string(),
                stderr: stderr_tail.join("\n"),
            });
        }

        Ok(captured)
    }
}

/// Translate a size string into a scale filter; `?` keeps the aspect ratio
pub fn scale_filter(size: &str) -> Option<String> {
    let (width, height) = size.split_once('x')?;
    let side = |value: &str| -> Option<String> {
        match value.trim() {
            "?" => Some("-2".to_string()),
            digits if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) => {
                Some(digits.to_string())
            }
            _ => None,
        }
    };
    let (width, height) = (side(width)?, side(height)?);
    if width == "-2" && height == "-2" {
        return None;
    }
    Some(format!("scale={}:{}", width, height))
}
