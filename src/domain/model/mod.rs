// Domain models - Core types and data structures

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;

/// Placeholder in output and poster names replaced by the source file stem
pub const SRC_NAME_PLACEHOLDER: &str = "{src_name}";

/// Sentinel format identifier expanding to every known format
pub const FORMAT_ALL: &str = "all";

/// Raw encode options as supplied by the user, before validation
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeOptions {
    pub source: String,
    pub output_template: String,
    pub video_bitrate: String,
    pub audio_bitrate: String,
    pub formats: Vec<String>,
    pub width: String,
    pub height: String,
    /// `None` when no poster should be captured
    pub poster: Option<String>,
    pub poster_time: String,
    pub only_poster: bool,
    pub verbose: bool,
    pub show_progress: bool,
    pub timeout_secs: u64,
    pub extra_options: Vec<String>,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            source: String::new(),
            output_template: format!("{}-html5", SRC_NAME_PLACEHOLDER),
            video_bitrate: "700k".to_string(),
            audio_bitrate: "128k".to_string(),
            formats: vec![FORMAT_ALL.to_string()],
            width: "-1".to_string(),
            height: "-1".to_string(),
            poster: Some("poster".to_string()),
            poster_time: "0".to_string(),
            only_poster: false,
            verbose: false,
            show_progress: true,
            timeout_secs: 600,
            extra_options: Vec::new(),
        }
    }
}

impl EncodeOptions {
    /// Create options for a source with every other field at its default
    pub fn for_source(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }
}

/// Display flags, independent of each other
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayOptions {
    pub verbose: bool,
    pub show_progress: bool,
}

impl DisplayOptions {
    /// Whether the live progress line should be drawn
    pub fn progress_visible(&self) -> bool {
        self.verbose || self.show_progress
    }
}

/// Output formats the tool knows how to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    H264,
    Webm,
    Ogg,
}

/// Static encoder settings for one output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatDescriptor {
    pub extension: &'static str,
    pub container: &'static str,
    pub video_codec: &'static str,
    pub audio_codec: &'static str,
    pub extra_flags: &'static [&'static str],
}

const H264_DESCRIPTOR: FormatDescriptor = FormatDescriptor {
    extension: "mp4",
    container: "mp4",
    video_codec: "libx264",
    audio_codec: "aac",
    extra_flags: &["-preset", "slow", "-movflags", "+faststart"],
};

const WEBM_DESCRIPTOR: FormatDescriptor = FormatDescriptor {
    extension: "webm",
    container: "webm",
    video_codec: "libvpx",
    audio_codec: "libvorbis",
    extra_flags: &["-quality", "good", "-cpu-used", "0"],
};

const OGG_DESCRIPTOR: FormatDescriptor = FormatDescriptor {
    extension: "ogv",
    container: "ogg",
    video_codec: "libtheora",
    audio_codec: "libvorbis",
    extra_flags: &[],
};

impl Format {
    /// Every format, in the order `all` expands to
    pub const ALL: [Format; 3] = [Format::H264, Format::Webm, Format::Ogg];

    /// Parse a single format identifier (not the `all` sentinel)
    pub fn parse(identifier: &str) -> Option<Self> {
        match identifier.trim().to_lowercase().as_str() {
            "h264" => Some(Format::H264),
            "webm" => Some(Format::Webm),
            "ogg" => Some(Format::Ogg),
            _ => None,
        }
    }

    pub fn identifier(&self) -> &'static str {
        match self {
            Format::H264 => "h264",
            Format::Webm => "webm",
            Format::Ogg => "ogg",
        }
    }

    pub fn descriptor(&self) -> &'static FormatDescriptor {
        match self {
            Format::H264 => &H264_DESCRIPTOR,
            Format::Webm => &WEBM_DESCRIPTOR,
            Format::Ogg => &OGG_DESCRIPTOR,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

/// Requested output frame size; `None` on either side keeps the aspect ratio
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameSize {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl FrameSize {
    pub fn new(width: Option<u32>, height: Option<u32>) -> Self {
        Self { width, height }
    }

    /// Build from raw integers where anything non-positive means unset
    pub fn from_raw(width: i64, height: i64) -> Self {
        let side = |v: i64| u32::try_from(v).ok().filter(|v| *v > 0);
        Self::new(side(width), side(height))
    }

    /// Size directive for the transcoder: `WxH`, `Wx?`, `?xH`, or empty for source size
    pub fn size_string(&self) -> String {
        match (self.width, self.height) {
            (Some(w), Some(h)) => format!("{}x{}", w, h),
            (Some(w), None) => format!("{}x?", w),
            (None, Some(h)) => format!("?x{}", h),
            (None, None) => String::new(),
        }
    }
}

/// Poster capture settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PosterSpec {
    pub name: String,
    pub timestamp_secs: u64,
}

/// Configuration after validation and normalization
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedConfig {
    pub source: PathBuf,
    /// Absolute output path without extension
    pub output: PathBuf,
    pub video_bitrate: String,
    pub audio_bitrate: String,
    pub formats: Vec<Format>,
    pub size: FrameSize,
    pub poster: Option<PosterSpec>,
    pub only_poster: bool,
    pub display: DisplayOptions,
    pub timeout: Duration,
    pub extra_options: Vec<String>,
}

impl ValidatedConfig {
    /// Directory every output lands in
    pub fn output_directory(&self) -> PathBuf {
        self.output
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// One video rendition to encode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoJob {
    pub format: Format,
    pub source: PathBuf,
    pub output: PathBuf,
    pub video_bitrate: String,
    pub audio_bitrate: String,
    pub video_codec: String,
    pub audio_codec: String,
    pub container: String,
    pub size: String,
    pub extra_options: Vec<String>,
}

/// One still frame to capture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PosterJob {
    pub source: PathBuf,
    pub directory: PathBuf,
    pub file_name: String,
    pub timestamp_secs: u64,
    pub size: String,
}

impl PosterJob {
    pub fn output(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }
}

/// Unit of planned work
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobDescriptor {
    Video(VideoJob),
    Poster(PosterJob),
}

impl JobDescriptor {
    /// Path the job writes to
    pub fn output(&self) -> PathBuf {
        match self {
            JobDescriptor::Video(job) => job.output.clone(),
            JobDescriptor::Poster(job) => job.output(),
        }
    }
}

/// Position of the runner within the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    BeforeStart,
    At(usize),
    PastEnd,
}

/// Ordered jobs plus the cursor of the one in flight
#[derive(Debug, Clone, PartialEq)]
pub struct JobQueue {
    jobs: Vec<JobDescriptor>,
    cursor: Cursor,
}

impl JobQueue {
    pub fn new(jobs: Vec<JobDescriptor>) -> Self {
        Self {
            jobs,
            cursor: Cursor::BeforeStart,
        }
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn jobs(&self) -> &[JobDescriptor] {
        &self.jobs
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Job under the cursor, if any
    pub fn current(&self) -> Option<&JobDescriptor> {
        match self.cursor {
            Cursor::At(index) => self.jobs.get(index),
            _ => None,
        }
    }

    /// Move the cursor one step forward; it never skips or rewinds
    pub fn advance(&mut self) -> Cursor {
        let next = match self.cursor {
            Cursor::BeforeStart => 0,
            Cursor::At(index) => index + 1,
            Cursor::PastEnd => return Cursor::PastEnd,
        };
        self.cursor = if next < self.jobs.len() {
            Cursor::At(next)
        } else {
            Cursor::PastEnd
        };
        self.cursor
    }
}

/// Periodic progress report from a running encode
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    /// Percent complete, when the source duration is known
    pub percent: Option<f64>,
    pub current_fps: Option<f64>,
    pub current_kbps: Option<f64>,
    pub target_size_kb: Option<u64>,
    /// Position in the output, `HH:MM:SS.ss`
    pub timemark: String,
}

/// Captured process output of a finished encode
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
}

/// What a finished job handed back
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutput {
    Encoded(ProcessOutput),
    Captured(Vec<String>),
}

/// Substitute the `{src_name}` placeholder
pub fn resolve_template(template: &str, src_name: &str) -> String {
    template.replace(SRC_NAME_PLACEHOLDER, src_name)
}
