//! Command-line argument definitions

use clap::{ArgAction, Args, ValueEnum};

use crate::domain::model::EncodeOptions;

/// How progress is printed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ProgressFormat {
    /// Single rewritten status line
    #[default]
    Console,
    /// One JSON object per progress event on stdout
    Json,
}

/// Timeouts are whole, positive seconds
fn positive_seconds(s: &str) -> Result<u64, String> {
    clap_num::number_range(s, 1, u64::MAX)
}

/// Arguments describing one encode run
#[derive(Args, Debug, Clone)]
pub struct EncodeArgs {
    /// Path to source video
    #[arg(short = 's', long = "src")]
    pub src: String,

    /// Name of output video(s), `{src_name}` is replaced by the source name
    #[arg(short = 'o', long = "out", default_value = "{src_name}-html5")]
    pub out: String,

    /// Video bitrate to encode at, in kilobits (e.g. 700k)
    #[arg(long = "videobitrate", visible_alias = "vbr", default_value = "700k")]
    pub video_bitrate: String,

    /// Audio bitrate to encode at, in kilobits (e.g. 128k)
    #[arg(long = "audiobitrate", visible_alias = "abr", default_value = "128k")]
    pub audio_bitrate: String,

    /// Comma-separated list of formats (h264, webm, ogg or all)
    #[arg(short = 'f', long = "formats", default_value = "all")]
    pub formats: String,

    /// Width of output video in pixels (-1 keeps the aspect ratio)
    #[arg(short = 'w', long = "width", default_value = "-1", allow_hyphen_values = true)]
    pub width: String,

    /// Height of output video in pixels (-1 keeps the aspect ratio)
    #[arg(short = 'H', long = "height", default_value = "-1", allow_hyphen_values = true)]
    pub height: String,

    /// Name of poster image, `{src_name}` is replaced by the source name
    #[arg(short = 'p', long = "poster", default_value = "poster")]
    pub poster: String,

    /// Do not capture a poster image
    #[arg(long = "no-poster", conflicts_with = "only_poster")]
    pub no_poster: bool,

    /// Timestamp, in seconds, to take poster image at
    #[arg(short = 't', long = "postertime", default_value = "0")]
    pub poster_time: String,

    /// Only capture the poster image
    #[arg(long = "onlyposter")]
    pub only_poster: bool,

    /// Timeout of each spawned ffmpeg process, in seconds
    #[arg(short = 'i', long = "timeout", default_value = "600", value_parser = positive_seconds)]
    pub timeout: u64,

    /// Comma-separated extra ffmpeg options passed through to every encode
    #[arg(short = 'n', long = "options", default_value = "", allow_hyphen_values = true)]
    pub options: String,

    /// Print extra output to console
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Like 'verbose', but just shows encoding progress
    #[arg(
        long = "progress",
        default_value_t = true,
        default_missing_value = "true",
        num_args = 0..=1,
        action = ArgAction::Set
    )]
    pub progress: bool,

    /// Progress output style
    #[arg(long = "progress-format", value_enum, default_value_t = ProgressFormat::Console)]
    pub progress_format: ProgressFormat,

    /// Keep encoding the remaining formats when one fails
    #[arg(long = "keep-going")]
    pub keep_going: bool,
}

/// Split a comma list, trimming entries and dropping empty ones
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

impl EncodeArgs {
    /// Convert to raw encode options for validation
    pub fn to_options(&self) -> EncodeOptions {
        EncodeOptions {
            source: self.src.clone(),
            output_template: self.out.clone(),
            video_bitrate: self.video_bitrate.clone(),
            audio_bitrate: self.audio_bitrate.clone(),
            formats: split_list(&self.formats),
            width: self.width.clone(),
            height: self.height.clone(),
            poster: if self.no_poster {
                None
            } else {
                Some(self.poster.clone())
            },
            poster_time: self.poster_time.clone(),
            only_poster: self.only_poster,
            verbose: self.verbose,
            show_progress: self.progress,
            timeout_secs: self.timeout,
            extra_options: split_list(&self.options),
        }
    }
}
