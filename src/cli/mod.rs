//! CLI module for html5video
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::Parser;

use crate::utils::logging::LogFormat;

pub mod args;
pub mod commands;

pub use args::{EncodeArgs, ProgressFormat};

const AFTER_HELP: &str = "\
Formats
-------
  - h264  (.mp4, libx264 + aac)
  - webm  (.webm, libvpx + libvorbis)
  - ogg   (.ogv, libtheora + libvorbis)
  - all   (default)

  # single format
  html5video --src myvid.mov --out vid --formats h264
  # multiple formats
  html5video --src myvid.mov --out vid --formats webm,ogg

Size
----
  Size can be specified in one of four ways:
  1. Use the defaults. The output video will be the same size as the source.
  2. Specify width. Height will be scaled to maintain aspect ratio.
  3. Specify height. Width will be scaled to maintain aspect ratio.
  4. Specify width and height.

  All sizes are in pixels.";

/// html5video
///
/// Encode a source video into web-ready h264, webm and ogg renditions plus a
/// poster image, using ffmpeg.
#[derive(Parser, Debug)]
#[command(name = "html5video")]
#[command(about = "Encode a video into HTML5-ready formats with ffmpeg")]
#[command(version)]
#[command(after_help = AFTER_HELP)]
pub struct Cli {
    #[command(flatten)]
    pub encode: EncodeArgs,

    /// Path to the ffmpeg binary
    #[arg(long, env = "HTML5VIDEO_FFMPEG")]
    pub ffmpeg: Option<PathBuf>,

    /// Settings file (TOML); html5video.toml in the working directory is used if present
    #[arg(long, env = "HTML5VIDEO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log output format
    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,
}
