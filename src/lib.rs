//! html5video
//!
//! Encodes a source video into web-ready h264, webm and ogg renditions and
//! captures a poster image, by driving an external ffmpeg binary one job at
//! a time.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod engine;
pub mod error;
pub mod planner;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use domain::errors::{PlanningError, TranscodeError, ValidationError};
pub use domain::model::{EncodeOptions, Format, JobDescriptor, JobQueue, ValidatedConfig};
pub use error::{Html5VideoError, Html5VideoResult};
