//! Job planning
//!
//! Expands a validated configuration into the ordered job queue: one video
//! job per requested format, followed by the poster job when one is
//! configured.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::domain::errors::PlanningError;
use crate::domain::model::*;
use crate::ports::FsPort;

/// Extension given to poster names that do not carry one
pub const DEFAULT_POSTER_EXTENSION: &str = "png";

/// Builds job queues, creating output directories as it goes
pub struct JobPlanner {
    fs: Arc<dyn FsPort>,
}

impl JobPlanner {
    pub fn new(fs: Arc<dyn FsPort>) -> Self {
        Self { fs }
    }

    /// Plan every job for the configuration; the queue starts before its first job
    pub async fn plan(&self, config: &ValidatedConfig) -> Result<JobQueue, PlanningError> {
        let size = config.size.size_string();
        let directory = config.output_directory();
        let mut jobs = Vec::new();

        if !config.only_poster {
            for format in &config.formats {
                self.ensure_directory(&directory).await?;
                let job = Self::video_job(config, *format, &size);
                debug!(
                    "planned {} job: {} -> {} (vcodec {}, acodec {}, vbr {}, abr {}, size '{}', options {:?})",
                    format,
                    job.source.display(),
                    job.output.display(),
                    job.video_codec,
                    job.audio_codec,
                    job.video_bitrate,
                    job.audio_bitrate,
                    job.size,
                    job.extra_options
                );
                jobs.push(JobDescriptor::Video(job));
            }
        }

        if let Some(poster) = &config.poster {
            self.ensure_directory(&directory).await?;
            let job = PosterJob {
                source: config.source.clone(),
                directory: directory.clone(),
                file_name: poster_file_name(&poster.name),
                timestamp_secs: poster.timestamp_secs,
                size: size.clone(),
            };
            debug!(
                "planned poster job: {} at {}s -> {} (size '{}')",
                job.source.display(),
                job.timestamp_secs,
                job.output().display(),
                job.size
            );
            jobs.push(JobDescriptor::Poster(job));
        }

        Ok(JobQueue::new(jobs))
    }

    fn video_job(config: &ValidatedConfig, format: Format, size: &str) -> VideoJob {
        let descriptor = format.descriptor();
        let mut extra_options = config.extra_options.clone();
        extra_options.extend(descriptor.extra_flags.iter().map(|flag| flag.to_string()));

        VideoJob {
            format,
            source: config.source.clone(),
            output: with_extension(&config.output, descriptor.extension),
            video_bitrate: config.video_bitrate.clone(),
            audio_bitrate: config.audio_bitrate.clone(),
            video_codec: descriptor.video_codec.to_string(),
            audio_codec: descriptor.audio_codec.to_string(),
            container: descriptor.container.to_string(),
            size: size.to_string(),
            extra_options,
        }
    }

    async fn ensure_directory(&self, directory: &Path) -> Result<(), PlanningError> {
        self.fs
            .create_dir_all(directory)
            .await
            .map_err(|source| PlanningError::CreateDirectory {
                path: directory.to_path_buf(),
                source,
            })
    }
}

/// Append `.ext` to the path, keeping any dots already in the name
fn with_extension(base: &Path, extension: &str) -> PathBuf {
    let mut name = base.as_os_str().to_os_string();
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

fn poster_file_name(name: &str) -> String {
    if Path::new(name).extension().is_some() {
        name.to_string()
    } else {
        format!("{}.{}", name, DEFAULT_POSTER_EXTENSION)
    }
}
