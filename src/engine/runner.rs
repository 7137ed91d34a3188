//! Sequential job runner
//!
//! Drives a [`JobQueue`] to completion one job at a time:
//! `Idle -> Running(i) -> Running(i + 1) | Done | Failed`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, error};

use crate::domain::errors::TranscodeError;
use crate::domain::model::{Cursor, JobDescriptor, JobOutput, JobQueue};
use crate::engine::progress::Reporting;
use crate::ports::TranscoderPort;

/// What to do when the transcoder reports a failed job
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop the run at the first failed job
    #[default]
    Abort,
    /// Report the failure and carry on with the next job
    Continue,
}

/// Runner state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    Idle,
    Running(usize),
    Done,
    Failed,
}

/// Outcome of a finished run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Outputs of jobs that completed, in queue order
    pub completed: Vec<PathBuf>,
    /// Outputs of jobs that failed under [`FailurePolicy::Continue`]
    pub failed: Vec<PathBuf>,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// A job failed and the run was aborted
#[derive(Error, Debug)]
#[error("job {index} ({}) failed: {source}", output.display())]
pub struct RunError {
    pub index: usize,
    pub output: PathBuf,
    #[source]
    pub source: TranscodeError,
}

/// Runs planned jobs against a transcoder, strictly one at a time
pub struct JobRunner {
    queue: JobQueue,
    transcoder: Arc<dyn TranscoderPort>,
    reporting: Reporting,
    timeout: Duration,
    policy: FailurePolicy,
    state: RunnerState,
    summary: RunSummary,
}

impl JobRunner {
    pub fn new(
        queue: JobQueue,
        transcoder: Arc<dyn TranscoderPort>,
        reporting: Reporting,
        timeout: Duration,
    ) -> Self {
        Self {
            queue,
            transcoder,
            reporting,
            timeout,
            policy: FailurePolicy::default(),
            state: RunnerState::Idle,
            summary: RunSummary::default(),
        }
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn state(&self) -> RunnerState {
        self.state
    }

    /// Run every job in order, then fire the run completion handler once
    pub async fn run(mut self) -> Result<RunSummary, RunError> {
        self.start();
        while let RunnerState::Running(index) = self.state {
            self.step(index).await?;
        }
        Ok(self.summary)
    }

    /// Move to the first job, or straight to `Done` for an empty queue
    pub fn start(&mut self) {
        if self.state != RunnerState::Idle {
            return;
        }
        debug!("starting {} job(s)", self.queue.len());
        self.apply_cursor();
    }

    /// Dispatch the job at `index`, notify, then advance
    async fn step(&mut self, index: usize) -> Result<(), RunError> {
        let job = match self.queue.current() {
            Some(job) => job.clone(),
            None => {
                self.advance();
                return Ok(());
            }
        };

        match self.dispatch(&job).await {
            Ok(output) => {
                self.reporting.job_complete.on_job_complete(&job, &output);
                self.summary.completed.push(job.output());
            }
            Err(source) => match self.policy {
                FailurePolicy::Abort => {
                    self.reporting.job_complete.on_job_failed(&job, &source);
                    error!("aborting run after job {} of {}", index + 1, self.queue.len());
                    self.state = RunnerState::Failed;
                    return Err(RunError {
                        index,
                        output: job.output(),
                        source,
                    });
                }
                FailurePolicy::Continue => {
                    self.reporting.job_complete.on_job_failed(&job, &source);
                    self.summary.failed.push(job.output());
                }
            },
        }

        self.advance();
        Ok(())
    }

    async fn dispatch(&self, job: &JobDescriptor) -> Result<JobOutput, TranscodeError> {
        match job {
            JobDescriptor::Video(video) => {
                debug!("encoding {} ({})", video.output.display(), video.format);
                self.transcoder
                    .encode(video, self.timeout, self.reporting.progress.as_ref())
                    .await
                    .map(JobOutput::Encoded)
            }
            JobDescriptor::Poster(poster) => {
                debug!(
                    "capturing {} at {}s",
                    poster.output().display(),
                    poster.timestamp_secs
                );
                self.transcoder
                    .capture_frame(poster, self.timeout)
                    .await
                    .map(JobOutput::Captured)
            }
        }
    }

    /// Advance the cursor; past the end the run is done
    fn advance(&mut self) {
        if matches!(self.state, RunnerState::Done | RunnerState::Failed) {
            return;
        }
        self.apply_cursor();
    }

    fn apply_cursor(&mut self) {
        match self.queue.advance() {
            Cursor::At(index) => self.state = RunnerState::Running(index),
            Cursor::PastEnd | Cursor::BeforeStart => {
                self.state = RunnerState::Done;
                self.reporting.run_complete.on_run_complete(&self.summary);
            }
        }
    }
}
