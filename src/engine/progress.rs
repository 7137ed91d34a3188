//! Progress and completion reporting for encode runs
//!
//! The runner talks to three independent handler slots. Each has a console
//! default; any of them can be swapped out when the runner is built.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info};

use crate::domain::errors::TranscodeError;
use crate::domain::model::{DisplayOptions, JobDescriptor, JobOutput, ProgressSnapshot};
use crate::engine::runner::RunSummary;

/// Receives periodic snapshots while a video job encodes
pub trait ProgressHandler: Send + Sync {
    fn on_progress(&self, snapshot: &ProgressSnapshot);
}

/// Notified once per finished job
///
/// Handlers only observe. Advancing to the next job is always done by the
/// runner after the handler returns.
pub trait JobCompletionHandler: Send + Sync {
    fn on_job_complete(&self, job: &JobDescriptor, output: &JobOutput);

    /// Called instead of `on_job_complete` when a job failed and the run continues
    fn on_job_failed(&self, job: &JobDescriptor, error: &TranscodeError) {
        error!("failed {}: {}", job.output().display(), error);
    }
}

/// Notified once after the last job
pub trait RunCompletionHandler: Send + Sync {
    fn on_run_complete(&self, summary: &RunSummary);
}

/// The three handler slots a runner reports through
#[derive(Clone)]
pub struct Reporting {
    pub progress: Arc<dyn ProgressHandler>,
    pub job_complete: Arc<dyn JobCompletionHandler>,
    pub run_complete: Arc<dyn RunCompletionHandler>,
}

impl Reporting {
    /// Console defaults sharing one progress line
    pub fn console(display: DisplayOptions, line: ProgressLine) -> Self {
        Self {
            progress: Arc::new(ConsoleProgressHandler::new(display, line.clone())),
            job_complete: Arc::new(ConsoleCompletionHandler::new(line)),
            run_complete: Arc::new(ConsoleRunCompletionHandler),
        }
    }

    /// Console completion messages with JSON progress events
    pub fn json(display: DisplayOptions, line: ProgressLine) -> Self {
        Self {
            progress: Arc::new(JsonProgressHandler::new(display.progress_visible())),
            ..Self::console(display, line)
        }
    }

    /// Report nothing
    pub fn silent() -> Self {
        Self {
            progress: Arc::new(NoOpProgressHandler),
            job_complete: Arc::new(NoOpProgressHandler),
            run_complete: Arc::new(NoOpProgressHandler),
        }
    }

    pub fn with_progress(mut self, handler: Arc<dyn ProgressHandler>) -> Self {
        self.progress = handler;
        self
    }

    pub fn with_job_complete(mut self, handler: Arc<dyn JobCompletionHandler>) -> Self {
        self.job_complete = handler;
        self
    }

    pub fn with_run_complete(mut self, handler: Arc<dyn RunCompletionHandler>) -> Self {
        self.run_complete = handler;
        self
    }
}

/// State of the single rewritable terminal line used for progress
#[derive(Clone, Default)]
pub struct ProgressLine {
    dirty: Arc<AtomicBool>,
}

impl ProgressLine {
    const CLEAR: &'static str = "\r\x1b[2K";

    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the line's contents
    pub fn rewrite(&self, text: &str) {
        let mut stderr = std::io::stderr().lock();
        let _ = write!(stderr, "{}{}", Self::CLEAR, text);
        let _ = stderr.flush();
        self.dirty.store(true, Ordering::SeqCst);
    }

    /// Wipe the line if something was drawn on it
    pub fn clear(&self) {
        if self.dirty.swap(false, Ordering::SeqCst) {
            let mut stderr = std::io::stderr().lock();
            let _ = write!(stderr, "{}", Self::CLEAR);
            let _ = stderr.flush();
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }
}

/// Render a snapshot as one status line
pub fn format_snapshot(snapshot: &ProgressSnapshot) -> String {
    let percent = snapshot
        .percent
        .map(|p| format!("{:>5.1}%", p))
        .unwrap_or_else(|| "  ?  %".to_string());
    let fps = snapshot
        .current_fps
        .map(|fps| format!("{:.0} fps", fps))
        .unwrap_or_else(|| "- fps".to_string());
    let kbps = snapshot
        .current_kbps
        .map(|kbps| format!("{:.1} kb/s", kbps))
        .unwrap_or_else(|| "- kb/s".to_string());
    let size = snapshot
        .target_size_kb
        .map(|kb| format!("{} kB", kb))
        .unwrap_or_else(|| "- kB".to_string());

    format!(
        "{} | {} | {} | {} | {}",
        percent, fps, kbps, size, snapshot.timemark
    )
}

/// Console progress handler rewriting a single line
pub struct ConsoleProgressHandler {
    display: DisplayOptions,
    line: ProgressLine,
}

impl ConsoleProgressHandler {
    pub fn new(display: DisplayOptions, line: ProgressLine) -> Self {
        Self { display, line }
    }
}

impl ProgressHandler for ConsoleProgressHandler {
    fn on_progress(&self, snapshot: &ProgressSnapshot) {
        if self.display.progress_visible() {
            self.line.rewrite(&format_snapshot(snapshot));
        }
    }
}

/// Console completion handler
pub struct ConsoleCompletionHandler {
    line: ProgressLine,
}

impl ConsoleCompletionHandler {
    pub fn new(line: ProgressLine) -> Self {
        Self { line }
    }
}

impl JobCompletionHandler for ConsoleCompletionHandler {
    fn on_job_complete(&self, job: &JobDescriptor, output: &JobOutput) {
        self.line.clear();
        match (job, output) {
            (JobDescriptor::Poster(poster), JobOutput::Captured(files)) => {
                for file in files {
                    info!("done capturing {}", poster.directory.join(file).display());
                }
            }
            _ => info!("done encoding {}", job.output().display()),
        }
    }

    fn on_job_failed(&self, job: &JobDescriptor, error: &TranscodeError) {
        self.line.clear();
        error!("failed {}: {}", job.output().display(), error);
    }
}

/// Console run completion handler
pub struct ConsoleRunCompletionHandler;

impl RunCompletionHandler for ConsoleRunCompletionHandler {
    fn on_run_complete(&self, summary: &RunSummary) {
        if summary.failed.is_empty() {
            info!("done encoding all videos");
        } else {
            error!(
                "finished with {} of {} jobs failed",
                summary.failed.len(),
                summary.failed.len() + summary.completed.len()
            );
        }
    }
}

/// One line of `--progress-format json` output
#[derive(Debug, Serialize)]
struct ProgressEvent<'a> {
    event: &'static str,
    #[serde(flatten)]
    snapshot: &'a ProgressSnapshot,
    timestamp: String,
}

/// JSON progress handler for structured output
pub struct JsonProgressHandler {
    enabled: bool,
}

impl JsonProgressHandler {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn event(snapshot: &ProgressSnapshot) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(ProgressEvent {
            event: "progress",
            snapshot,
            timestamp: chrono::Utc::now().to_rfc3339(),
        })
    }
}

impl ProgressHandler for JsonProgressHandler {
    fn on_progress(&self, snapshot: &ProgressSnapshot) {
        if !self.enabled {
            return;
        }
        match Self::event(snapshot) {
            Ok(event) => println!("{}", event),
            Err(e) => error!("cannot serialize progress event: {}", e),
        }
    }
}

/// No-op handler for every slot
pub struct NoOpProgressHandler;

impl ProgressHandler for NoOpProgressHandler {
    fn on_progress(&self, _snapshot: &ProgressSnapshot) {}
}

impl JobCompletionHandler for NoOpProgressHandler {
    fn on_job_complete(&self, _job: &JobDescriptor, _output: &JobOutput) {}
    fn on_job_failed(&self, _job: &JobDescriptor, _error: &TranscodeError) {}
}

impl RunCompletionHandler for NoOpProgressHandler {
    fn on_run_complete(&self, _summary: &RunSummary) {}
}
