//! Integration tests for planning and running encode jobs

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use html5video::adapters::FsLocalAdapter;
use html5video::app::EncodeInteractor;
use html5video::domain::errors::TranscodeError;
use html5video::domain::model::{
    EncodeOptions, JobDescriptor, JobOutput, JobQueue, PosterJob, ProcessOutput, ProgressSnapshot,
    VideoJob,
};
use html5video::engine::{
    FailurePolicy, JobCompletionHandler, JobRunner, ProgressHandler, Reporting,
    RunCompletionHandler, RunSummary, RunnerState,
};
use html5video::ports::{FsPort, TranscoderPort};
use html5video::Html5VideoError;

// Test utilities

type EventLog = Arc<Mutex<Vec<String>>>;

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Transcoder double that records calls and can fail one of them
struct FakeTranscoder {
    log: EventLog,
    fail_on: Option<String>,
    snapshots: usize,
}

impl FakeTranscoder {
    fn new(log: EventLog) -> Self {
        Self {
            log,
            fail_on: None,
            snapshots: 0,
        }
    }

    fn failing_on(mut self, output_name: &str) -> Self {
        self.fail_on = Some(output_name.to_string());
        self
    }

    fn with_snapshots(mut self, count: usize) -> Self {
        self.snapshots = count;
        self
    }

    fn outcome(&self, name: &str) -> Result<(), TranscodeError> {
        if self.fail_on.as_deref() == Some(name) {
            Err(TranscodeError::Exited {
                program: "ffmpeg".to_string(),
                status: "exit status: 1".to_string(),
                stderr: "Unknown encoder".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl TranscoderPort for FakeTranscoder {
    async fn encode(
        &self,
        job: &VideoJob,
        _timeout: Duration,
        progress: &dyn ProgressHandler,
    ) -> Result<ProcessOutput, TranscodeError> {
        let name = file_name(&job.output);
        self.log.lock().unwrap().push(format!("encode {}", name));
        for step in 1..=self.snapshots {
            progress.on_progress(&ProgressSnapshot {
                percent: Some(100.0 * step as f64 / self.snapshots as f64),
                ..ProgressSnapshot::default()
            });
        }
        self.outcome(&name)?;
        Ok(ProcessOutput::default())
    }

    async fn capture_frame(
        &self,
        job: &PosterJob,
        _timeout: Duration,
    ) -> Result<Vec<String>, TranscodeError> {
        self.log
            .lock()
            .unwrap()
            .push(format!("capture {}", job.file_name));
        self.outcome(&job.file_name)?;
        Ok(vec![job.file_name.clone()])
    }
}

/// Records every notification into the shared log
struct Recorder {
    log: EventLog,
}

impl ProgressHandler for Recorder {
    fn on_progress(&self, snapshot: &ProgressSnapshot) {
        self.log
            .lock()
            .unwrap()
            .push(format!("progress {:.0}", snapshot.percent.unwrap_or_default()));
    }
}

impl JobCompletionHandler for Recorder {
    fn on_job_complete(&self, job: &JobDescriptor, output: &JobOutput) {
        let kind = match output {
            JobOutput::Encoded(_) => "encoded",
            JobOutput::Captured(_) => "captured",
        };
        self.log
            .lock()
            .unwrap()
            .push(format!("{} {}", kind, file_name(&job.output())));
    }

    fn on_job_failed(&self, job: &JobDescriptor, _error: &TranscodeError) {
        self.log
            .lock()
            .unwrap()
            .push(format!("failed {}", file_name(&job.output())));
    }
}

impl RunCompletionHandler for Recorder {
    fn on_run_complete(&self, summary: &RunSummary) {
        self.log.lock().unwrap().push(format!(
            "run complete {}/{}",
            summary.completed.len(),
            summary.completed.len() + summary.failed.len()
        ));
    }
}

fn recording(log: &EventLog) -> Reporting {
    let recorder = Arc::new(Recorder { log: log.clone() });
    Reporting::silent()
        .with_progress(recorder.clone())
        .with_job_complete(recorder.clone())
        .with_run_complete(recorder)
}

fn events(log: &EventLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

fn source_in(dir: &TempDir) -> PathBuf {
    let source = dir.path().join("movie.mov");
    std::fs::write(&source, b"fake video data").unwrap();
    source
}

fn options(source: &Path, out: &Path) -> EncodeOptions {
    EncodeOptions {
        output_template: out.join("{src_name}-html5").to_string_lossy().into_owned(),
        ..EncodeOptions::for_source(source.to_string_lossy())
    }
}

fn interactor(transcoder: FakeTranscoder) -> EncodeInteractor {
    EncodeInteractor::new(
        Arc::new(FsLocalAdapter::new()) as Arc<dyn FsPort>,
        Arc::new(transcoder) as Arc<dyn TranscoderPort>,
    )
}

// Runner tests

#[tokio::test]
async fn test_empty_queue_completes_once() {
    let log = EventLog::default();
    let runner = JobRunner::new(
        JobQueue::new(Vec::new()),
        Arc::new(FakeTranscoder::new(log.clone())),
        recording(&log),
        Duration::from_secs(1),
    );
    assert_eq!(runner.state(), RunnerState::Idle);

    let summary = runner.run().await.unwrap();
    assert!(summary.is_success());
    assert_eq!(events(&log), vec!["run complete 0/0"]);
}

#[tokio::test]
async fn test_two_formats_and_poster_run_in_order() {
    let dir = TempDir::new().unwrap();
    let source = source_in(&dir);
    let out = dir.path().join("videos");
    let mut opts = options(&source, &out);
    opts.formats = vec!["h264".to_string(), "webm".to_string()];

    let log = EventLog::default();
    let summary = interactor(FakeTranscoder::new(log.clone()))
        .execute(&opts, recording(&log), FailurePolicy::Abort)
        .await
        .unwrap();

    assert_eq!(
        events(&log),
        vec![
            "encode movie-html5.mp4",
            "encoded movie-html5.mp4",
            "encode movie-html5.webm",
            "encoded movie-html5.webm",
            "capture poster.png",
            "captured poster.png",
            "run complete 3/3",
        ]
    );
    assert_eq!(
        summary.completed,
        vec![
            out.join("movie-html5.mp4"),
            out.join("movie-html5.webm"),
            out.join("poster.png"),
        ]
    );
    assert!(out.is_dir());
}

#[tokio::test]
async fn test_progress_reaches_handler_before_completion() {
    let dir = TempDir::new().unwrap();
    let source = source_in(&dir);
    let mut opts = options(&source, &dir.path().join("out"));
    opts.formats = vec!["ogg".to_string()];
    opts.poster = None;

    let log = EventLog::default();
    interactor(FakeTranscoder::new(log.clone()).with_snapshots(2))
        .execute(&opts, recording(&log), FailurePolicy::Abort)
        .await
        .unwrap();

    assert_eq!(
        events(&log),
        vec![
            "encode movie-html5.ogv",
            "progress 50",
            "progress 100",
            "encoded movie-html5.ogv",
            "run complete 1/1",
        ]
    );
}

#[tokio::test]
async fn test_abort_stops_at_first_failure() {
    let dir = TempDir::new().unwrap();
    let source = source_in(&dir);
    let opts = options(&source, &dir.path().join("out"));

    let log = EventLog::default();
    let err = interactor(FakeTranscoder::new(log.clone()).failing_on("movie-html5.webm"))
        .execute(&opts, recording(&log), FailurePolicy::Abort)
        .await
        .unwrap_err();

    match &err {
        Html5VideoError::Run(run) => {
            assert_eq!(run.index, 1);
            assert!(matches!(run.source, TranscodeError::Exited { .. }));
        }
        other => panic!("expected run error, got {:?}", other),
    }
    assert_eq!(err.exit_code(), 4);
    assert_eq!(
        events(&log),
        vec![
            "encode movie-html5.mp4",
            "encoded movie-html5.mp4",
            "encode movie-html5.webm",
            "failed movie-html5.webm",
        ]
    );
}

#[tokio::test]
async fn test_continue_runs_remaining_jobs() {
    let dir = TempDir::new().unwrap();
    let source = source_in(&dir);
    let opts = options(&source, &dir.path().join("out"));

    let log = EventLog::default();
    let err = interactor(FakeTranscoder::new(log.clone()).failing_on("movie-html5.webm"))
        .execute(&opts, recording(&log), FailurePolicy::Continue)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Html5VideoError::JobsFailed { failed: 1, total: 4 }
    ));
    assert_eq!(
        events(&log),
        vec![
            "encode movie-html5.mp4",
            "encoded movie-html5.mp4",
            "encode movie-html5.webm",
            "failed movie-html5.webm",
            "encode movie-html5.ogv",
            "encoded movie-html5.ogv",
            "capture poster.png",
            "captured poster.png",
            "run complete 3/4",
        ]
    );
}

#[tokio::test]
async fn test_only_poster_captures_single_frame() {
    let dir = TempDir::new().unwrap();
    let source = source_in(&dir);
    let mut opts = options(&source, &dir.path().join("out"));
    opts.only_poster = true;
    opts.poster = Some("{src_name}-still".to_string());
    opts.poster_time = "12".to_string();

    let log = EventLog::default();
    interactor(FakeTranscoder::new(log.clone()))
        .execute(&opts, recording(&log), FailurePolicy::Abort)
        .await
        .unwrap();

    assert_eq!(
        events(&log),
        vec![
            "capture movie-still.png",
            "captured movie-still.png",
            "run complete 1/1",
        ]
    );
}

#[tokio::test]
async fn test_invalid_options_plan_nothing() {
    let dir = TempDir::new().unwrap();
    let source = source_in(&dir);
    let out = dir.path().join("never-created");
    let mut opts = options(&source, &out);
    opts.video_bitrate = "fast".to_string();

    let log = EventLog::default();
    let err = interactor(FakeTranscoder::new(log.clone()))
        .execute(&opts, recording(&log), FailurePolicy::Abort)
        .await
        .unwrap_err();

    assert!(matches!(err, Html5VideoError::Validation(_)));
    assert_eq!(err.exit_code(), 2);
    assert!(events(&log).is_empty());
    assert!(!out.exists());
}
