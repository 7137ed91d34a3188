//! Job execution engine

pub mod progress;
pub mod runner;

pub use progress::{
    ConsoleCompletionHandler, ConsoleProgressHandler, ConsoleRunCompletionHandler,
    JobCompletionHandler, JsonProgressHandler, ProgressHandler, ProgressLine, Reporting,
    RunCompletionHandler,
};
pub use runner::{FailurePolicy, JobRunner, RunError, RunSummary, RunnerState};
