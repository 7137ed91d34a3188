// Encode interactor - Orchestrates validation, planning and the job run

use std::sync::Arc;

use tracing::{debug, error};

use crate::domain::model::*;
use crate::domain::rules::OptionValidator;
use crate::engine::progress::Reporting;
use crate::engine::runner::{FailurePolicy, JobRunner, RunSummary};
use crate::error::{Html5VideoError, Html5VideoResult};
use crate::planner::JobPlanner;
use crate::ports::{FsPort, TranscoderPort};

/// Interactor for the encode use case
pub struct EncodeInteractor {
    fs_port: Arc<dyn FsPort>,
    transcoder_port: Arc<dyn TranscoderPort>,
}

impl EncodeInteractor {
    /// Create new encode interactor with injected ports
    pub fn new(fs_port: Arc<dyn FsPort>, transcoder_port: Arc<dyn TranscoderPort>) -> Self {
        Self {
            fs_port,
            transcoder_port,
        }
    }

    /// Validate options into a configuration
    pub async fn validate(&self, options: &EncodeOptions) -> Html5VideoResult<ValidatedConfig> {
        OptionValidator::validate(options, self.fs_port.as_ref())
            .await
            .map_err(|e| {
                error!("{}", e);
                Html5VideoError::from(e)
            })
    }

    /// Plan the job queue, creating output directories
    pub async fn plan(&self, config: &ValidatedConfig) -> Html5VideoResult<JobQueue> {
        JobPlanner::new(Arc::clone(&self.fs_port))
            .plan(config)
            .await
            .map_err(|e| {
                error!("{}", e);
                Html5VideoError::from(e)
            })
    }

    /// Validate, plan and run every job
    ///
    /// Under [`FailurePolicy::Continue`] a run with failed jobs still plays to
    /// the end and is then reported as [`Html5VideoError::JobsFailed`].
    pub async fn execute(
        &self,
        options: &EncodeOptions,
        reporting: Reporting,
        policy: FailurePolicy,
    ) -> Html5VideoResult<RunSummary> {
        let config = self.validate(options).await?;
        let queue = self.plan(&config).await?;

        debug!(
            "encoding {} into {} ({} job(s))",
            config.source.display(),
            config.output_directory().display(),
            queue.len()
        );

        let summary = JobRunner::new(
            queue,
            Arc::clone(&self.transcoder_port),
            reporting,
            config.timeout,
        )
        .with_failure_policy(policy)
        .run()
        .await?;

        if summary.is_success() {
            Ok(summary)
        } else {
            Err(Html5VideoError::JobsFailed {
                failed: summary.failed.len(),
                total: summary.failed.len() + summary.completed.len(),
            })
        }
    }
}
