//! Command implementations

use std::process::ExitCode;

use tracing::{debug, error, warn};

use crate::app::{AppContainer, DefaultAppContainer};
use crate::cli::{Cli, ProgressFormat};
use crate::config_initialization::Settings;
use crate::domain::model::DisplayOptions;
use crate::engine::progress::{ProgressLine, Reporting};
use crate::engine::runner::FailurePolicy;
use crate::error::Html5VideoError;

/// Exit status after Ctrl-C
pub const INTERRUPTED_EXIT_CODE: u8 = 130;

/// Execute the encode command
pub async fn encode(cli: &Cli, settings: &Settings) -> ExitCode {
    let options = cli.encode.to_options();
    let display = DisplayOptions {
        verbose: options.verbose,
        show_progress: options.show_progress,
    };
    let line = ProgressLine::new();
    let reporting = match cli.encode.progress_format {
        ProgressFormat::Console => Reporting::console(display, line.clone()),
        ProgressFormat::Json => Reporting::json(display, line.clone()),
    };
    let policy = if cli.encode.keep_going {
        FailurePolicy::Continue
    } else {
        FailurePolicy::Abort
    };

    debug!("using transcoder {}", settings.ffmpeg.display());
    if let Some(file) = &settings.source_file {
        debug!("settings read from {}", file.display());
    }
    let container = DefaultAppContainer::new(settings, options.verbose);
    let interactor = container.encode_interactor();

    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("cannot listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        result = interactor.execute(&options, reporting, policy) => match result {
            Ok(_) => ExitCode::SUCCESS,
            Err(e) => {
                line.clear();
                report(&e);
                ExitCode::from(e.exit_code())
            }
        },
        _ = interrupt => {
            line.clear();
            warn!("interrupted");
            ExitCode::from(INTERRUPTED_EXIT_CODE)
        }
    }
}

/// Log errors the pipeline has not reported already
fn report(e: &Html5VideoError) {
    match e {
        Html5VideoError::Validation(_)
        | Html5VideoError::Planning(_)
        | Html5VideoError::Run(_)
        | Html5VideoError::JobsFailed { .. } => {}
        Html5VideoError::Config(_) | Html5VideoError::Io(_) => error!("{}", e),
    }
}
