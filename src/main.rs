//! html5video command-line entry point
//!
//! # Usage
//!
//! ```bash
//! html5video --src myvid.mov --out vid --formats webm,ogg
//! html5video -s myvid.mov -w 640 --onlyposter -t 12
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::error;

use html5video::cli::{commands, Cli};
use html5video::config_initialization::initialize_configuration_hierarchy;
use html5video::utils::logging::LoggingConfig;
use html5video::Html5VideoError;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let settings = initialize_configuration_hierarchy(&cli, &cwd);

    let log_format = match &settings {
        Ok(settings) => settings.log_format,
        Err(_) => cli.log_format.unwrap_or_default(),
    };
    if let Err(e) = LoggingConfig::new(cli.encode.verbose, log_format).initialize() {
        eprintln!("failed to initialize logging: {}", e);
    }

    let settings = match settings {
        Ok(settings) => settings,
        Err(e) => {
            let e = Html5VideoError::from(e);
            error!("{}", e);
            return Ok(ExitCode::from(e.exit_code()));
        }
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    Ok(runtime.block_on(commands::encode(&cli, &settings)))
}
