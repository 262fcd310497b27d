//! Command handlers; each returns the process exit code

use super::commands::{DiagramArgs, TraverseArgs};
use super::output::OutputFormatter;
use super::spinner::SpinnerHandler;
use crate::config::FuncGraphConfig;
use crate::diagram::diagram_code;
use crate::functions::TraversalResult;
use crate::progress::{LoggingHandler, ProgressHandler};
use crate::traversal::{traverse, CancellationFlag, TempResourceTracker, TraversalContext};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn, Level};

/// Options given before the subcommand
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalOptions {
    pub quiet: bool,
    /// Level chosen by `--log-level`, `-v` or `-q`; overrides `FUNCGRAPH_LOG_LEVEL`
    pub log_level: Option<Level>,
}

fn load_config(log_level: Option<Level>) -> Result<FuncGraphConfig> {
    let mut config = FuncGraphConfig::default();
    if let Some(level) = log_level {
        config.log_level = level.to_string().to_ascii_lowercase();
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Runs one traversal and owns its temp folders: they are removed afterwards,
/// whether it succeeded or not, unless `keep_temp` is set.
async fn run_traversal(
    location: &str,
    keep_temp: bool,
    options: GlobalOptions,
) -> Result<TraversalResult> {
    let config = load_config(options.log_level)?;
    debug!(config = %config, "Loaded configuration");

    let tracker = TempResourceTracker::new(&config.temp_dir);
    let cancel = CancellationFlag::new();

    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, stopping at the next checkpoint");
                cancel.cancel();
            }
        })
    };

    let spinner = (!options.quiet && SpinnerHandler::is_supported()).then(SpinnerHandler::new);
    let progress: &dyn ProgressHandler = match &spinner {
        Some(spinner) => spinner,
        None => &LoggingHandler,
    };

    let ctx = TraversalContext {
        config: &config,
        tracker: &tracker,
        progress,
        cancel: &cancel,
    };
    let result = traverse(&ctx, location).await;

    ctrl_c.abort();
    if let Some(spinner) = &spinner {
        spinner.finish();
    }

    if keep_temp {
        for folder in tracker.folders() {
            info!(path = %folder.display(), "Keeping temp folder");
        }
    } else {
        let removed = tracker.cleanup();
        debug!(removed, "Temp folders removed");
    }

    let mut result = result.with_context(|| format!("Failed to traverse {}", location))?;
    result.temp_folders.retain(|folder| folder.exists());
    Ok(result)
}

fn write_output(output: Option<&Path>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, content)
                .with_context(|| format!("Failed to write output to {}", path.display()))?;
            info!(path = %path.display(), "Output written");
        }
        None => println!("{}", content),
    }
    Ok(())
}

pub async fn handle_traverse(args: &TraverseArgs, options: GlobalOptions) -> i32 {
    let outcome = async {
        let result = run_traversal(&args.location, args.keep_temp, options).await?;
        let formatted = OutputFormatter::new(args.format.into()).format(&result)?;
        write_output(args.output.as_deref(), &formatted)
    }
    .await;

    match outcome {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    }
}

pub async fn handle_diagram(args: &DiagramArgs, options: GlobalOptions) -> i32 {
    let outcome = async {
        let result = run_traversal(&args.location, args.keep_temp, options).await?;
        write_output(args.output.as_deref(), &diagram_code(&result.functions))
    }
    .await;

    match outcome {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    }
}
