//! Logging-based progress handler

use super::{ProgressEvent, ProgressHandler};
use tracing::{debug, info, warn};

/// Handler that logs progress events using tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl ProgressHandler for LoggingHandler {
    fn on_progress(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Started { location } => {
                info!(location = %location, "Starting traversal");
            }
            ProgressEvent::CloneStarted { url, target } => {
                info!(url = %url, target = %target.display(), "Cloning repository");
            }
            ProgressEvent::ManifestFound { path } => {
                info!(path = %path.display(), "Found host.json");
            }
            ProgressEvent::RuntimeDetected { runtime } => {
                debug!(runtime = %runtime, "Detected runtime");
            }
            ProgressEvent::PublishStarted { project, output } => {
                info!(
                    project = %project.display(),
                    output = %output.display(),
                    "Publishing .NET project"
                );
            }
            ProgressEvent::FunctionManifestFailed { path, error } => {
                warn!(path = %path.display(), error = %error, "Failed to parse function.json");
            }
            ProgressEvent::CatalogComplete { functions } => {
                info!(functions, "Function catalog built");
            }
            ProgressEvent::SourceNotFound { function } => {
                debug!(function = %function, "Source code not found");
            }
            ProgressEvent::MatchingComplete { edges } => {
                debug!(edges, "Relationship matching complete");
            }
            ProgressEvent::Completed {
                functions,
                total_time,
            } => {
                info!(
                    functions,
                    total_time_ms = total_time.as_millis(),
                    "Traversal complete"
                );
            }
            ProgressEvent::Failed { error } => {
                warn!(error = %error, "Traversal failed");
            }
        }
    }
}
