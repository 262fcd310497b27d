//! Progress handler trait and events

use std::path::PathBuf;
use std::time::Duration;

/// Events emitted while a project is being traversed
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Traversal started
    Started { location: String },

    /// Remote repository is about to be cloned
    CloneStarted { url: String, target: PathBuf },

    /// Project manifest (`host.json`) located
    ManifestFound { path: PathBuf },

    /// Runtime classification of the project root
    RuntimeDetected { runtime: String },

    /// .NET publish about to run
    PublishStarted { project: PathBuf, output: PathBuf },

    /// A `function.json` could not be read or parsed; the function is skipped
    FunctionManifestFailed { path: PathBuf, error: String },

    /// All per-function manifests read
    CatalogComplete { functions: usize },

    /// No source could be located for a function; it stays edge-less
    SourceNotFound { function: String },

    /// Relationship matching finished
    MatchingComplete { edges: usize },

    /// Traversal completed successfully
    Completed {
        functions: usize,
        total_time: Duration,
    },

    /// Traversal failed
    Failed { error: String },
}

/// Sink for traversal progress
pub trait ProgressHandler: Send + Sync {
    /// Called when a progress event occurs
    fn on_progress(&self, event: &ProgressEvent);
}

/// No-op handler that ignores all events
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpHandler;

impl ProgressHandler for NoOpHandler {
    fn on_progress(&self, _event: &ProgressEvent) {}
}
