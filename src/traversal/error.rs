use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal traversal failures. Anything recoverable is reported as a progress event
/// instead and never aborts the traversal.
#[derive(Error, Debug)]
pub enum TraversalError {
    #[error("Path does not exist: {0}")]
    PathNotFound(PathBuf),

    #[error("host.json file not found under {0}")]
    ManifestNotFound(PathBuf),

    #[error("Failed to clone {url}: {message}")]
    Clone { url: String, message: String },

    #[error("Failed to publish {project}: {message}")]
    Publish { project: PathBuf, message: String },

    #[error("I/O error at {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("Invalid search pattern: {0}")]
    Pattern(String),

    #[error("Background task failed: {0}")]
    Task(String),

    #[error("Traversal cancelled")]
    Cancelled,
}

impl TraversalError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        TraversalError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<regex::Error> for TraversalError {
    fn from(err: regex::Error) -> Self {
        TraversalError::Pattern(err.to_string())
    }
}

impl From<tokio::task::JoinError> for TraversalError {
    fn from(err: tokio::task::JoinError) -> Self {
        TraversalError::Task(err.to_string())
    }
}
