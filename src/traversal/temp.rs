//! Bookkeeping for transient directories created during a traversal

use super::TraversalError;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{debug, warn};

/// Accumulates every temp directory a traversal creates.
///
/// Directories are recorded before they are used, so a failed clone or publish still
/// leaves its folder here for the owner to delete. Nothing is removed automatically.
#[derive(Debug)]
pub struct TempResourceTracker {
    base_dir: PathBuf,
    folders: Mutex<Vec<PathBuf>>,
}

impl TempResourceTracker {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            folders: Mutex::new(Vec::new()),
        }
    }

    /// Creates `<base>/<prefix><uuid>` and records it
    pub fn create_dir(&self, prefix: &str) -> Result<PathBuf, TraversalError> {
        let path = self
            .base_dir
            .join(format!("{}{}", prefix, uuid::Uuid::new_v4().simple()));

        self.record(path.clone());
        fs::create_dir_all(&path).map_err(|e| TraversalError::io(&path, e))?;

        debug!(path = %path.display(), "Created temp folder");
        Ok(path)
    }

    pub fn record(&self, path: PathBuf) {
        let mut folders = self.folders.lock().unwrap_or_else(|e| e.into_inner());
        if !folders.contains(&path) {
            folders.push(path);
        }
    }

    /// Recorded folders in creation order
    pub fn folders(&self) -> Vec<PathBuf> {
        self.folders
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Deletes every recorded folder. Failures are logged and the folder stays
    /// recorded; the number of folders actually removed is returned.
    pub fn cleanup(&self) -> usize {
        let mut folders = self.folders.lock().unwrap_or_else(|e| e.into_inner());
        let mut removed = 0;

        folders.retain(|path| {
            if !path.exists() {
                return false;
            }
            match fs::remove_dir_all(path) {
                Ok(()) => {
                    debug!(path = %path.display(), "Removed temp folder");
                    removed += 1;
                    false
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to remove temp folder");
                    true
                }
            }
        });

        removed
    }
}
