//! Resolution of a path or URL down to the project root (the folder holding `host.json`)

mod location;

pub use location::{repository_name, ProjectLocation};

use crate::process::ToolCommand;
use crate::progress::ProgressEvent;
use crate::traversal::{CancellationFlag, TraversalContext, TraversalError};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const HOST_MANIFEST_FILE: &str = "host.json";

/// Directories never descended into while searching a project
pub const EXCLUDED_DIRS: &[&str] = &[
    "node_modules",
    "obj",
    ".vs",
    ".vscode",
    ".env",
    ".python_packages",
    ".git",
    ".github",
];

pub fn is_excluded_dir(name: &str) -> bool {
    EXCLUDED_DIRS
        .iter()
        .any(|excluded| excluded.eq_ignore_ascii_case(name))
}

/// Builds a sorted, unfiltered walker that skips [`EXCLUDED_DIRS`].
///
/// Gitignore rules are deliberately not applied: generated function folders are
/// frequently ignored but still have to be found.
pub(crate) fn project_walker(root: &Path) -> ignore::Walk {
    WalkBuilder::new(root)
        .standard_filters(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(|entry| {
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            !(is_dir && entry.depth() > 0 && is_excluded_dir(&entry.file_name().to_string_lossy()))
        })
        .build()
}

pub struct ProjectLocator<'a> {
    ctx: &'a TraversalContext<'a>,
}

impl<'a> ProjectLocator<'a> {
    pub fn new(ctx: &'a TraversalContext<'a>) -> Self {
        Self { ctx }
    }

    /// Resolves `input` to the project root, cloning it first if it is a URL
    pub async fn locate(&self, input: &str) -> Result<PathBuf, TraversalError> {
        let search_root = match ProjectLocation::parse(input) {
            ProjectLocation::Local(path) => {
                if !path.exists() {
                    return Err(TraversalError::PathNotFound(path));
                }
                path
            }
            ProjectLocation::Remote { clone_url, subdirs } => {
                let checkout = self.clone_repository(&clone_url).await?;
                let root = subdirs.iter().fold(checkout, |dir, segment| dir.join(segment));
                if !root.exists() {
                    return Err(TraversalError::PathNotFound(root));
                }
                root
            }
        };

        self.ctx.cancel.check()?;

        let manifest = find_host_manifest(&search_root, self.ctx.cancel)?
            .ok_or_else(|| TraversalError::ManifestNotFound(search_root.clone()))?;

        self.ctx.progress.on_progress(&ProgressEvent::ManifestFound {
            path: manifest.clone(),
        });

        Ok(manifest
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or(search_root))
    }

    async fn clone_repository(&self, clone_url: &str) -> Result<PathBuf, TraversalError> {
        let clone_root = self.ctx.tracker.create_dir("funcgraph-clone-")?;
        let target = clone_root.join(repository_name(clone_url));

        self.ctx.progress.on_progress(&ProgressEvent::CloneStarted {
            url: clone_url.to_string(),
            target: target.clone(),
        });

        let mut cmd = ToolCommand::new(&self.ctx.config.git_program).arg("clone");
        if self.ctx.config.shallow_clone {
            cmd = cmd.args(["--depth", "1"]);
        }
        let output = cmd
            .arg(clone_url)
            .path_arg(&target)
            .current_dir(&clone_root)
            .run()
            .await
            .map_err(|e| TraversalError::Clone {
                url: clone_url.to_string(),
                message: e.to_string(),
            })?;

        if !output.success {
            return Err(TraversalError::Clone {
                url: clone_url.to_string(),
                message: output.failure_message(),
            });
        }

        debug!(url = %clone_url, target = %target.display(), "Repository cloned");
        Ok(target)
    }
}

/// Finds the shallowest `host.json` under `root` (first in name order on ties)
pub fn find_host_manifest(
    root: &Path,
    cancel: &CancellationFlag,
) -> Result<Option<PathBuf>, TraversalError> {
    let mut best: Option<(usize, PathBuf)> = None;

    for result in project_walker(root) {
        cancel.check()?;

        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                warn!(error = %err, "Failed to read directory entry");
                continue;
            }
        };

        if best.as_ref().is_some_and(|(depth, _)| entry.depth() >= *depth) {
            continue;
        }

        let is_file = entry.file_type().is_some_and(|t| t.is_file());
        if is_file
            && entry
                .file_name()
                .to_string_lossy()
                .eq_ignore_ascii_case(HOST_MANIFEST_FILE)
        {
            best = Some((entry.depth(), entry.into_path()));
        }
    }

    Ok(best.map(|(_, path)| path))
}
