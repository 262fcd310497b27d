//! Staging of .NET projects via `dotnet publish`
//!
//! A published in-process Functions app has the same `<Function>/function.json`
//! layout as the interpreted runtimes, so everything downstream can stay
//! runtime-agnostic.

use crate::process::ToolCommand;
use crate::progress::ProgressEvent;
use crate::traversal::{TraversalContext, TraversalError};
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct PublishStager<'a> {
    ctx: &'a TraversalContext<'a>,
}

impl<'a> PublishStager<'a> {
    pub fn new(ctx: &'a TraversalContext<'a>) -> Self {
        Self { ctx }
    }

    pub fn command(&self, project_root: &Path, output: &Path) -> ToolCommand {
        ToolCommand::new(&self.ctx.config.dotnet_program)
            .arg("publish")
            .arg("-o")
            .path_arg(output)
            .current_dir(project_root)
    }

    /// Publishes `project_root` into a fresh temp folder and returns that folder.
    /// The folder is recorded for cleanup before the build starts.
    pub async fn stage(&self, project_root: &Path) -> Result<PathBuf, TraversalError> {
        let output = self.ctx.tracker.create_dir("funcgraph-publish-")?;

        self.ctx.progress.on_progress(&ProgressEvent::PublishStarted {
            project: project_root.to_path_buf(),
            output: output.clone(),
        });

        let publish_error = |message: String| TraversalError::Publish {
            project: project_root.to_path_buf(),
            message,
        };

        let result = self
            .command(project_root, &output)
            .run()
            .await
            .map_err(|e| publish_error(e.to_string()))?;

        if !result.success {
            return Err(publish_error(result.failure_message()));
        }

        debug!(output = %output.display(), "Publish complete");
        Ok(output)
    }
}
