//! Terminal spinner that follows traversal progress

use crate::progress::{LoggingHandler, ProgressEvent, ProgressHandler};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "✓"])
}

/// Shows the current stage on a spinner and still logs every event, with the
/// spinner suspended while the log line is written
pub struct SpinnerHandler {
    bar: ProgressBar,
    logger: LoggingHandler,
}

impl SpinnerHandler {
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(spinner_style());
        bar.enable_steady_tick(Duration::from_millis(100));
        Self {
            bar,
            logger: LoggingHandler,
        }
    }

    /// Whether stderr is an interactive terminal
    pub fn is_supported() -> bool {
        atty::is(atty::Stream::Stderr)
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for SpinnerHandler {
    fn default() -> Self {
        Self::new()
    }
}

fn stage_message(event: &ProgressEvent) -> Option<String> {
    match event {
        ProgressEvent::Started { location } => Some(format!("Locating {}", location)),
        ProgressEvent::CloneStarted { url, .. } => Some(format!("Cloning {}", url)),
        ProgressEvent::ManifestFound { path } => Some(format!("Found {}", path.display())),
        ProgressEvent::PublishStarted { project, .. } => {
            Some(format!("Publishing {}", project.display()))
        }
        ProgressEvent::CatalogComplete { functions } => {
            Some(format!("Matching {} functions", functions))
        }
        _ => None,
    }
}

impl ProgressHandler for SpinnerHandler {
    fn on_progress(&self, event: &ProgressEvent) {
        if let Some(message) = stage_message(event) {
            self.bar.set_message(message);
        }
        self.bar.suspend(|| self.logger.on_progress(event));

        if matches!(
            event,
            ProgressEvent::Completed { .. } | ProgressEvent::Failed { .. }
        ) {
            self.finish();
        }
    }
}
