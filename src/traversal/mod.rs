//! Traversal driver
//!
//! A traversal runs the stages in a fixed order: locate the project root, classify
//! its runtime, publish it when it is .NET, catalogue the function manifests, locate
//! sources, match relationships and, for .NET, recover attribute bindings. Any fatal
//! error aborts the whole traversal; nothing partial is returned.

mod cancel;
mod error;
mod temp;

pub use cancel::CancellationFlag;
pub use error::TraversalError;
pub use temp::TempResourceTracker;

use crate::bindings::extend_bindings;
use crate::catalog::build_catalog;
use crate::config::FuncGraphConfig;
use crate::functions::{FunctionsMap, TraversalResult};
use crate::locator::ProjectLocator;
use crate::matcher::{apply_edges, RelationshipMatcher};
use crate::progress::{ProgressEvent, ProgressHandler};
use crate::runtime::{detect_runtime, PublishStager};
use crate::source::SourceLocator;
use std::time::Instant;
use tracing::{debug, info_span, Instrument};

/// Everything a traversal borrows from its owner
pub struct TraversalContext<'a> {
    pub config: &'a FuncGraphConfig,
    /// Receives every temp directory created; the owner cleans it up
    pub tracker: &'a TempResourceTracker,
    pub progress: &'a dyn ProgressHandler,
    pub cancel: &'a CancellationFlag,
}

async fn run_stages(
    ctx: &TraversalContext<'_>,
    location: &str,
) -> Result<FunctionsMap, TraversalError> {
    let project_root = ProjectLocator::new(ctx).locate(location).await?;
    ctx.cancel.check()?;

    let runtime = detect_runtime(&project_root)?;
    ctx.progress.on_progress(&ProgressEvent::RuntimeDetected {
        runtime: runtime.to_string(),
    });

    let working_folder = if runtime.is_dotnet() {
        PublishStager::new(ctx).stage(&project_root).await?
    } else {
        project_root.clone()
    };
    ctx.cancel.check()?;

    let catalog = build_catalog(&working_folder, ctx.progress, ctx.cancel).await?;
    ctx.cancel.check()?;

    let sources = SourceLocator::new(ctx)
        .locate_all(runtime, &project_root, &working_folder, &catalog)
        .await?;
    ctx.cancel.check()?;

    let mut functions = catalog.functions;
    for (name, source) in &sources {
        if let Some(record) = functions.get_mut(name) {
            record.file_path = Some(source.file_path.clone());
            record.pos = Some(source.pos);
            record.line_nr = Some(source.line_nr);
        }
    }

    let edges = RelationshipMatcher::new(&functions, &sources).find_edges()?;
    let applied = apply_edges(&mut functions, edges);
    ctx.progress
        .on_progress(&ProgressEvent::MatchingComplete { edges: applied });

    if runtime.is_dotnet() {
        let added = extend_bindings(&mut functions, &sources);
        debug!(bindings = added, "Attribute bindings recovered");
    }

    Ok(functions)
}

/// Builds the function graph of the project at `location` (a local path or a git URL).
///
/// Temp folders created along the way are recorded in `ctx.tracker` whether or not
/// the traversal succeeds, and are also listed in the result.
pub async fn traverse(
    ctx: &TraversalContext<'_>,
    location: &str,
) -> Result<TraversalResult, TraversalError> {
    let started = Instant::now();
    ctx.progress.on_progress(&ProgressEvent::Started {
        location: location.to_string(),
    });

    let span = info_span!("traverse", location = %location);
    match run_stages(ctx, location).instrument(span).await {
        Ok(functions) => {
            ctx.progress.on_progress(&ProgressEvent::Completed {
                functions: functions.len(),
                total_time: started.elapsed(),
            });
            Ok(TraversalResult {
                functions,
                temp_folders: ctx.tracker.folders(),
            })
        }
        Err(e) => {
            ctx.progress.on_progress(&ProgressEvent::Failed {
                error: e.to_string(),
            });
            Err(e)
        }
    }
}
