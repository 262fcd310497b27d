//! Enumeration of per-function manifests into a fresh [`FunctionsMap`]

use crate::functions::{FunctionManifest, FunctionRecord, FunctionsMap, FUNCTION_MANIFEST_FILE};
use crate::progress::{ProgressEvent, ProgressHandler};
use crate::traversal::{CancellationFlag, TraversalError};
use futures_util::future::join_all;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Functions declared in a working folder, edge-less
#[derive(Debug, Default)]
pub struct FunctionCatalog {
    pub functions: FunctionsMap,
    /// `scriptFile` of each manifest that declares one, resolved against its folder
    pub script_files: HashMap<String, PathBuf>,
}

enum ManifestOutcome {
    Loaded {
        name: String,
        dir: PathBuf,
        manifest: FunctionManifest,
    },
    Failed {
        path: PathBuf,
        error: String,
    },
    Absent,
}

async fn read_function_folder(dir: PathBuf) -> ManifestOutcome {
    let name = match dir.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => return ManifestOutcome::Absent,
    };
    let path = dir.join(FUNCTION_MANIFEST_FILE);

    let content = match fs::read_to_string(&path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return ManifestOutcome::Absent,
        Err(e) => {
            return ManifestOutcome::Failed {
                path,
                error: e.to_string(),
            }
        }
    };

    match FunctionManifest::parse(&content) {
        Ok(manifest) => ManifestOutcome::Loaded {
            name,
            dir,
            manifest,
        },
        Err(e) => ManifestOutcome::Failed {
            path,
            error: e.to_string(),
        },
    }
}

/// Reads `<working_folder>/*/function.json` concurrently.
///
/// A manifest that fails to read or parse is reported and skipped; only failing to
/// list `working_folder` itself is fatal.
pub async fn build_catalog(
    working_folder: &Path,
    progress: &dyn ProgressHandler,
    cancel: &CancellationFlag,
) -> Result<FunctionCatalog, TraversalError> {
    let mut dirs = Vec::new();
    let mut entries = fs::read_dir(working_folder)
        .await
        .map_err(|e| TraversalError::io(working_folder, e))?;

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| TraversalError::io(working_folder, e))?
    {
        let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
        if is_dir {
            dirs.push(entry.path());
        }
    }
    dirs.sort();

    cancel.check()?;

    let outcomes = join_all(dirs.into_iter().map(read_function_folder)).await;

    let mut catalog = FunctionCatalog::default();
    for outcome in outcomes {
        match outcome {
            ManifestOutcome::Loaded {
                name,
                dir,
                manifest,
            } => {
                debug!(function = %name, bindings = manifest.bindings.len(), "Loaded function manifest");
                if let Some(script) = &manifest.script_file {
                    catalog.script_files.insert(name.clone(), dir.join(script));
                }
                catalog
                    .functions
                    .insert(FunctionRecord::new(name, manifest.bindings));
            }
            ManifestOutcome::Failed { path, error } => {
                progress.on_progress(&ProgressEvent::FunctionManifestFailed { path, error });
            }
            ManifestOutcome::Absent => {}
        }
    }

    progress.on_progress(&ProgressEvent::CatalogComplete {
        functions: catalog.functions.len(),
    });

    Ok(catalog)
}
