//! Runtime classification of a Functions project and .NET staging

mod publish;

pub use publish::PublishStager;

use crate::traversal::TraversalError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// Project file the Functions SDK generates for binding extensions. Its presence
/// alone does not make a project .NET.
const EXTENSIONS_PROJECT_FILE: &str = "extensions.csproj";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeKind {
    /// C#/F# project that has to be published before its function folders exist
    DotNet,
    /// JavaScript, TypeScript or Python; function folders are already on disk
    Interpreted,
}

impl RuntimeKind {
    pub fn is_dotnet(&self) -> bool {
        matches!(self, RuntimeKind::DotNet)
    }
}

impl fmt::Display for RuntimeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeKind::DotNet => write!(f, "dotnet"),
            RuntimeKind::Interpreted => write!(f, "interpreted"),
        }
    }
}

/// Whether a file name marks a .NET project root
fn is_dotnet_marker(file_name: &str) -> bool {
    let name = file_name.to_ascii_lowercase();

    name.ends_with(".sln")
        || name.ends_with(".fsproj")
        || (name.ends_with(".csproj") && name != EXTENSIONS_PROJECT_FILE)
}

/// Classifies the project by the files sitting directly in its root
pub fn detect_runtime(project_root: &Path) -> Result<RuntimeKind, TraversalError> {
    let entries =
        fs::read_dir(project_root).map_err(|e| TraversalError::io(project_root, e))?;

    for entry in entries.flatten() {
        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        if is_file && is_dotnet_marker(&entry.file_name().to_string_lossy()) {
            return Ok(RuntimeKind::DotNet);
        }
    }

    Ok(RuntimeKind::Interpreted)
}
