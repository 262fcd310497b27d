//! Per-function manifest (`function.json`)

use super::BindingDescriptor;
use serde::Deserialize;

pub const FUNCTION_MANIFEST_FILE: &str = "function.json";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionManifest {
    #[serde(default)]
    pub bindings: Vec<BindingDescriptor>,

    /// Entry script, relative to the function folder
    #[serde(default)]
    pub script_file: Option<String>,
}

impl FunctionManifest {
    pub fn parse(content: &str) -> serde_json::Result<Self> {
        // Some tooling writes a UTF-8 BOM
        serde_json::from_str(content.trim_start_matches('\u{feff}'))
    }
}
