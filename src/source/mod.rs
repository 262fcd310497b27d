//! Locating each function's source code
//!
//! .NET functions are found by their name attribute anywhere in the project's `.cs`
//! and `.fs` files; the code is the text from the attribute to the end of the method
//! body. Interpreted functions live in their own folder, so the whole entry script
//! is the code.

mod brackets;

pub use brackets::scan_balanced;

use crate::catalog::FunctionCatalog;
use crate::locator::project_walker;
use crate::matcher::patterns;
use crate::progress::ProgressEvent;
use crate::runtime::RuntimeKind;
use crate::traversal::{CancellationFlag, TraversalContext, TraversalError};
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Entry scripts of interpreted functions, matched case-insensitively
const ENTRY_SCRIPTS: &[&str] = &["index.js", "index.ts", "__init__.py"];

/// Where a function's code was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSource {
    pub name: String,
    pub code: String,
    pub file_path: PathBuf,
    /// Byte offset of the declaration inside `file_path`
    pub pos: usize,
    /// 1-based line of `pos`
    pub line_nr: usize,
}

fn dotnet_source_file() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\.(cs|fs)$").expect("valid regex"))
}

pub fn line_number(text: &str, pos: usize) -> usize {
    text.as_bytes()[..pos.min(text.len())]
        .iter()
        .filter(|&&b| b == b'\n')
        .count()
        + 1
}

struct SourceFile {
    path: PathBuf,
    content: String,
}

/// In-memory copy of every `.cs`/`.fs` file of a project, loaded once per traversal
pub struct SourceIndex {
    files: Vec<SourceFile>,
}

impl SourceIndex {
    /// Reads all C#/F# files under `root` in path order. Unreadable files are skipped.
    pub fn load(root: &Path, cancel: &CancellationFlag) -> Result<Self, TraversalError> {
        let mut files = Vec::new();

        for result in project_walker(root) {
            cancel.check()?;

            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    debug!(error = %err, "Skipping unreadable entry");
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            if !dotnet_source_file().is_match(&entry.file_name().to_string_lossy()) {
                continue;
            }

            match fs::read_to_string(entry.path()) {
                Ok(content) => files.push(SourceFile {
                    path: entry.into_path(),
                    content,
                }),
                Err(err) => {
                    warn!(path = %entry.path().display(), error = %err, "Failed to read source file")
                }
            }
        }

        debug!(files = files.len(), "Indexed .NET source files");
        Ok(Self { files })
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// First declaration of `name` in path order
    pub fn find(&self, name: &str) -> Result<Option<FunctionSource>, TraversalError> {
        let declaration = patterns::dotnet_function_name(name)?;

        for file in &self.files {
            if let Some(m) = declaration.find(&file.content) {
                let code = scan_balanced(&file.content, m.end(), '{', '}', &['\n'])
                    .unwrap_or_default();

                return Ok(Some(FunctionSource {
                    name: name.to_string(),
                    code: code.to_string(),
                    file_path: file.path.clone(),
                    pos: m.start(),
                    line_nr: line_number(&file.content, m.start()),
                }));
            }
        }

        Ok(None)
    }
}

fn is_entry_script(file_name: &str) -> bool {
    ENTRY_SCRIPTS
        .iter()
        .any(|script| script.eq_ignore_ascii_case(file_name))
}

/// Entry script directly inside `function_dir`; nested packages never count
fn find_entry_script(function_dir: &Path) -> Option<PathBuf> {
    let entries = match fs::read_dir(function_dir) {
        Ok(entries) => entries,
        Err(err) => {
            debug!(path = %function_dir.display(), error = %err, "Failed to list function folder");
            return None;
        }
    };

    let mut scripts: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
        .filter(|entry| is_entry_script(&entry.file_name().to_string_lossy()))
        .map(|entry| entry.path())
        .collect();
    scripts.sort();
    scripts.into_iter().next()
}

/// Finds the entry script of an interpreted function: `index.js`, `index.ts` or
/// `__init__.py` inside its folder, else the manifest's `scriptFile`
pub fn find_script_source(
    name: &str,
    function_dir: &Path,
    script_file: Option<&Path>,
) -> Option<FunctionSource> {
    let candidates = find_entry_script(function_dir)
        .into_iter()
        .chain(script_file.map(Path::to_path_buf));

    for path in candidates {
        match fs::read_to_string(&path) {
            Ok(code) => {
                return Some(FunctionSource {
                    name: name.to_string(),
                    code,
                    file_path: path,
                    pos: 0,
                    line_nr: 1,
                })
            }
            Err(err) => debug!(path = %path.display(), error = %err, "Failed to read script"),
        }
    }

    None
}

fn locate_blocking(
    runtime: RuntimeKind,
    project_root: PathBuf,
    working_folder: PathBuf,
    requests: Vec<(String, Option<PathBuf>)>,
    cancel: CancellationFlag,
) -> Result<(BTreeMap<String, FunctionSource>, Vec<String>), TraversalError> {
    let mut found = BTreeMap::new();
    let mut missing = Vec::new();

    let index = if runtime.is_dotnet() {
        Some(SourceIndex::load(&project_root, &cancel)?)
    } else {
        None
    };

    for (name, script_file) in requests {
        cancel.check()?;

        let source = match &index {
            Some(index) => index.find(&name)?,
            None => find_script_source(&name, &working_folder.join(&name), script_file.as_deref()),
        };

        match source {
            Some(source) => {
                found.insert(name, source);
            }
            None => missing.push(name),
        }
    }

    Ok((found, missing))
}

/// Resolves the source of every catalogued function
pub struct SourceLocator<'a> {
    ctx: &'a TraversalContext<'a>,
}

impl<'a> SourceLocator<'a> {
    pub fn new(ctx: &'a TraversalContext<'a>) -> Self {
        Self { ctx }
    }

    /// Returns the located sources keyed by function name. Functions without a
    /// source are reported and left out.
    ///
    /// `project_root` is searched for .NET sources, `working_folder` holds the
    /// per-function folders of interpreted projects.
    pub async fn locate_all(
        &self,
        runtime: RuntimeKind,
        project_root: &Path,
        working_folder: &Path,
        catalog: &FunctionCatalog,
    ) -> Result<BTreeMap<String, FunctionSource>, TraversalError> {
        let script_files: &HashMap<String, PathBuf> = &catalog.script_files;
        let requests: Vec<(String, Option<PathBuf>)> = catalog
            .functions
            .names()
            .map(|name| (name.to_string(), script_files.get(name).cloned()))
            .collect();

        let project_root = project_root.to_path_buf();
        let working_folder = working_folder.to_path_buf();
        let cancel = self.ctx.cancel.clone();

        let (found, missing) = tokio::task::spawn_blocking(move || {
            locate_blocking(runtime, project_root, working_folder, requests, cancel)
        })
        .await??;

        for function in missing {
            self.ctx
                .progress
                .on_progress(&ProgressEvent::SourceNotFound { function });
        }

        Ok(found)
    }
}
