//! Traversal integration tests over the fixture projects
//!
//! None of these need network access, git or the dotnet SDK. Clone and publish run
//! small shell scripts standing in for `git` and `dotnet`; tests that start processes
//! are serialized so no script is executed while another is still being written.

use funcgraph::bindings::extract_bindings;
use funcgraph::functions::{BindingDescriptor, FunctionRecord};
use funcgraph::matcher::{apply_edges, RelationshipMatcher};
use funcgraph::source::SourceIndex;
use funcgraph::{
    traverse, CancellationFlag, Direction, FuncGraphConfig, FunctionsMap, NoOpHandler,
    ProgressEvent, ProgressHandler, SignalRef, TempResourceTracker, TraversalContext,
    TraversalError, TraversalResult,
};
use serial_test::serial;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

#[derive(Default)]
struct RecordingHandler {
    events: Mutex<Vec<String>>,
}

impl ProgressHandler for RecordingHandler {
    fn on_progress(&self, event: &ProgressEvent) {
        let name = match event {
            ProgressEvent::FunctionManifestFailed { path, .. } => {
                format!("manifest-failed:{}", path.parent().unwrap().file_name().unwrap().to_string_lossy())
            }
            ProgressEvent::SourceNotFound { function } => format!("source-not-found:{}", function),
            ProgressEvent::Completed { .. } => "completed".to_string(),
            ProgressEvent::Failed { .. } => "failed".to_string(),
            _ => return,
        };
        self.events.lock().unwrap().push(name);
    }
}

async fn traverse_with(
    config: &FuncGraphConfig,
    tracker: &TempResourceTracker,
    progress: &dyn ProgressHandler,
    location: &str,
) -> Result<TraversalResult, TraversalError> {
    let cancel = CancellationFlag::new();
    let ctx = TraversalContext {
        config,
        tracker,
        progress,
        cancel: &cancel,
    };
    traverse(&ctx, location).await
}

async fn traverse_fixture(name: &str) -> TraversalResult {
    let temp = TempDir::new().unwrap();
    let config = FuncGraphConfig::default();
    let tracker = TempResourceTracker::new(temp.path());
    let location = fixtures_dir().join(name);

    traverse_with(&config, &tracker, &NoOpHandler, &location.to_string_lossy())
        .await
        .unwrap()
}

/// Keys plus every edge, for comparing two traversals
fn edge_set(functions: &FunctionsMap) -> BTreeSet<String> {
    let mut edges = BTreeSet::new();
    for f in functions.iter() {
        edges.insert(format!("node {}", f.name));
        for caller in &f.is_called_by {
            edges.insert(format!("{} -> {}", caller, f.name));
        }
        for signal in &f.is_signalled_by {
            edges.insert(format!("{} -{}-> {}", signal.name, signal.signal_name, f.name));
        }
        if f.is_called_by_itself {
            edges.insert(format!("{} -> self", f.name));
        }
    }
    edges
}

#[tokio::test]
async fn test_javascript_project_graph() {
    let result = traverse_fixture("js-app").await;
    let functions = &result.functions;

    assert!(result.temp_folders.is_empty());
    assert_eq!(
        functions.names().collect::<Vec<_>>(),
        vec!["Act1", "Counter", "Eternal", "HttpStart", "Orch1", "Orch3", "Sender"]
    );

    let orch1 = functions.get("Orch1").unwrap();
    assert_eq!(orch1.is_called_by, vec!["HttpStart"]);
    assert!(!orch1.is_called_by_itself);

    assert_eq!(functions.get("Act1").unwrap().is_called_by, vec!["Orch1"]);
    assert_eq!(functions.get("Orch3").unwrap().is_called_by, vec!["HttpStart"]);
    assert_eq!(
        functions.get("Orch3").unwrap().is_signalled_by,
        vec![SignalRef {
            name: "Sender".to_string(),
            signal_name: "Go".to_string(),
        }]
    );
    assert_eq!(functions.get("Counter").unwrap().is_called_by, vec!["Sender"]);
    assert!(functions.get("Eternal").unwrap().is_called_by_itself);
    assert!(functions.get("HttpStart").unwrap().is_called_by.is_empty());
}

#[tokio::test]
async fn test_javascript_project_source_positions() {
    let result = traverse_fixture("js-app").await;
    let app = fixtures_dir().join("js-app");

    let orch1 = result.functions.get("Orch1").unwrap();
    assert_eq!(orch1.file_path, Some(app.join("Orch1").join("index.js")));
    assert_eq!(orch1.pos, Some(0));
    assert_eq!(orch1.line_nr, Some(1));

    // No index file in its folder, so the manifest's scriptFile is used
    let eternal = result.functions.get("Eternal").unwrap();
    assert_eq!(
        eternal.file_path,
        Some(app.join("Eternal").join("../dist/eternal.js"))
    );
}

#[tokio::test]
async fn test_manifest_bindings_are_kept_verbatim() {
    let result = traverse_fixture("js-app").await;

    let http = result.functions.get("HttpStart").unwrap();
    assert_eq!(http.bindings.len(), 3);
    assert_eq!(http.bindings[0].methods(), vec!["post", "get"]);
    assert_eq!(http.bindings[0].field("route"), Some("orchestrators/{functionName}"));

    let act = result.functions.get("Act1").unwrap();
    assert_eq!(act.bindings[1].direction, Direction::Out);
    assert_eq!(act.bindings[1].field("path"), Some("greetings/{rand-guid}.txt"));
}

#[tokio::test]
async fn test_broken_manifest_is_reported_and_skipped() {
    let temp = TempDir::new().unwrap();
    let config = FuncGraphConfig::default();
    let tracker = TempResourceTracker::new(temp.path());
    let handler = RecordingHandler::default();
    let location = fixtures_dir().join("js-app");

    let result = traverse_with(&config, &tracker, &handler, &location.to_string_lossy())
        .await
        .unwrap();

    assert!(!result.functions.contains("Broken"));
    let events = handler.events.lock().unwrap();
    assert!(events.contains(&"manifest-failed:Broken".to_string()));
    assert_eq!(events.last().map(String::as_str), Some("completed"));
}

#[tokio::test]
async fn test_python_project_graph() {
    let result = traverse_fixture("python-app").await;
    let functions = &result.functions;

    assert_eq!(functions.len(), 4);
    assert_eq!(
        functions.get("HelloOrchestrator").unwrap().is_called_by,
        vec!["DurableStart"]
    );
    assert_eq!(functions.get("Hello").unwrap().is_called_by, vec!["HelloOrchestrator"]);
    assert_eq!(
        functions.get("Monitor").unwrap().is_called_by,
        vec!["HelloOrchestrator"]
    );
    assert!(functions.get("Monitor").unwrap().is_called_by_itself);
    assert!(!functions.get("HelloOrchestrator").unwrap().is_called_by_itself);
}

#[tokio::test]
async fn test_traversal_is_idempotent() {
    let first = traverse_fixture("js-app").await;
    let second = traverse_fixture("js-app").await;

    assert_eq!(edge_set(&first.functions), edge_set(&second.functions));
    assert_eq!(first.functions, second.functions);
}

#[tokio::test]
async fn test_result_serializes_with_camel_case_fields() {
    let result = traverse_fixture("js-app").await;
    let json = serde_json::to_value(&result).unwrap();

    assert!(json["tempFolders"].as_array().unwrap().is_empty());
    let orch3 = &json["functions"]["Orch3"];
    assert_eq!(orch3["isCalledBy"], serde_json::json!(["HttpStart"]));
    assert_eq!(
        orch3["isSignalledBy"],
        serde_json::json!([{"name": "Sender", "signalName": "Go"}])
    );
    assert_eq!(orch3["isCalledByItself"], serde_json::json!(false));
}

#[tokio::test]
async fn test_missing_manifest_is_fatal() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("README.md"), "no functions here").unwrap();

    let config = FuncGraphConfig::default();
    let tracker = TempResourceTracker::new(temp.path());
    let handler = RecordingHandler::default();

    let result = traverse_with(&config, &tracker, &handler, &temp.path().to_string_lossy()).await;

    assert!(matches!(result, Err(TraversalError::ManifestNotFound(_))));
    assert_eq!(handler.events.lock().unwrap().as_slice(), ["failed".to_string()]);
}

#[tokio::test]
#[serial]
async fn test_failed_clone_keeps_temp_folder_recorded() {
    let temp = TempDir::new().unwrap();
    let config = FuncGraphConfig {
        git_program: "funcgraph-no-such-git".to_string(),
        ..FuncGraphConfig::default()
    };
    let tracker = TempResourceTracker::new(temp.path());

    let result = traverse_with(
        &config,
        &tracker,
        &NoOpHandler,
        "https://github.com/org/repo/tree/main/sub/dir",
    )
    .await;

    assert!(matches!(result, Err(TraversalError::Clone { ref url, .. }) if url == "https://github.com/org/repo.git"));
    let folders = tracker.folders();
    assert_eq!(folders.len(), 1);
    assert!(folders[0].starts_with(temp.path()));

    assert_eq!(tracker.cleanup(), 1);
    assert!(!folders[0].exists());
}

#[tokio::test]
#[serial]
async fn test_failed_publish_is_fatal() {
    let temp = TempDir::new().unwrap();
    let config = FuncGraphConfig {
        dotnet_program: "funcgraph-no-such-dotnet".to_string(),
        ..FuncGraphConfig::default()
    };
    let tracker = TempResourceTracker::new(temp.path());
    let location = fixtures_dir().join("dotnet-src");

    let result = traverse_with(&config, &tracker, &NoOpHandler, &location.to_string_lossy()).await;

    assert!(matches!(result, Err(TraversalError::Publish { .. })));
    assert_eq!(tracker.folders().len(), 1);
    tracker.cleanup();
}

/// Writes an executable `sh` script standing in for an external tool
#[cfg(unix)]
fn write_tool_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\nset -e\n{}", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[cfg(unix)]
#[tokio::test]
#[serial]
async fn test_clone_descends_into_tree_subdirectory() {
    let tools = TempDir::new().unwrap();
    let temp = TempDir::new().unwrap();
    // The checkout holds the Python app under sub/dir; the clone arguments are kept
    // next to the checkout
    let git = write_tool_script(
        tools.path(),
        "git",
        &format!(
            "for target; do :; done\n\
             printf '%s\\n' \"$@\" > \"$(dirname \"$target\")/git-args.txt\"\n\
             mkdir -p \"$target/sub\"\n\
             cp -R '{}' \"$target/sub/dir\"\n",
            fixtures_dir().join("python-app").display()
        ),
    );

    let config = FuncGraphConfig {
        git_program: git.display().to_string(),
        shallow_clone: true,
        ..FuncGraphConfig::default()
    };
    let tracker = TempResourceTracker::new(temp.path());

    let result = traverse_with(
        &config,
        &tracker,
        &NoOpHandler,
        "https://github.com/org/repo/tree/main/sub/dir",
    )
    .await
    .unwrap();

    assert_eq!(result.temp_folders.len(), 1);
    let clone_root = &result.temp_folders[0];
    assert!(clone_root.starts_with(temp.path()));

    let git_args = std::fs::read_to_string(clone_root.join("git-args.txt")).unwrap();
    let git_args: Vec<&str> = git_args.lines().collect();
    assert_eq!(git_args[..4], ["clone", "--depth", "1", "https://github.com/org/repo.git"]);
    assert_eq!(git_args[4], clone_root.join("repo").display().to_string());

    let app = clone_root.join("repo").join("sub").join("dir");
    let functions = &result.functions;
    assert_eq!(
        functions.names().collect::<Vec<_>>(),
        vec!["DurableStart", "Hello", "HelloOrchestrator", "Monitor"]
    );
    assert_eq!(
        functions.get("HelloOrchestrator").unwrap().is_called_by,
        vec!["DurableStart"]
    );
    assert_eq!(functions.get("Hello").unwrap().is_called_by, vec!["HelloOrchestrator"]);
    assert!(functions.get("Monitor").unwrap().is_called_by_itself);
    assert_eq!(
        functions.get("Hello").unwrap().file_path,
        Some(app.join("Hello").join("__init__.py"))
    );

    assert_eq!(tracker.cleanup(), 1);
    assert!(!clone_root.exists());
}

#[cfg(unix)]
#[tokio::test]
#[serial]
async fn test_dotnet_project_is_published_and_matched_against_sources() {
    let tools = TempDir::new().unwrap();
    let temp = TempDir::new().unwrap();
    let dotnet = write_tool_script(
        tools.path(),
        "dotnet",
        &format!(
            "out=''\n\
             while [ $# -gt 0 ]; do\n\
               if [ \"$1\" = '-o' ]; then out=\"$2\"; fi\n\
               shift\n\
             done\n\
             [ -n \"$out\" ]\n\
             cp -R '{}/.' \"$out\"\n",
            fixtures_dir().join("dotnet-publish").display()
        ),
    );

    let config = FuncGraphConfig {
        dotnet_program: dotnet.display().to_string(),
        ..FuncGraphConfig::default()
    };
    let tracker = TempResourceTracker::new(temp.path());
    let source_root = fixtures_dir().join("dotnet-src");

    let result = traverse_with(&config, &tracker, &NoOpHandler, &source_root.to_string_lossy())
        .await
        .unwrap();

    assert_eq!(result.temp_folders.len(), 1);
    assert!(result.temp_folders[0]
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("funcgraph-publish-"));

    let functions = &result.functions;
    assert_eq!(
        functions.names().collect::<Vec<_>>(),
        vec!["Approval", "Approve", "HttpStart", "SayHello"]
    );

    // Sources come from the original tree, not the publish output
    let http = functions.get("HttpStart").unwrap();
    assert_eq!(http.file_path, Some(source_root.join("Orchestrations.cs")));
    assert_eq!(http.line_nr, Some(13));

    let approval = functions.get("Approval").unwrap();
    assert_eq!(approval.is_called_by, vec!["HttpStart"]);
    assert_eq!(
        approval.is_signalled_by,
        vec![SignalRef {
            name: "Approve".to_string(),
            signal_name: "Approved".to_string(),
        }]
    );
    assert_eq!(functions.get("SayHello").unwrap().is_called_by, vec!["Approval"]);

    // Attribute bindings are appended after the published ones
    assert_eq!(http.bindings.len(), 2);
    assert_eq!(http.bindings[0].binding_type, "httpTrigger");
    assert_eq!(http.bindings[1].binding_type, "blob");
    assert_eq!(http.bindings[1].direction, Direction::Inout);
    assert_eq!(http.bindings[1].field("path"), Some("requests/{rand-guid}.json"));

    let approve = functions.get("Approve").unwrap();
    assert_eq!(approve.bindings.len(), 2);
    assert_eq!(approve.bindings[1].binding_type, "queue");
    assert_eq!(approve.bindings[1].direction, Direction::Out);
    assert_eq!(approve.bindings[1].field("queueName"), Some("approved-requests"));

    // Durable functions never get attribute bindings
    assert_eq!(approval.bindings.len(), 1);
    assert_eq!(functions.get("SayHello").unwrap().bindings.len(), 1);

    assert_eq!(tracker.cleanup(), 1);
}

fn record(name: &str, trigger: &str) -> FunctionRecord {
    FunctionRecord::new(name, vec![BindingDescriptor::new(trigger, Direction::In)])
}

#[test]
fn test_dotnet_sources_and_relationships() {
    let root = fixtures_dir().join("dotnet-src");
    let index = SourceIndex::load(&root, &CancellationFlag::new()).unwrap();
    assert_eq!(index.len(), 2);

    // Function folders as a publish would lay them out
    let mut functions: FunctionsMap = vec![
        record("HttpStart", "httpTrigger"),
        record("Approval", "orchestrationTrigger"),
        record("SayHello", "activityTrigger"),
        record("Approve", "queueTrigger"),
    ]
    .into_iter()
    .collect();

    let sources: BTreeMap<_, _> = functions
        .names()
        .filter_map(|name| index.find(name).unwrap())
        .map(|source| (source.name.clone(), source))
        .collect();
    assert_eq!(sources.len(), 4);

    let http = &sources["HttpStart"];
    assert_eq!(http.file_path, root.join("Orchestrations.cs"));
    assert_eq!(http.line_nr, 13);
    assert!(http.code.contains("StartNewAsync(nameof(Approval), null)"));
    assert!(!http.code.contains("CallActivityAsync"));

    let edges = RelationshipMatcher::new(&functions, &sources)
        .find_edges()
        .unwrap();
    apply_edges(&mut functions, edges);

    assert_eq!(functions.get("Approval").unwrap().is_called_by, vec!["HttpStart"]);
    assert_eq!(functions.get("SayHello").unwrap().is_called_by, vec!["Approval"]);
    assert_eq!(
        functions.get("Approval").unwrap().is_signalled_by,
        vec![SignalRef {
            name: "Approve".to_string(),
            signal_name: "Approved".to_string(),
        }]
    );
}

#[test]
fn test_dotnet_attribute_bindings() {
    let root = fixtures_dir().join("dotnet-src");
    let index = SourceIndex::load(&root, &CancellationFlag::new()).unwrap();

    let http = index.find("HttpStart").unwrap().unwrap();
    let bindings = extract_bindings(&http.code);
    assert_eq!(bindings.len(), 1);
    assert_eq!(bindings[0].binding_type, "blob");
    assert_eq!(bindings[0].direction, Direction::Inout);
    assert_eq!(bindings[0].field("path"), Some("requests/{rand-guid}.json"));

    let approve = index.find("Approve").unwrap().unwrap();
    let bindings = extract_bindings(&approve.code);
    assert_eq!(bindings.len(), 1);
    assert_eq!(bindings[0].binding_type, "queue");
    assert_eq!(bindings[0].direction, Direction::Out);
    assert_eq!(bindings[0].field("queueName"), Some("approved-requests"));
}

#[test]
fn test_fixture_paths_exist() {
    for name in ["js-app", "python-app", "dotnet-src"] {
        assert!(Path::new(&fixtures_dir().join(name).join("host.json")).exists());
    }
}
