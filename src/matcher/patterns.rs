//! Regular expressions recognising Durable Functions API usage
//!
//! Verb keywords match case-insensitively so the C#, JavaScript and Python spellings
//! (`CallActivityAsync`, `callActivity`, `call_activity`) are all covered. Target
//! names are escaped and matched with their exact casing.

use regex::Regex;
use std::sync::OnceLock;

/// Optional generic argument list: `<string>`, `<List<int>>`, `<Dictionary<string, int[]>>`
const GENERIC_ARGS: &str = r"(?:<[\w.\[\]<>,\s-]+>)?";

/// What may precede a target name inside the call parentheses: an opening quote, a
/// `nameof(` (optionally qualified), or a member access like `Names.`
const NAME_PREFIX: &str = r#"(?:["'`]|(?i:nameof)\s*\(\s*[\w.-]*|[\w\s.]+\.\s*)"#;

/// What must follow a target name
const NAME_SUFFIX: &str = r#"\s*["'`),]"#;

fn name(target: &str) -> String {
    regex::escape(target)
}

/// A client starting orchestration `orchestrator`
/// (`StartNewAsync`, `startNew`, `start_new`, `ScheduleNewOrchestrationInstanceAsync`)
pub fn start_orchestration(orchestrator: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        r"(?i:StartNew|start_new|scheduleNewOrchestrationInstance|schedule_new_orchestration)(?i:Async)?{}\s*\(\s*{}{}{}",
        GENERIC_ARGS,
        NAME_PREFIX,
        name(orchestrator),
        NAME_SUFFIX
    ))
}

/// An orchestrator calling `sub_orchestrator` as a sub-orchestration
pub fn call_sub_orchestrator(sub_orchestrator: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        r"(?i:CallSubOrchestrator|CallSubOrchestratorWithRetry|call_sub_orchestrator|call_sub_orchestrator_with_retry)(?i:Async)?{}\s*\(\s*{}{}{}",
        GENERIC_ARGS,
        NAME_PREFIX,
        name(sub_orchestrator),
        NAME_SUFFIX
    ))
}

/// An orchestrator calling `activity`
pub fn call_activity(activity: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        r#"(?i:CallActivity|call_activity)[\w\s,.<>\[\]()?-]*\([\s\w.-]*["'`]?{}{}"#,
        name(activity),
        NAME_SUFFIX
    ))
}

/// Any function raising `event` (anywhere after the verb)
pub fn raise_event(event: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        r"(?i:RaiseEvent|raise_event)(?i:Async)?(?s:.)*{}",
        name(event)
    ))
}

/// Loose proxy for "builds a typed client / entity id for `entity`": the name
/// immediately followed by a quote or `>`
pub fn entity_reference(entity: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r#"{}["'>]"#, name(entity)))
}

/// .NET name declaration: `[FunctionName("X")]`, `[FunctionName(nameof(X))]`,
/// `[Function("X")]` (isolated worker)
pub fn dotnet_function_name(function: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        r#"\b(?:FunctionName|Function)(?:Attribute)?\s*\(\s*(?:(?i:nameof)\s*\(\s*|["'`]|[\w\s.]+\.\s*){}\s*["'`)]"#,
        name(function)
    ))
}

pub fn continue_as_new() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i:ContinueAsNew|continue_as_new)\s*\(").expect("valid regex")
    })
}

/// Every awaited external event; the name is in the `event` group
pub fn wait_for_external_event() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(
            r#"(?i:WaitForExternalEvent|wait_for_external_event)(?i:Async)?{}\s*\(\s*(?:(?i:nameof)\s*\(\s*|["'`]|[\w\s.]+\.\s*)?(?P<event>[\s\w.-]+){}"#,
            GENERIC_ARGS, NAME_SUFFIX
        ))
        .expect("valid regex")
    })
}

/// Distinct event names an orchestrator waits for, in order of first appearance
pub fn awaited_events(code: &str) -> Vec<String> {
    let mut events: Vec<String> = Vec::new();
    for caps in wait_for_external_event().captures_iter(code) {
        if let Some(event) = caps.name("event") {
            let event = event.as_str().trim();
            if !event.is_empty() && !events.iter().any(|e| e == event) {
                events.push(event.to_string());
            }
        }
    }
    events
}
