//! Output formatting for multiple formats
//!
//! Traversal results can be printed as JSON, YAML or human-readable text.
//!
//! # Example
//!
//! ```ignore
//! use funcgraph::cli::output::{OutputFormat, OutputFormatter};
//!
//! let formatter = OutputFormatter::new(OutputFormat::Json);
//! let output = formatter.format(&result)?;
//! println!("{}", output);
//! ```

use anyhow::{Context, Result};

use crate::functions::{FunctionRecord, TraversalResult, TriggerKind};

const RULE: &str = "\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}";

/// Output format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format (human-friendly, version-control friendly)
    Yaml,
    /// Human-readable formatted text
    Human,
}

/// Output formatter for traversal results
pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self, result: &TraversalResult) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.format_json(result),
            OutputFormat::Yaml => self.format_yaml(result),
            OutputFormat::Human => self.format_human(result),
        }
    }

    fn format_json(&self, result: &TraversalResult) -> Result<String> {
        serde_json::to_string_pretty(result).context("Failed to serialize traversal result to JSON")
    }

    fn format_yaml(&self, result: &TraversalResult) -> Result<String> {
        serde_yaml::to_string(result).context("Failed to serialize traversal result to YAML")
    }

    fn format_human(&self, result: &TraversalResult) -> Result<String> {
        let mut output = String::new();
        let functions = &result.functions;

        output.push_str("\u{2713} Function Graph\n");
        output.push_str(RULE);
        output.push_str("\n\n");

        let count = |kind| functions.iter().filter(|f| f.trigger_kind() == kind).count();
        output.push_str(&format!(
            "Functions: {} ({} orchestrators, {} activities, {} entities, {} other)\n",
            functions.len(),
            count(TriggerKind::Orchestrator),
            count(TriggerKind::Activity),
            count(TriggerKind::Entity),
            count(TriggerKind::Other),
        ));

        for record in functions.iter() {
            output.push('\n');
            output.push_str(&format_record(record));
        }

        if !result.temp_folders.is_empty() {
            output.push_str("\nTemp folders:\n");
            for folder in &result.temp_folders {
                output.push_str(&format!("  - {}\n", folder.display()));
            }
        }

        Ok(output)
    }
}

fn format_record(record: &FunctionRecord) -> String {
    let mut lines = Vec::new();

    if let Some(trigger) = record.trigger_binding() {
        lines.push(format!("Trigger:    {}", trigger.binding_type));
    }
    if !record.is_called_by.is_empty() {
        lines.push(format!("Called by:  {}", record.is_called_by.join(", ")));
    }
    if !record.is_signalled_by.is_empty() {
        let signals = record
            .is_signalled_by
            .iter()
            .map(|s| format!("{} ({})", s.name, s.signal_name))
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("Signalled:  {}", signals));
    }
    if record.is_called_by_itself {
        lines.push("Continues as new".to_string());
    }
    let others = record
        .bindings
        .iter()
        .filter(|b| !b.is_trigger())
        .map(|b| format!("{} ({})", b.binding_type, b.direction))
        .collect::<Vec<_>>();
    if !others.is_empty() {
        lines.push(format!("Bindings:   {}", others.join(", ")));
    }
    match (&record.file_path, record.line_nr) {
        (Some(path), Some(line)) => lines.push(format!("Source:     {}:{}", path.display(), line)),
        (Some(path), None) => lines.push(format!("Source:     {}", path.display())),
        _ => lines.push("Source:     (not found)".to_string()),
    }

    let mut output = format!("{} ({})\n", record.name, record.trigger_kind());
    for (i, line) in lines.iter().enumerate() {
        let connector = if i == lines.len() - 1 {
            "\u{2514}"
        } else {
            "\u{251C}"
        };
        output.push_str(&format!("{}\u{2500} {}\n", connector, line));
    }
    output
}
