//! Mermaid flowchart text for a finished [`FunctionsMap`]

use crate::functions::{BindingDescriptor, Direction, FunctionRecord, FunctionsMap, TriggerKind};

fn escape_label(text: &str) -> String {
    text.replace('"', "#quot;")
}

fn node(record: &FunctionRecord) -> String {
    let label = escape_label(&record.name);
    match record.trigger_kind() {
        TriggerKind::Orchestrator => format!("{}[[\"{}\"]]", record.name, label),
        TriggerKind::Activity => format!("{}[/\"{}\"/]", record.name, label),
        TriggerKind::Entity => format!("{}[(\"{}\")]", record.name, label),
        TriggerKind::Other => format!("{}{{{{\"{}\"}}}}", record.name, label),
    }
}

/// Descriptive text for a binding node: queue name, blob path, schedule, ...
pub fn binding_label(binding: &BindingDescriptor) -> String {
    let lower = binding.binding_type.to_ascii_lowercase();
    let base = lower.strip_suffix("trigger").unwrap_or(&lower);

    let label = match base {
        "http" => {
            let methods = binding
                .methods()
                .iter()
                .map(|m| m.to_ascii_uppercase())
                .collect::<Vec<_>>()
                .join(",");
            let route = binding.field("route").map(|r| format!("/{}", r.trim_start_matches('/')));
            match (methods.is_empty(), route) {
                (true, None) => None,
                (true, Some(route)) => Some(route),
                (false, None) => Some(methods),
                (false, Some(route)) => Some(format!("{} {}", methods, route)),
            }
        }
        "blob" => binding.field("path").map(str::to_string),
        "cosmosdb" => match (binding.field("databaseName"), binding.field("collectionName")) {
            (Some(db), Some(collection)) => Some(format!("{}:{}", db, collection)),
            (Some(db), None) => Some(db.to_string()),
            _ => None,
        },
        "eventhub" => binding.field("eventHubName").map(str::to_string),
        "servicebus" => binding.field("queueName").map(str::to_string).or_else(|| {
            binding.field("topicName").map(|topic| match binding.field("subscriptionName") {
                Some(subscription) => format!("{}:{}", topic, subscription),
                None => topic.to_string(),
            })
        }),
        "queue" | "rabbitmq" => binding.field("queueName").map(str::to_string),
        "timer" => binding.field("schedule").map(str::to_string),
        "table" => binding.field("tableName").map(str::to_string),
        "signalr" | "signalrconnectioninfo" => binding.field("hubName").map(str::to_string),
        "eventgrid" => binding.field("topicEndpointUri").map(str::to_string),
        _ => None,
    };

    escape_label(&label.unwrap_or_else(|| binding.binding_type.clone()))
}

/// Externally triggered functions nothing calls come first, then by name
fn sort_key(record: &FunctionRecord) -> (bool, &str) {
    let is_entry_point = record.is_called_by.is_empty() && record.external_trigger().is_some();
    (!is_entry_point, record.name.as_str())
}

/// Renders the map as a left-to-right Mermaid flowchart
pub fn diagram_code(functions: &FunctionsMap) -> String {
    let mut records: Vec<&FunctionRecord> = functions.iter().collect();
    records.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));

    let mut out = String::from("graph LR\n");

    for record in records {
        let name = &record.name;
        out.push_str(&format!("{}\n", node(record)));

        for caller in &record.is_called_by {
            out.push_str(&format!("{} ---> {}\n", caller, name));
        }

        if record.is_called_by.is_empty() {
            if let Some(trigger) = record.external_trigger() {
                out.push_str(&format!(
                    "{}.{}>\"{}\"]:::{} --> {}\n",
                    name,
                    trigger.binding_type,
                    binding_label(trigger),
                    trigger.binding_type,
                    name
                ));
            }
        }

        for (idx, binding) in record.bindings.iter().enumerate() {
            if binding.is_trigger() {
                continue;
            }
            let binding_node = format!(
                "{}.{}.{}([\"{}\"]):::{}",
                name,
                binding.binding_type,
                idx,
                binding_label(binding),
                binding.binding_type
            );
            let edge = match binding.direction {
                Direction::In => format!("{} -.-> {}", binding_node, name),
                Direction::Out => format!("{} -.-> {}", name, binding_node),
                Direction::Inout => format!("{} -.- {}", name, binding_node),
            };
            out.push_str(&edge);
            out.push('\n');
        }

        for signal in &record.is_signalled_by {
            out.push_str(&format!(
                "{} -. \"signal: {}\" .-> {}\n",
                signal.name,
                escape_label(&signal.signal_name),
                name
            ));
        }

        if record.is_called_by_itself {
            out.push_str(&format!("{} -- \"[ContinueAsNew]\" --> {}\n", name, name));
        }
    }

    out
}
