//! Recovery of output and input bindings from .NET attribute syntax
//!
//! Published in-process apps only list trigger bindings in `function.json`; the
//! others are declared as parameter or return-value attributes
//! (`[Blob("out/{name}")] Stream s`, `[return: Queue("q")]`) and are read back from
//! the located source here.

use crate::functions::{BindingDescriptor, Direction, FunctionsMap, TriggerKind};
use crate::source::{scan_balanced, FunctionSource};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;
use tracing::debug;

/// How an attribute's argument text maps onto binding fields
#[derive(Debug, Clone, Copy)]
enum Params {
    None,
    /// First quoted string
    Quoted(&'static str),
    /// First and second quoted strings
    TwoQuoted(&'static str, &'static str),
    /// First argument, either a string literal, `nameof(...)` or a bare identifier
    FirstArgument(&'static str),
}

struct AttributeRule {
    attribute: &'static str,
    binding_type: &'static str,
    /// Direction when the attribute decorates a parameter
    direction: Direction,
    params: Params,
}

const RULES: &[AttributeRule] = &[
    AttributeRule {
        attribute: "Blob",
        binding_type: "blob",
        direction: Direction::Inout,
        params: Params::Quoted("path"),
    },
    AttributeRule {
        attribute: "Table",
        binding_type: "table",
        direction: Direction::Inout,
        params: Params::FirstArgument("tableName"),
    },
    AttributeRule {
        attribute: "CosmosDB",
        binding_type: "cosmosDB",
        direction: Direction::Inout,
        params: Params::TwoQuoted("databaseName", "collectionName"),
    },
    AttributeRule {
        attribute: "SignalRConnectionInfo",
        binding_type: "signalRConnectionInfo",
        direction: Direction::In,
        params: Params::Quoted("hubName"),
    },
    AttributeRule {
        attribute: "EventGrid",
        binding_type: "eventGrid",
        direction: Direction::Out,
        params: Params::TwoQuoted("topicEndpointUri", "topicKeySetting"),
    },
    AttributeRule {
        attribute: "EventHub",
        binding_type: "eventHub",
        direction: Direction::Out,
        params: Params::Quoted("eventHubName"),
    },
    AttributeRule {
        attribute: "Queue",
        binding_type: "queue",
        direction: Direction::Out,
        params: Params::FirstArgument("queueName"),
    },
    AttributeRule {
        attribute: "ServiceBus",
        binding_type: "serviceBus",
        direction: Direction::Out,
        params: Params::FirstArgument("queueName"),
    },
    AttributeRule {
        attribute: "SignalR",
        binding_type: "signalR",
        direction: Direction::Out,
        params: Params::Quoted("hubName"),
    },
    AttributeRule {
        attribute: "RabbitMQ",
        binding_type: "rabbitMQ",
        direction: Direction::Out,
        params: Params::Quoted("queueName"),
    },
    AttributeRule {
        attribute: "SendGrid",
        binding_type: "sendGrid",
        direction: Direction::Out,
        params: Params::None,
    },
    AttributeRule {
        attribute: "TwilioSms",
        binding_type: "twilioSms",
        direction: Direction::Out,
        params: Params::None,
    },
];

fn attribute_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\[<?\s*(?P<ret>return\s*:)?\s*(?P<name>\w+?)(?:Attribute)?\s*\(")
            .expect("valid regex")
    })
}

fn quoted_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#""([^"]+)""#).expect("valid regex"))
}

fn two_quoted_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#""([^"]+)"(?s:.)+?"([^"]+)""#).expect("valid regex"))
}

fn first_argument_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"("|(?i:nameof)\s*\()?([\w.-]+)"#).expect("valid regex"))
}

fn topic_entity_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"EntityType\s*\.\s*Topic\b").expect("valid regex"))
}

fn rule_for(attribute: &str) -> Option<&'static AttributeRule> {
    RULES.iter().find(|rule| rule.attribute == attribute)
}

fn apply_params(mut binding: BindingDescriptor, rule: &AttributeRule, args: &str) -> BindingDescriptor {
    match rule.params {
        Params::None => {}
        Params::Quoted(field) => {
            if let Some(caps) = quoted_pattern().captures(args) {
                binding = binding.with_field(field, &caps[1]);
            }
        }
        Params::TwoQuoted(first, second) => {
            if let Some(caps) = two_quoted_pattern().captures(args) {
                binding = binding.with_field(first, &caps[1]).with_field(second, &caps[2]);
            }
        }
        Params::FirstArgument(field) => {
            if let Some(caps) = first_argument_pattern().captures(args) {
                let field = if rule.binding_type == "serviceBus"
                    && topic_entity_pattern().is_match(args)
                {
                    "topicName"
                } else {
                    field
                };
                binding = binding.with_field(field, &caps[2]);
            }
        }
    }
    binding
}

/// Bindings declared through recognised attributes in `code`, in source order.
/// Unrecognised attributes are skipped; a recognised one whose arguments cannot be
/// read still yields a binding, just without the fields.
pub fn extract_bindings(code: &str) -> Vec<BindingDescriptor> {
    let mut bindings = Vec::new();

    for caps in attribute_pattern().captures_iter(code) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.name("name")) else {
            continue;
        };
        let Some(rule) = rule_for(name.as_str()) else {
            continue;
        };

        let direction = if caps.name("ret").is_some() {
            Direction::Out
        } else {
            rule.direction
        };
        let binding = BindingDescriptor::new(rule.binding_type, direction);

        // The pattern ends on the opening parenthesis
        let binding = match scan_balanced(code, whole.end() - 1, '(', ')', &[]) {
            Some(args) => apply_params(binding, rule, args),
            None => binding,
        };
        bindings.push(binding);
    }

    bindings
}

/// Appends attribute-declared bindings to every located non-durable function.
/// Returns the number of bindings added.
pub fn extend_bindings(
    functions: &mut FunctionsMap,
    sources: &BTreeMap<String, FunctionSource>,
) -> usize {
    let mut added = 0;

    for name in functions.names_of_kind(TriggerKind::Other) {
        let Some(source) = sources.get(&name) else {
            continue;
        };
        let extracted = extract_bindings(&source.code);
        if extracted.is_empty() {
            continue;
        }
        if let Some(record) = functions.get_mut(&name) {
            debug!(function = %name, bindings = extracted.len(), "Recovered bindings from attributes");
            added += extracted.len();
            record.bindings.extend(extracted);
        }
    }

    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::FunctionRecord;
    use std::path::PathBuf;

    #[test]
    fn test_blob_parameter_is_inout() {
        let code = r#")]
        public static async Task Run(
            [HttpTrigger(AuthorizationLevel.Function, "get")] HttpRequest req,
            [Blob("samples-workitems/{name}", FileAccess.Read)] Stream myBlob)
        {
        }"#;

        let bindings = extract_bindings(code);
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].binding_type, "blob");
        assert_eq!(bindings[0].direction, Direction::Inout);
        assert_eq!(bindings[0].field("path"), Some("samples-workitems/{name}"));
    }

    #[test]
    fn test_return_position_is_out() {
        let code = r#")]
        [return: Blob("output/{rand-guid}")]
        public static string Run([QueueTrigger("q")] string item) => item;"#;

        let bindings = extract_bindings(code);
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].direction, Direction::Out);
        assert_eq!(bindings[0].field("path"), Some("output/{rand-guid}"));
    }

    #[test]
    fn test_attribute_suffix_and_fsharp_syntax() {
        let bindings = extract_bindings(r#"[<QueueAttribute("orders")>] orders: ICollector<string>"#);
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].binding_type, "queue");
        assert_eq!(bindings[0].field("queueName"), Some("orders"));
    }

    #[test]
    fn test_two_quoted_params() {
        let code = r#"[CosmosDB(
                databaseName: "ToDoItems",
                collectionName: "Items",
                ConnectionStringSetting = "CosmosDBConnection")] out dynamic document"#;

        let bindings = extract_bindings(code);
        assert_eq!(bindings[0].binding_type, "cosmosDB");
        assert_eq!(bindings[0].direction, Direction::Inout);
        assert_eq!(bindings[0].field("databaseName"), Some("ToDoItems"));
        assert_eq!(bindings[0].field("collectionName"), Some("Items"));
    }

    #[test]
    fn test_first_argument_forms() {
        let bindings = extract_bindings(
            r#"[Table(nameof(Orders))] CloudTable t, [Queue(QueueNames.Outgoing)] ICollector<string> q"#,
        );
        assert_eq!(bindings[0].field("tableName"), Some("Orders"));
        assert_eq!(bindings[1].field("queueName"), Some("QueueNames.Outgoing"));
    }

    #[test]
    fn test_service_bus_topic() {
        let bindings = extract_bindings(
            r#"[ServiceBus("mytopic", EntityType = EntityType.Topic, Connection = "SB")] out string msg"#,
        );
        assert_eq!(bindings[0].field("topicName"), Some("mytopic"));
        assert_eq!(bindings[0].field("queueName"), None);
    }

    #[test]
    fn test_unrecognised_and_unreadable_attributes() {
        let bindings = extract_bindings(r#"[HttpTrigger("get")] req, [Obsolete("x")] a, [SendGrid(ApiKey = "k")] out m, [EventHub("#);
        assert_eq!(bindings.len(), 2);
        assert_eq!(bindings[0].binding_type, "sendGrid");
        assert!(bindings[0].properties.is_empty());
        assert_eq!(bindings[1].binding_type, "eventHub");
        assert_eq!(bindings[1].field("eventHubName"), None);
    }

    #[test]
    fn test_extend_bindings_only_touches_other_functions() {
        let mut functions: FunctionsMap = vec![
            FunctionRecord::new(
                "HttpStart",
                vec![BindingDescriptor::new("httpTrigger", Direction::In)],
            ),
            FunctionRecord::new(
                "Act1",
                vec![BindingDescriptor::new("activityTrigger", Direction::In)],
            ),
        ]
        .into_iter()
        .collect();

        let code = r#"[Queue("jobs")] IAsyncCollector<string> jobs"#;
        let sources: BTreeMap<String, FunctionSource> = ["HttpStart", "Act1"]
            .into_iter()
            .map(|name| {
                (
                    name.to_string(),
                    FunctionSource {
                        name: name.to_string(),
                        code: code.to_string(),
                        file_path: PathBuf::from("Functions.cs"),
                        pos: 0,
                        line_nr: 1,
                    },
                )
            })
            .collect();

        assert_eq!(extend_bindings(&mut functions, &sources), 1);

        let http = functions.get("HttpStart").unwrap();
        assert_eq!(http.bindings.len(), 2);
        assert_eq!(http.bindings[0].binding_type, "httpTrigger");
        assert_eq!(http.bindings[1].binding_type, "queue");
        assert_eq!(functions.get("Act1").unwrap().bindings.len(), 1);
    }
}
