//! Heuristic detection of call, signal and self-continuation edges
//!
//! Functions are grouped by trigger kind and every group's source is searched for
//! the Durable Functions calls that target another group. Only functions whose
//! source was located take part, on either end of an edge.

pub mod patterns;

use crate::functions::{FunctionsMap, TriggerKind};
use crate::source::FunctionSource;
use crate::traversal::TraversalError;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use tracing::trace;

/// A relationship found in source code, by function name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edge {
    Call { caller: String, callee: String },
    Signal {
        sender: String,
        target: String,
        signal: String,
    },
    SelfCall { function: String },
}

/// A function together with its located code
struct Located<'a> {
    name: &'a str,
    code: &'a str,
}

pub struct RelationshipMatcher<'a> {
    functions: &'a FunctionsMap,
    sources: &'a BTreeMap<String, FunctionSource>,
}

impl<'a> RelationshipMatcher<'a> {
    pub fn new(functions: &'a FunctionsMap, sources: &'a BTreeMap<String, FunctionSource>) -> Self {
        Self { functions, sources }
    }

    fn located(&self, kind: TriggerKind) -> Vec<Located<'a>> {
        let sources = self.sources;
        self.functions
            .iter()
            .filter(|f| f.trigger_kind() == kind)
            .filter_map(|f| {
                sources.get(&f.name).map(|source| Located {
                    name: f.name.as_str(),
                    code: source.code.as_str(),
                })
            })
            .collect()
    }

    /// Every edge between located functions, grouped by orchestrator then entity
    pub fn find_edges(&self) -> Result<Vec<Edge>, TraversalError> {
        let orchestrators = self.located(TriggerKind::Orchestrator);
        let activities = self.located(TriggerKind::Activity);
        let entities = self.located(TriggerKind::Entity);
        let others = self.located(TriggerKind::Other);

        let sub_orchestration_calls = orchestrators
            .iter()
            .map(|o| Ok((o.name, patterns::call_sub_orchestrator(o.name)?)))
            .collect::<Result<Vec<(&str, Regex)>, regex::Error>>()?;
        let activity_calls = activities
            .iter()
            .map(|a| Ok((a.name, patterns::call_activity(a.name)?)))
            .collect::<Result<Vec<(&str, Regex)>, regex::Error>>()?;
        let mut raise_patterns: HashMap<String, Regex> = HashMap::new();

        let mut edges = Vec::new();

        for orchestrator in &orchestrators {
            let starts = patterns::start_orchestration(orchestrator.name)?;
            for other in &others {
                if starts.is_match(other.code) {
                    edges.push(Edge::Call {
                        caller: other.name.to_string(),
                        callee: orchestrator.name.to_string(),
                    });
                }
            }

            for (sub, calls) in &sub_orchestration_calls {
                if *sub != orchestrator.name && calls.is_match(orchestrator.code) {
                    edges.push(Edge::Call {
                        caller: orchestrator.name.to_string(),
                        callee: sub.to_string(),
                    });
                }
            }

            for (activity, calls) in &activity_calls {
                if calls.is_match(orchestrator.code) {
                    edges.push(Edge::Call {
                        caller: orchestrator.name.to_string(),
                        callee: activity.to_string(),
                    });
                }
            }

            if patterns::continue_as_new().is_match(orchestrator.code) {
                edges.push(Edge::SelfCall {
                    function: orchestrator.name.to_string(),
                });
            }

            for event in patterns::awaited_events(orchestrator.code) {
                if !raise_patterns.contains_key(&event) {
                    raise_patterns.insert(event.clone(), patterns::raise_event(&event)?);
                }
                let raises = &raise_patterns[&event];
                for other in &others {
                    if raises.is_match(other.code) {
                        edges.push(Edge::Signal {
                            sender: other.name.to_string(),
                            target: orchestrator.name.to_string(),
                            signal: event.clone(),
                        });
                    }
                }
            }
        }

        for entity in &entities {
            let referenced = patterns::entity_reference(entity.name)?;
            for other in &others {
                if referenced.is_match(other.code) {
                    edges.push(Edge::Call {
                        caller: other.name.to_string(),
                        callee: entity.name.to_string(),
                    });
                }
            }
        }

        Ok(edges)
    }
}

/// Applies `edges` to the map and returns how many were kept.
/// Edges naming a function missing from the map are dropped.
pub fn apply_edges(functions: &mut FunctionsMap, edges: Vec<Edge>) -> usize {
    let mut applied = 0;

    for edge in edges {
        let kept = match &edge {
            Edge::Call { caller, callee } => functions.add_caller(callee, caller),
            Edge::Signal {
                sender,
                target,
                signal,
            } => functions.add_signal(target, sender, signal),
            Edge::SelfCall { function } => functions.mark_called_by_itself(function),
        };

        if kept {
            applied += 1;
        } else {
            trace!(edge = ?edge, "Dropped edge to unknown function");
        }
    }

    applied
}
