//! Function graph data model
//!
//! Functions are stored in a name-keyed arena ([`FunctionsMap`]) and every edge is a
//! name reference into that arena. Edges are only ever added when both ends are
//! present in the map.

mod binding;
mod manifest;

pub use binding::{
    BindingDescriptor, Direction, ACTIVITY_TRIGGER, ENTITY_TRIGGER, ORCHESTRATION_TRIGGER,
};
pub use manifest::{FunctionManifest, FUNCTION_MANIFEST_FILE};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Group a function falls into, decided by its trigger binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerKind {
    Orchestrator,
    Activity,
    Entity,
    Other,
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TriggerKind::Orchestrator => "orchestrator",
            TriggerKind::Activity => "activity",
            TriggerKind::Entity => "entity",
            TriggerKind::Other => "function",
        };
        f.write_str(name)
    }
}

/// A function that raises an event the owning orchestrator waits for
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalRef {
    pub name: String,
    pub signal_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionRecord {
    pub name: String,
    pub bindings: Vec<BindingDescriptor>,
    pub is_called_by: Vec<String>,
    pub is_signalled_by: Vec<SignalRef>,
    pub is_called_by_itself: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<PathBuf>,

    /// Byte offset of the declaration inside `file_path`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos: Option<usize>,

    /// 1-based line of `pos`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_nr: Option<usize>,
}

impl FunctionRecord {
    pub fn new(name: impl Into<String>, bindings: Vec<BindingDescriptor>) -> Self {
        Self {
            name: name.into(),
            bindings,
            is_called_by: Vec::new(),
            is_signalled_by: Vec::new(),
            is_called_by_itself: false,
            file_path: None,
            pos: None,
            line_nr: None,
        }
    }

    /// Classifies by the first durable trigger binding in manifest order.
    ///
    /// Declaring more than one durable trigger is not a valid function; the first one
    /// wins so classification stays deterministic.
    pub fn trigger_kind(&self) -> TriggerKind {
        self.bindings
            .iter()
            .find(|b| b.is_durable_trigger())
            .map(|b| {
                if b.is_type(ORCHESTRATION_TRIGGER) {
                    TriggerKind::Orchestrator
                } else if b.is_type(ACTIVITY_TRIGGER) {
                    TriggerKind::Activity
                } else {
                    TriggerKind::Entity
                }
            })
            .unwrap_or(TriggerKind::Other)
    }

    pub fn trigger_binding(&self) -> Option<&BindingDescriptor> {
        self.bindings.iter().find(|b| b.is_trigger())
    }

    pub fn external_trigger(&self) -> Option<&BindingDescriptor> {
        self.bindings.iter().find(|b| b.is_external_trigger())
    }
}

/// Name-keyed arena of every function discovered in a project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FunctionsMap {
    functions: BTreeMap<String, FunctionRecord>,
}

impl FunctionsMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record keyed by its name. Returns false (and keeps the existing
    /// record) when the name is already taken.
    pub fn insert(&mut self, record: FunctionRecord) -> bool {
        if self.functions.contains_key(&record.name) {
            return false;
        }
        self.functions.insert(record.name.clone(), record);
        true
    }

    pub fn get(&self, name: &str) -> Option<&FunctionRecord> {
        self.functions.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut FunctionRecord> {
        self.functions.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FunctionRecord> {
        self.functions.values()
    }

    /// Names of all functions in the given group, in name order
    pub fn names_of_kind(&self, kind: TriggerKind) -> Vec<String> {
        self.functions
            .values()
            .filter(|f| f.trigger_kind() == kind)
            .map(|f| f.name.clone())
            .collect()
    }

    /// Records `caller -> callee`. Dropped when either end is unknown.
    pub fn add_caller(&mut self, callee: &str, caller: &str) -> bool {
        if !self.functions.contains_key(caller) {
            return false;
        }
        match self.functions.get_mut(callee) {
            Some(record) => {
                record.is_called_by.push(caller.to_string());
                true
            }
            None => false,
        }
    }

    /// Records that `sender` raises `signal_name`, which `target` waits for
    pub fn add_signal(&mut self, target: &str, sender: &str, signal_name: &str) -> bool {
        if !self.functions.contains_key(sender) {
            return false;
        }
        match self.functions.get_mut(target) {
            Some(record) => {
                record.is_signalled_by.push(SignalRef {
                    name: sender.to_string(),
                    signal_name: signal_name.to_string(),
                });
                true
            }
            None => false,
        }
    }

    pub fn mark_called_by_itself(&mut self, name: &str) -> bool {
        match self.functions.get_mut(name) {
            Some(record) => {
                record.is_called_by_itself = true;
                true
            }
            None => false,
        }
    }
}

impl FromIterator<FunctionRecord> for FunctionsMap {
    fn from_iter<I: IntoIterator<Item = FunctionRecord>>(iter: I) -> Self {
        let mut map = FunctionsMap::new();
        for record in iter {
            map.insert(record);
        }
        map
    }
}

/// Output of a whole traversal
///
/// `temp_folders` must be deleted by whoever owns the traversal, once nothing needs
/// `file_path` navigation into them anymore.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraversalResult {
    pub functions: FunctionsMap,
    pub temp_folders: Vec<PathBuf>,
}
