//! Task discovery
//!
//! A provider maps top-level keys either to an executable or to a group of
//! executables. Discovery registers one task per executable, naming group
//! members `<group>:<member>`, and never descends further than one level.

use crate::error::{DiscoveryError, DiscoveryResult};
use crate::runner::{command_task, normalize, qualified_name, Executable, TaskRegistry};
use serde_yaml::{Mapping, Value};

/// A provider entry
#[derive(Debug, Clone)]
pub enum TaskDef {
    /// A directly executable task
    Leaf(Executable),

    /// A group of executable members
    Group(Vec<(String, Executable)>),
}

/// Ordered set of task definitions
#[derive(Debug, Clone, Default)]
pub struct Provider {
    entries: Vec<(String, TaskDef)>,
}

impl Provider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a top-level task
    pub fn task(mut self, name: impl Into<String>, task: Executable) -> Self {
        self.entries.push((name.into(), TaskDef::Leaf(task)));
        self
    }

    /// Add a group of tasks
    pub fn group<N, I>(mut self, name: impl Into<String>, members: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = (N, Executable)>,
    {
        let members = members.into_iter().map(|(n, t)| (n.into(), t)).collect();
        self.entries.push((name.into(), TaskDef::Group(members)));
        self
    }

    /// Build a provider from the manifest `tasks` mapping
    ///
    /// A task is a command or a list of commands. A group is a mapping of
    /// member names to tasks. Any other shape is rejected.
    pub fn from_yaml(tasks: &Mapping) -> DiscoveryResult<Self> {
        let mut provider = Provider::new();

        for (key, value) in tasks {
            let name = yaml_key(key)?;
            let def = match value {
                Value::Mapping(members) => {
                    let mut group = Vec::with_capacity(members.len());
                    for (member_key, member) in members {
                        let member_name = yaml_key(member_key)?;
                        let task = yaml_commands(member).ok_or_else(|| {
                            DiscoveryError::InvalidGroupMember {
                                group: name.clone(),
                                member: member_name.clone(),
                                found: describe(member),
                            }
                        })?;
                        group.push((member_name, command_task(task)));
                    }
                    TaskDef::Group(group)
                }
                other => {
                    let task = yaml_commands(other).ok_or_else(|| DiscoveryError::InvalidTask {
                        name: name.clone(),
                        found: describe(other),
                    })?;
                    TaskDef::Leaf(command_task(task))
                }
            };
            provider.entries.push((name, def));
        }

        Ok(provider)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Register every task of a provider, returning the canonical names in order
pub fn discover(provider: Provider, registry: &mut TaskRegistry) -> Vec<String> {
    let mut registered = Vec::new();

    for (key, def) in provider.entries {
        match def {
            TaskDef::Leaf(task) => {
                let name = normalize(&key);
                registry.register(name.clone(), task);
                registered.push(name);
            }
            TaskDef::Group(members) => {
                for (member, task) in members {
                    let name = qualified_name(&key, &member);
                    registry.register(name.clone(), task);
                    registered.push(name);
                }
            }
        }
    }

    tracing::debug!(count = registered.len(), "Discovered tasks");
    registered
}

/// Discover the manifest `tasks` mapping into the registry
pub fn discover_yaml(tasks: &Mapping, registry: &mut TaskRegistry) -> DiscoveryResult<Vec<String>> {
    let provider = Provider::from_yaml(tasks)?;
    Ok(discover(provider, registry))
}

fn yaml_key(key: &Value) -> DiscoveryResult<String> {
    match key {
        Value::String(s) => Ok(s.clone()),
        other => Err(DiscoveryError::InvalidKey(format!("{:?}", other))),
    }
}

/// A single command or a list of commands
fn yaml_commands(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::String(cmd) => Some(vec![cmd.clone()]),
        Value::Sequence(items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => None,
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "nothing",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list containing non-commands",
        Value::Mapping(_) => "a nested group",
        Value::Tagged(_) => "a tagged value",
    }
}
