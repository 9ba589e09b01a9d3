//! Task registry and disablement
//!
//! The registry maps canonical names to executables. It is populated during
//! start-up and frozen behind an `Arc` once execution begins.

use crate::error::{ExecutionError, ExecutionResult};
use crate::runner::Executable;
use std::collections::HashMap;

/// Tasks switched off by the manifest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisabledTasks {
    names: Vec<String>,
    source: String,
}

impl DisabledTasks {
    /// Disabled task names and the file they were read from
    pub fn new(names: Vec<String>, source: impl Into<String>) -> Self {
        DisabledTasks {
            names,
            source: source.into(),
        }
    }

    /// No task is disabled
    pub fn none() -> Self {
        Self::default()
    }

    /// Exact match against a canonical task name
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Where the list came from, used in the disabled notice
    pub fn source(&self) -> &str {
        &self.source
    }
}

/// Registry of named executables
#[derive(Debug, Clone, Default)]
pub struct TaskRegistry {
    tasks: HashMap<String, Executable>,
    disabled: DisabledTasks,
}

impl TaskRegistry {
    /// Create a registry that substitutes the given disabled tasks
    pub fn new(disabled: DisabledTasks) -> Self {
        TaskRegistry {
            tasks: HashMap::new(),
            disabled,
        }
    }

    /// Register a task, replacing any previous task of the same name
    ///
    /// A disabled name is stored as a no-op that reports itself instead of
    /// the given executable.
    pub fn register(&mut self, name: impl Into<String>, task: Executable) {
        let name = name.into();
        let task = if self.disabled.contains(&name) {
            tracing::debug!(task = %name, "Registering disabled stand-in");
            Executable::disabled(name.clone(), self.disabled.source())
        } else {
            task
        };

        if self.tasks.insert(name.clone(), task).is_some() {
            tracing::debug!(task = %name, "Replaced previously registered task");
        }
    }

    /// Look up a task by canonical name
    pub fn get(&self, name: &str) -> ExecutionResult<&Executable> {
        self.tasks
            .get(name)
            .ok_or_else(|| ExecutionError::TaskNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    /// Whether a registered name runs as the disabled stand-in
    pub fn is_disabled(&self, name: &str) -> bool {
        self.disabled.contains(name) && self.contains(name)
    }

    /// All registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tasks.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Disabled names that never matched a registered task
    pub fn unmatched_disabled(&self) -> Vec<&str> {
        self.disabled
            .names()
            .iter()
            .filter(|name| !self.contains(name))
            .map(String::as_str)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
