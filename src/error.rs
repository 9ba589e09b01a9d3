//! Error types for taskrig

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for taskrig operations
pub type Result<T> = std::result::Result<T, TaskrigError>;

/// Main error type for taskrig
#[derive(Error, Debug)]
pub enum TaskrigError {
    /// Manifest-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Task provider shape errors
    #[error("Discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    /// Task execution errors
    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// YAML parsing errors
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Manifest parsing and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to find manifest (searched: {0})")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Option '{0}' is declared more than once")]
    DuplicateOption(String),

    #[error("Option '{0}' collides with a built-in command line flag")]
    ReservedOption(String),

    #[error("Condition in pipeline '{pipeline}' refers to undeclared flag '{flag}'")]
    UnknownFlag { pipeline: String, flag: String },

    #[error("Circular pipeline reference detected: {0}")]
    CircularDependency(String),

    #[error("Failed to read manifest '{path}': {error}")]
    Read { path: PathBuf, error: String },
}

/// Errors raised while turning a task provider into registered tasks
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Task key {0} is not a string")]
    InvalidKey(String),

    #[error("Task '{name}' must be a command, a list of commands or a group, found {found}")]
    InvalidTask { name: String, found: &'static str },

    #[error("Member '{member}' of group '{group}' must be a command or a list of commands, found {found}")]
    InvalidGroupMember {
        group: String,
        member: String,
        found: &'static str,
    },
}

/// Task execution errors
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Task '{0}' is not registered")]
    TaskNotFound(String),

    #[error("Task '{task}' failed: {source:#}")]
    TaskFailed {
        task: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("{0:#}")]
    Failed(anyhow::Error),

    #[error("Command failed with exit code {0:?}")]
    CommandFailed(Option<i32>),

    #[error("Failed to start command '{command}': {error}")]
    Spawn { command: String, error: String },

    #[error("Recursive task reference: {0}")]
    Recursion(String),

    #[error("{} parallel tasks failed:\n{}", .0.len(), format_failures(.0))]
    Parallel(Vec<ExecutionError>),

    #[error(transparent)]
    Interpolation(#[from] InterpolationError),
}

impl ExecutionError {
    /// Attach a task name to a failure that is not yet attributed to a task.
    ///
    /// Failures already naming a task (or aggregating several) pass through
    /// untouched, so the innermost named task is the one reported.
    pub fn attribute(self, task: &str) -> Self {
        match self {
            ExecutionError::Failed(source) => ExecutionError::TaskFailed {
                task: task.to_string(),
                source,
            },
            err @ (ExecutionError::CommandFailed(_)
            | ExecutionError::Spawn { .. }
            | ExecutionError::Interpolation(_)) => ExecutionError::TaskFailed {
                task: task.to_string(),
                source: anyhow::Error::new(err),
            },
            other => other,
        }
    }

    /// Every individual failure carried by this error, flattening parallel groups
    pub fn failures(&self) -> Vec<&ExecutionError> {
        match self {
            ExecutionError::Parallel(errors) => errors.iter().flat_map(|e| e.failures()).collect(),
            other => vec![other],
        }
    }
}

fn format_failures(errors: &[ExecutionError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Variable interpolation errors
#[derive(Error, Debug)]
pub enum InterpolationError {
    #[error("Recursive interpolation detected")]
    RecursiveInterpolation,
}

/// Specialized result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Specialized result type for discovery operations
pub type DiscoveryResult<T> = std::result::Result<T, DiscoveryError>;

/// Specialized result type for execution operations
pub type ExecutionResult<T> = std::result::Result<T, ExecutionError>;

/// Specialized result type for interpolation operations
pub type InterpolationResult<T> = std::result::Result<T, InterpolationError>;
