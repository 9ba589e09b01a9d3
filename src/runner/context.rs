//! Execution context for task running
//!
//! The context carries everything a running task may consult: the frozen
//! registry used to resolve task names, the flag snapshot, and the
//! environment command tasks run in. Each execution path owns its own copy,
//! so the task stack describes exactly the chain of names leading to the
//! current task.

use crate::error::ExecutionError;
use crate::runner::{Flags, TaskFuture, TaskRegistry};
use futures::future::FutureExt;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Execution context that tracks state during task execution
#[derive(Debug, Clone)]
pub struct Context {
    /// Registered tasks, read-only while running
    pub registry: Arc<TaskRegistry>,

    /// Runtime flag snapshot consulted by conditions
    pub flags: Arc<Flags>,

    /// Working directory for command tasks
    pub working_dir: PathBuf,

    /// Interpreter for command tasks (e.g., ["bash", "-c"])
    pub interpreter: Vec<String>,

    /// Names resolved on the way to the current task (for detecting recursion)
    pub task_stack: Vec<String>,
}

impl Context {
    /// Create a context over a populated registry and a flag snapshot
    pub fn new(registry: TaskRegistry, flags: Flags) -> Self {
        Context {
            registry: Arc::new(registry),
            flags: Arc::new(flags),
            working_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            interpreter: vec!["sh".to_string(), "-c".to_string()],
            task_stack: Vec::new(),
        }
    }

    /// Create a context with a specific working directory
    pub fn with_working_dir(mut self, dir: PathBuf) -> Self {
        self.working_dir = dir;
        self
    }

    /// Set the interpreter
    pub fn with_interpreter(mut self, interpreter: Vec<String>) -> Self {
        self.interpreter = interpreter;
        self
    }

    /// Push a task onto the execution stack
    pub fn push_task(&mut self, task_name: String) {
        self.task_stack.push(task_name);
    }

    /// Check if a task is in the execution stack (detect recursion)
    pub fn is_task_in_stack(&self, task_name: &str) -> bool {
        self.task_stack.iter().any(|t| t == task_name)
    }

    /// Get the current task name (top of stack)
    pub fn current_task(&self) -> Option<&String> {
        self.task_stack.last()
    }

    /// Resolve a task by name and run it
    ///
    /// Resolution happens when the returned future is first polled, so a
    /// name only has to be registered by the time execution reaches it.
    pub fn run_task(&self, name: &str) -> TaskFuture {
        let name = name.to_string();
        let mut ctx = self.clone();

        async move {
            if ctx.is_task_in_stack(&name) {
                let mut chain = ctx.task_stack.clone();
                chain.push(name);
                return Err(ExecutionError::Recursion(chain.join(" -> ")));
            }

            let task = ctx.registry.get(&name)?.clone();
            ctx.push_task(name.clone());

            tracing::info!(task = %name, "Starting '{}'", name);
            let started = Instant::now();

            match task.run(ctx).await {
                Ok(()) => {
                    tracing::info!(
                        task = %name,
                        "Finished '{}' after {:.2?}",
                        name,
                        started.elapsed()
                    );
                    Ok(())
                }
                Err(e) => {
                    let e = e.attribute(&name);
                    if matches!(&e, ExecutionError::TaskFailed { task, .. } if *task == name) {
                        tracing::error!(
                            task = %name,
                            "'{}' errored after {:.2?}",
                            name,
                            started.elapsed()
                        );
                    }
                    Err(e)
                }
            }
        }
        .boxed()
    }
}
