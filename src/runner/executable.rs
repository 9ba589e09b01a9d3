//! Executable units of work
//!
//! Everything the engine runs is an [`Executable`]: leaf tasks supplied by
//! the environment, the disabled stand-in, and the composite nodes built by
//! the combinators. Executables are cheap to clone and produce a fresh
//! future every time they are run.

use crate::error::{ExecutionError, ExecutionResult};
use crate::runner::Context;
use futures::future::{self, BoxFuture, FutureExt};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Future returned by running an executable
pub type TaskFuture = BoxFuture<'static, ExecutionResult<()>>;

type RunFn = dyn Fn(Context) -> TaskFuture + Send + Sync;

/// A runnable unit of work
#[derive(Clone)]
pub struct Executable {
    run: Arc<RunFn>,
}

impl Executable {
    /// Wrap an async, zero-argument task
    pub fn new<F, Fut>(task: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self::with_context(move |_ctx| task().map(|r| r.map_err(ExecutionError::Failed)).boxed())
    }

    /// Wrap a synchronous, zero-argument task
    pub fn from_fn<F>(task: F) -> Self
    where
        F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self::with_context(move |_ctx| future::ready(task().map_err(ExecutionError::Failed)).boxed())
    }

    /// Wrap a task that needs the execution context
    pub fn with_context<F>(run: F) -> Self
    where
        F: Fn(Context) -> TaskFuture + Send + Sync + 'static,
    {
        Executable { run: Arc::new(run) }
    }

    /// A task that does nothing
    pub fn noop() -> Self {
        Self::with_context(|_ctx| future::ok(()).boxed())
    }

    /// Stand-in for a task switched off in the manifest
    pub fn disabled(name: impl Into<String>, source: impl Into<String>) -> Self {
        let name = name.into();
        let source = source.into();
        Self::with_context(move |_ctx| {
            tracing::info!(task = %name, "{} task is disabled in {}", name, source);
            future::ok(()).boxed()
        })
    }

    /// Start the task
    pub fn run(&self, ctx: Context) -> TaskFuture {
        (self.run)(ctx)
    }
}

impl fmt::Debug for Executable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Executable").finish_non_exhaustive()
    }
}
