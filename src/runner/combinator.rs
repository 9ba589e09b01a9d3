//! Composition combinators
//!
//! `series`, `parallel` and `condition` turn references into a single
//! executable. A reference is either a task name, resolved against the
//! registry only when execution reaches it, or an inline node.

use crate::error::ExecutionError;
use crate::runner::{Context, Executable, Flags, TaskFuture};
use futures::future::{self, join_all, FutureExt};
use std::sync::Arc;

/// Something a combinator can run
#[derive(Debug, Clone)]
pub enum Reference {
    /// A registered task or pipeline, looked up at execution time
    Task(String),

    /// An anonymous inline composition
    Node(Executable),
}

impl Reference {
    /// Start the referenced work
    pub fn run(&self, ctx: &Context) -> TaskFuture {
        match self {
            Reference::Task(name) => ctx.run_task(name),
            Reference::Node(node) => node.run(ctx.clone()),
        }
    }
}

impl From<&str> for Reference {
    fn from(name: &str) -> Self {
        Reference::Task(name.to_string())
    }
}

impl From<String> for Reference {
    fn from(name: String) -> Self {
        Reference::Task(name)
    }
}

impl From<Executable> for Reference {
    fn from(node: Executable) -> Self {
        Reference::Node(node)
    }
}

/// Run references one after another
///
/// Each reference starts only after the previous one completed. The first
/// failure stops the sequence and is returned.
pub fn series<I, R>(refs: I) -> Executable
where
    I: IntoIterator<Item = R>,
    R: Into<Reference>,
{
    let refs: Arc<[Reference]> = refs.into_iter().map(Into::into).collect();
    Executable::with_context(move |ctx| {
        let refs = Arc::clone(&refs);
        async move {
            for reference in refs.iter() {
                reference.run(&ctx).await?;
            }
            Ok::<(), ExecutionError>(())
        }
        .boxed()
    })
}

/// Run references concurrently
///
/// Every reference is started and awaited, even when a sibling fails. A
/// single failure is returned as is, several are aggregated into
/// [`ExecutionError::Parallel`].
pub fn parallel<I, R>(refs: I) -> Executable
where
    I: IntoIterator<Item = R>,
    R: Into<Reference>,
{
    let refs: Arc<[Reference]> = refs.into_iter().map(Into::into).collect();
    Executable::with_context(move |ctx| {
        let started: Vec<TaskFuture> = refs.iter().map(|r| r.run(&ctx)).collect();
        async move {
            let mut failures: Vec<ExecutionError> = join_all(started)
                .await
                .into_iter()
                .filter_map(Result::err)
                .flat_map(|err| match err {
                    ExecutionError::Parallel(inner) => inner,
                    other => vec![other],
                })
                .collect();

            match failures.len() {
                0 => Ok(()),
                1 => Err(failures.remove(0)),
                _ => Err(ExecutionError::Parallel(failures)),
            }
        }
        .boxed()
    })
}

/// Run a reference only when the predicate holds
///
/// The predicate sees the flags of the running context and is evaluated
/// right before the reference would start. A false predicate skips the
/// reference and counts as success.
pub fn condition<R, P>(reference: R, predicate: P) -> Executable
where
    R: Into<Reference>,
    P: Fn(&Flags) -> bool + Send + Sync + 'static,
{
    let reference = reference.into();
    Executable::with_context(move |ctx| {
        if predicate(ctx.flags.as_ref()) {
            reference.run(&ctx)
        } else {
            if let Reference::Task(name) = &reference {
                tracing::debug!(task = %name, "Skipping '{}': condition not met", name);
            } else {
                tracing::debug!("Skipping inline step: condition not met");
            }
            future::ok(()).boxed()
        }
    })
}
