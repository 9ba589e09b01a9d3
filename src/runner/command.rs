//! Command execution
//!
//! Manifest tasks are lists of shell commands. Each command is run through
//! the context's interpreter in the context's working directory, one after
//! another, and the first non-zero exit fails the task.

use crate::error::{ExecutionError, ExecutionResult};
use crate::runner::{interpolate, Context, Executable};
use futures::future::FutureExt;
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;

/// Build an executable that runs the given commands in order
pub fn command_task(commands: Vec<String>) -> Executable {
    let commands: Arc<[String]> = commands.into();
    Executable::with_context(move |ctx| {
        let commands = Arc::clone(&commands);
        async move {
            for cmd in commands.iter() {
                execute_command(cmd, &ctx).await?;
            }
            Ok::<(), ExecutionError>(())
        }
        .boxed()
    })
}

/// Execute a command in the given context
pub async fn execute_command(cmd: &str, ctx: &Context) -> ExecutionResult<()> {
    let vars = ctx.flags.vars();
    let exec_str = interpolate(cmd, &vars)?;

    tracing::info!(task = ctx.current_task().map(String::as_str).unwrap_or(""), "$ {}", exec_str);

    let (program, args) = ctx
        .interpreter
        .split_first()
        .ok_or_else(|| ExecutionError::Spawn {
            command: exec_str.clone(),
            error: "no interpreter configured".to_string(),
        })?;

    let status = Command::new(program)
        .args(args)
        .arg(&exec_str)
        .current_dir(&ctx.working_dir)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await
        .map_err(|e| ExecutionError::Spawn {
            command: exec_str.clone(),
            error: e.to_string(),
        })?;

    if !status.success() {
        return Err(ExecutionError::CommandFailed(status.code()));
    }

    Ok(())
}
