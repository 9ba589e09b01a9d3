//! Taskrig - a composable build-task orchestration engine
//!
//! Tasks are discovered from a provider, named in canonical kebab-case,
//! registered (or swapped for a no-op when disabled) and composed with the
//! `series`, `parallel` and `condition` combinators into named pipelines.
//!
//! ```rust,ignore
//! use taskrig::runner::{discover, series, Context, DisabledTasks, Executable, Flags, Provider, TaskRegistry};
//!
//! let provider = Provider::new()
//!     .task("clean", Executable::from_fn(|| Ok(())))
//!     .group("ts", vec![("commonjs", Executable::from_fn(|| Ok(())))]);
//!
//! let mut registry = TaskRegistry::new(DisabledTasks::none());
//! discover(provider, &mut registry);
//! registry.register("build", series(["clean", "ts:commonjs"]));
//!
//! let ctx = Context::new(registry, Flags::default());
//! ctx.run_task("build").await?;
//! ```

// Public modules
pub mod cli;
pub mod config;
pub mod error;
pub mod runner;

// Re-export commonly used types
pub use error::{Result, TaskrigError};

/// Current version of taskrig
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
