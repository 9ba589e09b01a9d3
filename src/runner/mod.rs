//! Task execution engine
//!
//! This module holds the task graph: option declarations, the registry,
//! discovery of provider tasks, the composition combinators and the
//! pipelines built from them.

pub mod combinator;
pub mod command;
pub mod context;
pub mod discovery;
pub mod executable;
pub mod interpolate;
pub mod naming;
pub mod options;
pub mod pipeline;
pub mod registry;
pub mod when;

// Re-export main types
pub use combinator::*;
pub use command::*;
pub use context::*;
pub use discovery::*;
pub use executable::*;
pub use interpolate::*;
pub use naming::*;
pub use options::*;
pub use pipeline::*;
pub use registry::*;
pub use when::*;
