//! # Task abstractions and the registry.
//!
//! - [`Runnable`] - trait for implementing async, cancelable tasks
//! - [`TaskFn`] - function-backed task implementation
//! - [`TaskRef`] - shared handle to a task (`Arc<dyn Runnable>`)
//! - [`TaskRegistry`] - explicit name → factory mapping, resolved by workers
//!
//! Tasks are opaque to the controller: it never inspects what a task does,
//! only resolves names through the registry and runs the result inside a
//! worker.

mod registry;
mod task;
mod task_fn;

pub use registry::TaskRegistry;
pub use task::{Runnable, TaskRef};
pub use task_fn::TaskFn;
