//! # Task trait.
//!
//! A [`Runnable`] is one opaque unit of work executed by a worker. It
//! receives the worker's identity number (for tagging its own reporting) and
//! a [`CancellationToken`] it should check periodically so a hard stop does
//! not have to wait for it.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;

/// Shared handle to a task.
pub type TaskRef = Arc<dyn Runnable>;

/// # Asynchronous, cancelable unit of work.
///
/// Implementors should regularly check the token and exit promptly when the
/// pool is being stopped; a task that ignores it is abandoned after the
/// configured termination grace.
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use async_trait::async_trait;
/// use taskpool::{Runnable, TaskError};
///
/// struct Demo;
///
/// #[async_trait]
/// impl Runnable for Demo {
///     async fn run(&self, worker: u32, cancel: CancellationToken) -> Result<(), TaskError> {
///         if cancel.is_cancelled() {
///             return Err(TaskError::Canceled);
///         }
///         println!("worker {worker}: doing work");
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Runnable: Send + Sync + 'static {
    /// Executes the task to completion or cancellation.
    ///
    /// `worker` is the identity number of the worker running this task, for
    /// log tagging only.
    async fn run(&self, worker: u32, cancel: CancellationToken) -> Result<(), TaskError>;
}
