//! # Function-backed task (`TaskFn`).
//!
//! [`TaskFn`] wraps a closure `F: Fn(u32, CancellationToken) -> Fut`,
//! producing a fresh future per execution. Each run owns its own state; if a
//! task needs state shared across runs or workers, capture an `Arc<...>`
//! explicitly inside the closure.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::tasks::task::Runnable;

/// Function-backed task implementation.
///
/// ## Example
/// ```rust
/// use tokio_util::sync::CancellationToken;
/// use taskpool::{TaskFn, TaskError};
///
/// let t = TaskFn::arc(|worker: u32, _cancel: CancellationToken| async move {
///     println!("worker {worker}: hello");
///     Ok::<_, TaskError>(())
/// });
/// # let _ = t;
/// ```
#[derive(Debug)]
pub struct TaskFn<F> {
    f: F,
}

impl<F> TaskFn<F> {
    /// Creates a new function-backed task.
    ///
    /// Prefer [`TaskFn::arc`] when you immediately need a shared handle.
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the task and returns it as a shared handle.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

#[async_trait]
impl<F, Fut> Runnable for TaskFn<F>
where
    F: Fn(u32, CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    async fn run(&self, worker: u32, cancel: CancellationToken) -> Result<(), TaskError> {
        (self.f)(worker, cancel).await
    }
}
