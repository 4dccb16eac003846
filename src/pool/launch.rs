//! # Worker launch seam.
//!
//! [`Launch`] is the boundary between the controller and worker isolation:
//! the controller decides *when* a worker may exist, the launcher decides
//! *how* it runs. The default [`TokioLauncher`] runs each worker as a
//! dedicated tokio task; a process-backed launcher (or a failing stub in
//! tests) plugs in through the same trait without touching the control loop.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::SpawnError;
use crate::events::Bus;
use crate::pool::worker;
use crate::tasks::TaskRegistry;

use std::sync::Arc;

/// Everything a worker needs, handed over at launch.
#[derive(Clone)]
pub struct WorkerContext {
    /// Identity number (`1..=max_workers`) this worker is labeled with.
    pub number: u32,
    /// The full ordered task list; every worker replays it from the first
    /// task, never a partitioned subset.
    pub tasks: Arc<[String]>,
    /// Registry used to resolve task names.
    pub registry: Arc<TaskRegistry>,
    /// Shared event bus for progress reporting.
    pub bus: Bus,
    /// Cancelled when this worker is forcibly terminated.
    pub cancel: CancellationToken,
}

/// Creates one isolated worker from a [`WorkerContext`].
///
/// A launcher may refuse (resource limits, simulated failures); the
/// controller logs the refusal, releases the slot, and still charges the
/// launch against a bounded budget.
pub trait Launch: Send + Sync + 'static {
    /// Starts a worker and returns its join handle.
    fn launch(&self, ctx: WorkerContext) -> Result<JoinHandle<()>, SpawnError>;
}

/// Default launcher: one tokio task per worker.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioLauncher;

impl Launch for TokioLauncher {
    fn launch(&self, ctx: WorkerContext) -> Result<JoinHandle<()>, SpawnError> {
        Ok(tokio::spawn(worker::run_worker(ctx)))
    }
}
