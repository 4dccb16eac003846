//! Error types used by the pool runtime and tasks.
//!
//! - [`ConfigError`]: malformed [`PoolConfig`](crate::PoolConfig), rejected at construction.
//! - [`SlotError`]: slot allocator misuse; always a controller bug, treated as fatal.
//! - [`RegistryError`]: task name lookup failures.
//! - [`SpawnError`]: the launcher refused to create a worker.
//! - [`StartError`]: `start()` called on a controller that already left `Idle`.
//! - [`TaskError`]: errors raised by individual task executions inside a worker.
//!
//! Error enums provide `as_label()` returning a short stable snake_case string
//! for use in logs and metrics.

use thiserror::Error;

use crate::pool::PoolState;

/// Errors produced by [`PoolConfig`](crate::PoolConfig) validation.
///
/// The controller never raises to its caller at runtime; a malformed
/// configuration at construction time is the one exception.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `max_workers` must be at least 1.
    #[error("max_workers must be >= 1")]
    ZeroWorkers,

    /// The task list must contain at least one task name.
    #[error("task list is empty")]
    EmptyTaskList,

    /// A bounded run must allow at least one launch.
    #[error("bounded budget must be >= 1")]
    ZeroBudget,
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::ZeroWorkers => "config_zero_workers",
            ConfigError::EmptyTaskList => "config_empty_task_list",
            ConfigError::ZeroBudget => "config_zero_budget",
        }
    }
}

/// Errors produced by the [`SlotAllocator`](crate::SlotAllocator).
///
/// Both variants are programming errors: the controller's launch-eligibility
/// check makes `Exhausted` unreachable in practice, and `InvalidRelease`
/// means a number was returned twice or was never handed out. The controller
/// treats either as fatal and shuts the pool down.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotError {
    /// No identity number is currently free.
    #[error("no free worker slot")]
    Exhausted,

    /// The number is out of range or already in the free set.
    #[error("invalid release of slot {number}")]
    InvalidRelease {
        /// The offending identity number.
        number: u32,
    },
}

impl SlotError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            SlotError::Exhausted => "slot_exhausted",
            SlotError::InvalidRelease { .. } => "slot_invalid_release",
        }
    }
}

/// Errors produced by [`TaskRegistry`](crate::TaskRegistry) lookups.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// No task is registered under the given name.
    #[error("unknown task '{name}'")]
    UnknownTask {
        /// The name that failed to resolve.
        name: String,
    },
}

/// The launcher failed to create a worker.
///
/// A failed spawn is logged as `ERROR` and the acquired slot is released, but
/// the launch still consumes one unit of a bounded budget: a pool that can
/// never spawn must drain its budget and reach `Stopped` instead of retrying
/// forever.
#[derive(Error, Debug, Clone)]
#[error("worker spawn failed: {reason}")]
pub struct SpawnError {
    /// Human-readable cause.
    pub reason: String,
}

impl SpawnError {
    /// Creates a spawn error from any displayable cause.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// `start()` was called on a controller that already left `Idle`.
///
/// A controller instance drives exactly one run; a new run requires a new
/// controller.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("controller already started (state: {state})")]
pub struct StartError {
    /// The state the controller was in when `start()` was rejected.
    pub state: PoolState,
}

/// Errors produced by task execution inside a worker.
///
/// A failed task is logged with its name and worker number and the worker
/// proceeds to the next task in its list; failures never crash the worker.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum TaskError {
    /// Task execution failed.
    #[error("execution failed: {error}")]
    Failed {
        /// The underlying error message.
        error: String,
    },

    /// Task observed cancellation and exited early.
    #[error("cancelled")]
    Canceled,
}

impl TaskError {
    /// Creates a failure from any displayable cause.
    pub fn failed(error: impl Into<String>) -> Self {
        TaskError::Failed {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Failed { .. } => "task_failed",
            TaskError::Canceled => "task_canceled",
        }
    }
}
