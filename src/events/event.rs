//! # Runtime events emitted by the controller and its workers.
//!
//! [`EventKind`] classifies events across three categories:
//! - **Controller events**: state transitions, completion, internal errors
//! - **Worker lifecycle**: launch, finish, forced termination, spawn failure
//! - **Task progress**: per-task start/complete/fail inside a worker
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Events from one worker are strictly ordered (a task's
//! finish always precedes the next task's start); events from different
//! workers are unordered relative to each other.

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::SystemTime;

use crate::events::record::{LogLevel, LogRecord};
use crate::pool::PoolState;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Controller events ===
    /// The controller moved to a new state.
    ///
    /// Sets: `state`.
    StateChanged,

    /// The control loop exited and every worker is gone; terminal.
    ///
    /// Emitted on every exit path of the control loop, whether the run
    /// completed naturally (bounded budget drained) or was stopped.
    RunCompleted,

    /// An error inside the controller loop; always followed by a forced
    /// shutdown of all workers.
    ///
    /// Sets: `reason`, optionally `worker`.
    ControllerError,

    // === Worker lifecycle ===
    /// A new worker was launched and bound to an identity number.
    ///
    /// Sets: `worker`.
    WorkerLaunched,

    /// The worker began replaying its task list (emitted from inside the
    /// worker).
    ///
    /// Sets: `worker`.
    WorkerStarted,

    /// The worker exited on its own and was reaped; its number is free again.
    ///
    /// Sets: `worker`.
    WorkerFinished,

    /// The worker was forcibly terminated by `stop()` or a loop failure.
    ///
    /// Sets: `worker`.
    WorkerTerminated,

    /// The worker ignored termination past the configured grace and was
    /// abandoned.
    ///
    /// Sets: `worker`.
    GraceExceeded,

    /// The launcher failed to create a worker; the launch still consumed one
    /// unit of a bounded budget.
    ///
    /// Sets: `worker`, `reason`.
    SpawnFailed,

    // === Task progress ===
    /// A worker started one task from its list.
    ///
    /// Sets: `worker`, `task`.
    TaskStarted,

    /// A worker completed one task.
    ///
    /// Sets: `worker`, `task`.
    TaskCompleted,

    /// A task failed (or failed to resolve); the worker proceeds to its next
    /// task.
    ///
    /// Sets: `worker`, `task`, `reason`.
    TaskFailed,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Debug, Clone)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// New controller state, for [`EventKind::StateChanged`].
    pub state: Option<PoolState>,
    /// Worker identity number, if applicable.
    pub worker: Option<u32>,
    /// Task name, if applicable.
    pub task: Option<Arc<str>>,
    /// Human-readable reason (errors, spawn failures).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp and
    /// next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            state: None,
            worker: None,
            task: None,
            reason: None,
        }
    }

    /// Attaches a controller state.
    #[inline]
    pub fn with_state(mut self, state: PoolState) -> Self {
        self.state = Some(state);
        self
    }

    /// Attaches a worker identity number.
    #[inline]
    pub fn with_worker(mut self, number: u32) -> Self {
        self.worker = Some(number);
        self
    }

    /// Attaches a task name.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Log level this event is reported at.
    pub fn level(&self) -> LogLevel {
        match self.kind {
            EventKind::ControllerError
            | EventKind::SpawnFailed
            | EventKind::GraceExceeded
            | EventKind::TaskFailed => LogLevel::Error,
            EventKind::StateChanged => LogLevel::Debug,
            _ => LogLevel::Info,
        }
    }

    /// Human-readable message in the shape the log viewer expects.
    pub fn message(&self) -> String {
        let worker = self.worker.unwrap_or(0);
        let task = self.task.as_deref().unwrap_or("?");
        let reason = self.reason.as_deref().unwrap_or("unknown");
        match self.kind {
            EventKind::StateChanged => match self.state {
                Some(s) => format!("state changed: {s}"),
                None => "state changed".to_string(),
            },
            EventKind::RunCompleted => "run completed".to_string(),
            EventKind::ControllerError => match self.worker {
                Some(n) => format!("controller error (worker {n}): {reason}"),
                None => format!("controller error: {reason}"),
            },
            EventKind::WorkerLaunched => format!("worker {worker}: launched"),
            EventKind::WorkerStarted => format!("worker {worker}: started task list"),
            EventKind::WorkerFinished => format!("worker {worker}: finished"),
            EventKind::WorkerTerminated => format!("worker {worker}: terminated"),
            EventKind::GraceExceeded => {
                format!("worker {worker}: did not terminate within grace, abandoned")
            }
            EventKind::SpawnFailed => format!("worker {worker}: spawn failed: {reason}"),
            EventKind::TaskStarted => format!("worker {worker}: task '{task}' started"),
            EventKind::TaskCompleted => format!("worker {worker}: task '{task}' completed"),
            EventKind::TaskFailed => format!("worker {worker}: task '{task}' failed: {reason}"),
        }
    }

    /// Converts the event into the frozen log wire shape.
    pub fn to_record(&self) -> LogRecord {
        LogRecord::new(self.at, self.level(), self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_numbers_are_monotonic() {
        let a = Event::new(EventKind::WorkerLaunched);
        let b = Event::new(EventKind::WorkerFinished);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn failure_kinds_log_as_error() {
        let ev = Event::new(EventKind::TaskFailed)
            .with_worker(2)
            .with_task("demo")
            .with_reason("boom");
        assert_eq!(ev.level(), LogLevel::Error);
        assert_eq!(ev.message(), "worker 2: task 'demo' failed: boom");
    }

    #[test]
    fn state_changes_log_as_debug() {
        let ev = Event::new(EventKind::StateChanged).with_state(PoolState::Running);
        assert_eq!(ev.level(), LogLevel::Debug);
        assert_eq!(ev.message(), "state changed: running");
    }
}
