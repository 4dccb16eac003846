//! # Pool configuration.
//!
//! Provides [`PoolConfig`], the immutable description of one pool run, and
//! [`RunMode`], the bounded/unbounded launch budget.
//!
//! A config is validated once when the controller is built and never mutated
//! afterwards; a new run requires a new controller (and may reuse the config).

use std::time::Duration;

use crate::error::ConfigError;

/// Whether the pool stops itself after a fixed number of launches or runs
/// until explicitly stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunMode {
    /// Launch at most `budget` workers over the pool's lifetime, then stop
    /// once the last one finishes.
    ///
    /// The budget counts worker *launches*, not concurrent workers, and a
    /// failed spawn still consumes one unit.
    Bounded {
        /// Total launches allowed (>= 1).
        budget: u64,
    },

    /// Keep launching until an explicit `stop()`; the pool never self-stops.
    Unbounded,
}

impl RunMode {
    /// True if the budget still permits another launch.
    #[inline]
    pub fn allows_launch(&self, launches_started: u64) -> bool {
        match *self {
            RunMode::Bounded { budget } => launches_started < budget,
            RunMode::Unbounded => true,
        }
    }

    /// True if the budget is exhausted (always false for unbounded runs).
    #[inline]
    pub fn is_exhausted(&self, launches_started: u64) -> bool {
        match *self {
            RunMode::Bounded { budget } => launches_started >= budget,
            RunMode::Unbounded => false,
        }
    }
}

/// Configuration for one pool run.
///
/// ## Field semantics
/// - `max_workers`: concurrency cap and the range of worker identity numbers
///   (`1..=max_workers`)
/// - `mode`: bounded or unbounded launch budget
/// - `tasks`: ordered task names; every worker replays the **entire** list
///   from the first task (duplicates allowed)
/// - `tick`: control loop poll interval
/// - `terminate_grace`: how long a forced stop waits for a worker before
///   abandoning it
/// - `bus_capacity`: event bus ring buffer size (min 1, clamped by the bus)
#[derive(Clone, Debug)]
pub struct PoolConfig {
    /// Maximum number of workers running concurrently (>= 1).
    pub max_workers: usize,

    /// Launch budget mode.
    pub mode: RunMode,

    /// Ordered task names executed by every worker (non-empty).
    pub tasks: Vec<String>,

    /// Control loop poll interval.
    pub tick: Duration,

    /// Bounded wait for a worker to terminate during a forced stop.
    ///
    /// A worker that ignores cancellation past this grace is aborted and
    /// logged; the controller still proceeds to `Stopped` rather than
    /// deadlocking the caller.
    pub terminate_grace: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    pub bus_capacity: usize,
}

impl PoolConfig {
    /// Creates a config with default tick (100 ms), terminate grace (5 s),
    /// and bus capacity (1024).
    pub fn new(max_workers: usize, mode: RunMode, tasks: Vec<String>) -> Self {
        Self {
            max_workers,
            mode,
            tasks,
            tick: Duration::from_millis(100),
            terminate_grace: Duration::from_secs(5),
            bus_capacity: 1024,
        }
    }

    /// Returns a config with an updated poll interval.
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    /// Returns a config with an updated termination grace.
    pub fn with_terminate_grace(mut self, grace: Duration) -> Self {
        self.terminate_grace = grace;
        self
    }

    /// Returns a config with an updated bus capacity.
    pub fn with_bus_capacity(mut self, capacity: usize) -> Self {
        self.bus_capacity = capacity;
        self
    }

    /// Validates the config.
    ///
    /// Rejects a zero worker count, an empty task list, and a zero bounded
    /// budget. Called by the builder before a controller is constructed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_workers == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        if self.tasks.is_empty() {
            return Err(ConfigError::EmptyTaskList);
        }
        if let RunMode::Bounded { budget } = self.mode {
            if budget == 0 {
                return Err(ConfigError::ZeroBudget);
            }
        }
        Ok(())
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tasks() -> Vec<String> {
        vec!["a".into(), "b".into()]
    }

    #[test]
    fn valid_config_passes() {
        let cfg = PoolConfig::new(2, RunMode::Bounded { budget: 5 }, tasks());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_workers_rejected() {
        let cfg = PoolConfig::new(0, RunMode::Unbounded, tasks());
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroWorkers));
    }

    #[test]
    fn empty_task_list_rejected() {
        let cfg = PoolConfig::new(1, RunMode::Unbounded, Vec::new());
        assert_eq!(cfg.validate(), Err(ConfigError::EmptyTaskList));
    }

    #[test]
    fn zero_budget_rejected() {
        let cfg = PoolConfig::new(1, RunMode::Bounded { budget: 0 }, tasks());
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroBudget));
    }

    #[test]
    fn bounded_budget_gates_launches() {
        let mode = RunMode::Bounded { budget: 3 };
        assert!(mode.allows_launch(0));
        assert!(mode.allows_launch(2));
        assert!(!mode.allows_launch(3));
        assert!(mode.is_exhausted(3));
        assert!(!mode.is_exhausted(2));
    }

    #[test]
    fn unbounded_never_exhausts() {
        assert!(RunMode::Unbounded.allows_launch(u64::MAX));
        assert!(!RunMode::Unbounded.is_exhausted(u64::MAX));
    }
}
