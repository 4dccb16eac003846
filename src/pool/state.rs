//! # Controller state machine states.
//!
//! `Idle → Running ⇄ Paused → Draining → Stopped`
//!
//! `Idle` is the state before `start()`; `Stopped` is terminal. `Draining`
//! is the short window during a forced stop while live workers are being
//! terminated. Natural completion of a bounded run goes straight from
//! `Running` to `Stopped`.

use std::fmt;

/// State of a [`PoolController`](crate::PoolController).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolState {
    /// Constructed, not yet started.
    Idle,
    /// Control loop active: reaping, launching, watching the budget.
    Running,
    /// Launching and reaping suspended; live workers keep running.
    Paused,
    /// Stop requested; live workers are being forcibly terminated.
    Draining,
    /// Terminal: loop exited, zero live workers.
    Stopped,
}

impl PoolState {
    /// True if the controller has finished for good.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, PoolState::Stopped)
    }

    /// True while the control loop is alive (running, paused, or draining).
    #[inline]
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            PoolState::Running | PoolState::Paused | PoolState::Draining
        )
    }
}

impl fmt::Display for PoolState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PoolState::Idle => "idle",
            PoolState::Running => "running",
            PoolState::Paused => "paused",
            PoolState::Draining => "draining",
            PoolState::Stopped => "stopped",
        };
        f.write_str(s)
    }
}
