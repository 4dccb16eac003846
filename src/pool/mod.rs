//! # Pool runtime: the execution controller and its workers.
//!
//! Internal modules:
//! - [`state`]: controller state machine states;
//! - [`launch`]: the worker-isolation seam ([`Launch`]) and default launcher;
//! - [`worker`]: the worker body replaying the full task list;
//! - [`controller`]: the control loop (reap, launch, budget, pause, stop).
//!
//! The only entry points are [`PoolBuilder`] and the [`PoolController`] it
//! produces.

mod controller;
mod launch;
mod state;
mod worker;

pub use controller::{PoolBuilder, PoolController};
pub use launch::{Launch, TokioLauncher, WorkerContext};
pub use state::PoolState;
