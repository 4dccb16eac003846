//! # taskpool
//!
//! **taskpool** is a worker-pool execution controller for Rust.
//!
//! An application hands it an ordered list of named tasks, a concurrency
//! limit, and a launch budget; the pool launches isolated workers that each
//! replay the whole task list, recycles small human-readable worker numbers,
//! enforces the budget, supports pause / resume / hard stop, and guarantees
//! that no worker ever outlives the controller.
//!
//! ## Architecture
//! ```text
//!   PoolConfig ─┐
//!   TaskRegistry┼──► PoolBuilder ──► PoolController
//!   Subscribers ┘                         │ start()
//!                                         ▼
//! ┌───────────────────────────────────────────────────────────┐
//! │  ControlLoop (one tokio task, fixed tick)                 │
//! │  - SlotAllocator (identity numbers 1..=N, smallest-first) │
//! │  - reap finished workers, release their numbers           │
//! │  - launch while eligible (cap, free slot, budget, state)  │
//! │  - bounded completion → Stopped                           │
//! └──────┬──────────────────┬──────────────────┬──────────────┘
//!        ▼                  ▼                  ▼
//!   ┌──────────┐      ┌──────────┐       ┌──────────┐
//!   │ worker 1 │      │ worker 2 │  ...  │ worker N │   (Launch seam)
//!   │ (tasks   │      │ (tasks   │       │ (tasks   │
//!   │  1..M)   │      │  1..M)   │       │  1..M)   │
//!   └────┬─────┘      └────┬─────┘       └────┬─────┘
//!        │  publish        │  publish         │  publish
//!        ▼                 ▼                  ▼
//! ┌───────────────────────────────────────────────────────────┐
//! │                 Bus (broadcast channel)                   │
//! └────────────────────────────┬──────────────────────────────┘
//!                              ▼
//!                        SubscriberSet
//!                    (per-sub queues, fan-out)
//!                     ┌────────┼────────┐
//!                     ▼        ▼        ▼
//!                 LogWriter  GUI     test harness
//! ```
//!
//! ## State machine
//! ```text
//! Idle ──start()──► Running ◄──resume()── Paused
//!                     │  └───pause()────────┘
//!                     │
//!        budget drained & no workers ──► Stopped
//!                     │                     ▲
//!                  stop() ──► Draining ─────┘
//! ```
//!
//! ## Features
//! | Area            | Description                                             | Key types / traits                  |
//! |-----------------|---------------------------------------------------------|-------------------------------------|
//! | **Control**     | Launch, pause, resume, hard stop, completion detection. | [`PoolController`], [`PoolBuilder`] |
//! | **Numbering**   | Smallest-first reusable worker identity numbers.        | [`SlotAllocator`]                   |
//! | **Tasks**       | Name → factory registry and the cancelable task trait.  | [`TaskRegistry`], [`Runnable`], [`TaskFn`] |
//! | **Isolation**   | Pluggable worker launcher seam.                         | [`Launch`], [`TokioLauncher`]       |
//! | **Observation** | Ordered event stream plus subscriber fan-out.           | [`Event`], [`Bus`], [`Subscribe`]   |
//! | **Log shape**   | Frozen `{timestamp, level, message}` wire record.       | [`LogRecord`], [`LogLevel`]         |
//! | **Errors**      | Typed errors for config, slots, registry, spawn, tasks. | [`ConfigError`], [`SlotError`], ... |
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use taskpool::{
//!     LogWriter, PoolBuilder, PoolConfig, RunMode, Subscribe, TaskError, TaskFn, TaskRegistry,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut registry = TaskRegistry::new();
//!     registry.register("open-browser", || {
//!         TaskFn::arc(|worker: u32, cancel: CancellationToken| async move {
//!             if cancel.is_cancelled() {
//!                 return Err(TaskError::Canceled);
//!             }
//!             println!("worker {worker}: browsing");
//!             Ok(())
//!         })
//!     });
//!
//!     let cfg = PoolConfig::new(
//!         4,
//!         RunMode::Bounded { budget: 10 },
//!         vec!["open-browser".into()],
//!     );
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter)];
//!     let pool = PoolBuilder::new(cfg, Arc::new(registry))
//!         .with_subscribers(subs)
//!         .build()?;
//!
//!     pool.start()?;
//!     pool.wait_stopped().await;
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod events;
mod pool;
mod slots;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use config::{PoolConfig, RunMode};
pub use error::{ConfigError, RegistryError, SlotError, SpawnError, StartError, TaskError};
pub use events::{Bus, Event, EventKind, LogLevel, LogRecord};
pub use pool::{Launch, PoolBuilder, PoolController, PoolState, TokioLauncher, WorkerContext};
pub use slots::SlotAllocator;
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
pub use tasks::{Runnable, TaskFn, TaskRef, TaskRegistry};
