//! # Pool controller: the process-pool state machine and its control loop.
//!
//! The controller decides how many workers may run concurrently, assigns and
//! recycles identity numbers through the [`SlotAllocator`], enforces the
//! launch budget, reacts to pause/resume/stop without losing state, reaps
//! finished workers, and signals completion. It never executes task logic
//! itself.
//!
//! ## Control loop
//! One dedicated tokio task polls at a fixed tick:
//! ```text
//! loop {
//!   ├─► paused?   → wait for resume or stop (no busy spin, no reap, no launch)
//!   ├─► reap      → join finished workers, release their numbers
//!   ├─► launch    → while eligible: acquire slot, charge budget, spawn
//!   ├─► complete? → bounded budget drained and zero workers → Stopped
//!   └─► sleep tick (woken early by stop)
//! }
//! ```
//! Reaping precedes launching within a tick so a just-freed number can be
//! reused in the same tick. On stop or on an error escaping the loop body the
//! controller force-terminates every remaining worker (cancel → grace-bounded
//! join → abort) before reaching `Stopped`; no worker is ever orphaned.
//!
//! ## Shared state
//! The slot allocator and the live worker set are owned by the loop alone.
//! The control surface ([`PoolController`]) talks to the loop only through a
//! cancellation token, a pause flag with a [`Notify`], and a `watch` channel
//! carrying the current [`PoolState`].

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex};

use tokio::sync::{broadcast, watch, Notify};
use tokio::task::JoinHandle;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::config::PoolConfig;
use crate::error::{ConfigError, SlotError, StartError};
use crate::events::{Bus, Event, EventKind};
use crate::pool::launch::{Launch, TokioLauncher, WorkerContext};
use crate::pool::state::PoolState;
use crate::slots::SlotAllocator;
use crate::subscribers::{Subscribe, SubscriberSet};
use crate::tasks::TaskRegistry;

/// Builder for constructing a [`PoolController`].
pub struct PoolBuilder {
    cfg: PoolConfig,
    registry: Arc<TaskRegistry>,
    launcher: Arc<dyn Launch>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl PoolBuilder {
    /// Creates a builder with the default launcher and no subscribers.
    pub fn new(cfg: PoolConfig, registry: Arc<TaskRegistry>) -> Self {
        Self {
            cfg,
            registry,
            launcher: Arc::new(TokioLauncher),
            subscribers: Vec::new(),
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive every bus event through dedicated workers with
    /// bounded queues; a slow subscriber drops events rather than slowing
    /// the pool down.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Replaces the worker launcher (worker-isolation seam).
    pub fn with_launcher(mut self, launcher: Arc<dyn Launch>) -> Self {
        self.launcher = launcher;
        self
    }

    /// Validates the config and builds the controller.
    ///
    /// Must run inside a tokio runtime when subscribers are attached (their
    /// queue workers are spawned here).
    pub fn build(self) -> Result<PoolController, ConfigError> {
        self.cfg.validate()?;

        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let fanout = if self.subscribers.is_empty() {
            None
        } else {
            Some(spawn_fanout(
                bus.subscribe(),
                SubscriberSet::new(self.subscribers),
            ))
        };

        let (state_tx, state_rx) = watch::channel(PoolState::Idle);
        let shared = Arc::new(Shared {
            state_tx,
            paused: AtomicBool::new(false),
            resume: Notify::new(),
            stop: CancellationToken::new(),
            launches: AtomicU64::new(0),
            workers: AtomicUsize::new(0),
        });

        Ok(PoolController {
            cfg: self.cfg,
            registry: self.registry,
            launcher: self.launcher,
            bus,
            shared,
            state_rx,
            fanout: Mutex::new(fanout),
        })
    }
}

/// Bridge between the bus and the subscriber set.
///
/// The control loop cancels `flush` on its terminal path and awaits `done`,
/// which drains what the ring still holds and shuts the set down, so no
/// subscriber misses the end of the stream.
struct Fanout {
    flush: CancellationToken,
    done: JoinHandle<()>,
}

/// Spawns the forwarding task that owns the subscriber set.
fn spawn_fanout(mut rx: broadcast::Receiver<Event>, set: SubscriberSet) -> Fanout {
    let flush = CancellationToken::new();
    let stop = flush.clone();
    let done = tokio::spawn(async move {
        loop {
            tokio::select! {
                res = rx.recv() => match res {
                    Ok(ev) => set.emit(&ev),
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                _ = stop.cancelled() => break,
            }
        }
        // Hand over whatever the ring still holds, then wait for every
        // subscriber queue to empty.
        loop {
            match rx.try_recv() {
                Ok(ev) => set.emit(&ev),
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => break,
            }
        }
        set.shutdown().await;
    });
    Fanout { flush, done }
}

/// State shared between the control surface and the control loop.
struct Shared {
    state_tx: watch::Sender<PoolState>,
    paused: AtomicBool,
    resume: Notify,
    stop: CancellationToken,
    launches: AtomicU64,
    workers: AtomicUsize,
}

impl Shared {
    /// Moves to `next` unless the controller is already terminal; publishes
    /// a `StateChanged` event when something actually changed.
    fn set_state(&self, bus: &Bus, next: PoolState) {
        let changed = self.state_tx.send_if_modified(|cur| {
            if *cur == next || cur.is_terminal() {
                false
            } else {
                *cur = next;
                true
            }
        });
        if changed {
            bus.publish(Event::new(EventKind::StateChanged).with_state(next));
        }
    }

    /// Final transition to `Stopped` with no event: the loop publishes the
    /// terminal events and drains the subscriber queues before flipping the
    /// watch, so observers of `Stopped` see a fully delivered stream.
    fn set_terminal(&self) {
        self.state_tx.send_if_modified(|s| {
            if s.is_terminal() {
                false
            } else {
                *s = PoolState::Stopped;
                true
            }
        });
    }
}

/// The process-pool execution controller.
///
/// Construct through [`PoolBuilder`], then `start()` to begin the run. One
/// controller drives exactly one run and is discarded once `Stopped`; a new
/// run requires a new controller.
///
/// ## Example
/// ```no_run
/// use std::sync::Arc;
/// use tokio_util::sync::CancellationToken;
/// use taskpool::{PoolBuilder, PoolConfig, RunMode, TaskFn, TaskRegistry, TaskError};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut registry = TaskRegistry::new();
///     registry.register("hello", || {
///         TaskFn::arc(|worker: u32, _cancel: CancellationToken| async move {
///             println!("worker {worker}: hello");
///             Ok::<_, TaskError>(())
///         })
///     });
///
///     let cfg = PoolConfig::new(
///         2,
///         RunMode::Bounded { budget: 5 },
///         vec!["hello".into()],
///     );
///     let pool = PoolBuilder::new(cfg, Arc::new(registry)).build()?;
///     pool.start()?;
///     pool.wait_stopped().await;
///     Ok(())
/// }
/// ```
pub struct PoolController {
    cfg: PoolConfig,
    registry: Arc<TaskRegistry>,
    launcher: Arc<dyn Launch>,
    bus: Bus,
    shared: Arc<Shared>,
    state_rx: watch::Receiver<PoolState>,
    fanout: Mutex<Option<Fanout>>,
}

impl PoolController {
    /// Shorthand for [`PoolBuilder::new`].
    pub fn builder(cfg: PoolConfig, registry: Arc<TaskRegistry>) -> PoolBuilder {
        PoolBuilder::new(cfg, registry)
    }

    /// Starts the control loop: `Idle → Running`.
    ///
    /// Fails with [`StartError`] in any other state; a controller runs once.
    pub fn start(&self) -> Result<(), StartError> {
        let started = self
            .shared
            .state_tx
            .send_if_modified(|s| match *s {
                PoolState::Idle => {
                    *s = PoolState::Running;
                    true
                }
                _ => false,
            });
        if !started {
            return Err(StartError {
                state: *self.state_rx.borrow(),
            });
        }
        self.bus
            .publish(Event::new(EventKind::StateChanged).with_state(PoolState::Running));

        let control = ControlLoop {
            slots: SlotAllocator::new(self.cfg.max_workers as u32),
            workers: Vec::new(),
            launches: 0,
            tasks: self.cfg.tasks.clone().into(),
            cfg: self.cfg.clone(),
            registry: Arc::clone(&self.registry),
            launcher: Arc::clone(&self.launcher),
            bus: self.bus.clone(),
            shared: Arc::clone(&self.shared),
            fanout: self.fanout.lock().ok().and_then(|mut slot| slot.take()),
        };
        tokio::spawn(control.run());
        Ok(())
    }

    /// Suspends launching and reaping: `Running → Paused`.
    ///
    /// Already-launched workers are not touched; they keep running to
    /// completion. Idempotent, no-op outside `Running`.
    pub fn pause(&self) {
        let changed = self.shared.state_tx.send_if_modified(|s| match *s {
            PoolState::Running => {
                *s = PoolState::Paused;
                true
            }
            _ => false,
        });
        if changed {
            self.shared.paused.store(true, AtomicOrdering::Release);
            self.bus
                .publish(Event::new(EventKind::StateChanged).with_state(PoolState::Paused));
        }
    }

    /// Resumes a paused pool: `Paused → Running`. Idempotent, no-op
    /// otherwise.
    pub fn resume(&self) {
        let changed = self.shared.state_tx.send_if_modified(|s| match *s {
            PoolState::Paused => {
                *s = PoolState::Running;
                true
            }
            _ => false,
        });
        if changed {
            self.shared.paused.store(false, AtomicOrdering::Release);
            self.shared.resume.notify_one();
            self.bus
                .publish(Event::new(EventKind::StateChanged).with_state(PoolState::Running));
        }
    }

    /// Stops the pool for good and waits until every worker is gone.
    ///
    /// Never waits for natural completion: live workers are cancelled, given
    /// the configured grace, then abandoned. Unconditionally safe to call
    /// repeatedly and from any state, including `Idle`.
    pub async fn stop(&self) {
        // Idle shortcut: no loop to drain, go terminal directly.
        let from_idle = self.shared.state_tx.send_if_modified(|s| match *s {
            PoolState::Idle => {
                *s = PoolState::Stopped;
                true
            }
            _ => false,
        });
        self.shared.stop.cancel();
        if from_idle {
            self.bus
                .publish(Event::new(EventKind::StateChanged).with_state(PoolState::Stopped));
            return;
        }

        // Wake a paused loop so it can observe the stop promptly.
        self.shared.resume.notify_one();
        let mut rx = self.state_rx.clone();
        let _ = rx.wait_for(|s| s.is_terminal()).await;
    }

    /// Current controller state.
    pub fn state(&self) -> PoolState {
        *self.state_rx.borrow()
    }

    /// A watch receiver following state transitions.
    pub fn watch_state(&self) -> watch::Receiver<PoolState> {
        self.state_rx.clone()
    }

    /// True while the control loop is alive (running, paused, or draining).
    pub fn is_running(&self) -> bool {
        self.state().is_active()
    }

    /// Total worker launches started so far (monotonic, includes failed
    /// spawns).
    pub fn launches_started(&self) -> u64 {
        self.shared.launches.load(AtomicOrdering::Acquire)
    }

    /// Number of live workers as of the last loop tick.
    pub fn workers_running(&self) -> usize {
        self.shared.workers.load(AtomicOrdering::Acquire)
    }

    /// Subscribes to the raw event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Waits until the controller reaches `Stopped`.
    pub async fn wait_stopped(&self) {
        let mut rx = self.state_rx.clone();
        let _ = rx.wait_for(|s| s.is_terminal()).await;
    }
}

impl Drop for PoolController {
    fn drop(&mut self) {
        // The loop drains and terminates its workers once the token drops;
        // workers must never outlive the controller.
        self.shared.stop.cancel();
    }
}

/// A live worker owned by the control loop.
struct WorkerHandle {
    number: u32,
    join: JoinHandle<()>,
    cancel: CancellationToken,
}

/// How the control loop ended.
enum Exit {
    /// Bounded budget drained and the last worker finished.
    Completed,
    /// `stop()` requested (or the controller is being dropped).
    Stopped,
}

/// The control loop proper; owns the slot allocator and the live worker set.
struct ControlLoop {
    cfg: PoolConfig,
    tasks: Arc<[String]>,
    registry: Arc<TaskRegistry>,
    launcher: Arc<dyn Launch>,
    bus: Bus,
    shared: Arc<Shared>,
    slots: SlotAllocator,
    workers: Vec<WorkerHandle>,
    launches: u64,
    fanout: Option<Fanout>,
}

impl ControlLoop {
    async fn run(mut self) {
        let exit = self.drive().await;

        match exit {
            Ok(Exit::Completed) => {}
            Ok(Exit::Stopped) => {
                self.shared.set_state(&self.bus, PoolState::Draining);
                self.terminate_all().await;
            }
            Err(e) => {
                // Loop faults never escape silently: report, then force a
                // full shutdown so no worker is left behind.
                self.bus
                    .publish(Event::new(EventKind::ControllerError).with_reason(e.to_string()));
                self.shared.set_state(&self.bus, PoolState::Draining);
                self.terminate_all().await;
            }
        }

        // Publish the terminal events first, drain the subscriber queues,
        // then flip the watch: anyone who observes `Stopped` is guaranteed
        // the subscribers processed the complete stream.
        self.bus
            .publish(Event::new(EventKind::StateChanged).with_state(PoolState::Stopped));
        self.bus.publish(Event::new(EventKind::RunCompleted));
        if let Some(fanout) = self.fanout.take() {
            fanout.flush.cancel();
            let _ = fanout.done.await;
        }
        self.shared.set_terminal();
    }

    async fn drive(&mut self) -> Result<Exit, SlotError> {
        loop {
            if self.shared.stop.is_cancelled() {
                return Ok(Exit::Stopped);
            }

            // Paused: no launching, no reaping; wait on the notify rather
            // than spinning. A stale resume permit only costs one re-check.
            while self.shared.paused.load(AtomicOrdering::Acquire) {
                tokio::select! {
                    _ = self.shared.resume.notified() => {}
                    _ = self.shared.stop.cancelled() => return Ok(Exit::Stopped),
                }
            }

            self.reap().await?;

            while self.may_launch() {
                if !self.launch_one()? {
                    break;
                }
            }

            if self.cfg.mode.is_exhausted(self.launches) && self.workers.is_empty() {
                return Ok(Exit::Completed);
            }

            tokio::select! {
                _ = time::sleep(self.cfg.tick) => {}
                _ = self.shared.stop.cancelled() => return Ok(Exit::Stopped),
            }
        }
    }

    /// Joins every worker whose task has exited, frees its number, and
    /// reports it. Runs before launching so a just-freed number is reusable
    /// within the same tick.
    async fn reap(&mut self) -> Result<(), SlotError> {
        let mut i = 0;
        while i < self.workers.len() {
            if !self.workers[i].join.is_finished() {
                i += 1;
                continue;
            }
            let mut handle = self.workers.swap_remove(i);
            if let Err(e) = (&mut handle.join).await {
                if e.is_panic() {
                    self.bus.publish(
                        Event::new(EventKind::ControllerError)
                            .with_worker(handle.number)
                            .with_reason("worker task panicked"),
                    );
                }
            }
            self.slots.release(handle.number)?;
            self.bus
                .publish(Event::new(EventKind::WorkerFinished).with_worker(handle.number));
        }
        self.shared
            .workers
            .store(self.workers.len(), AtomicOrdering::Release);
        Ok(())
    }

    /// Launch eligibility: all conditions from one tick's snapshot.
    fn may_launch(&self) -> bool {
        self.workers.len() < self.cfg.max_workers
            && self.slots.has_free()
            && self.cfg.mode.allows_launch(self.launches)
            && !self.shared.paused.load(AtomicOrdering::Acquire)
            && !self.shared.stop.is_cancelled()
    }

    /// Acquires a slot, charges the budget, and spawns one worker. Returns
    /// `false` if the launcher refused the spawn.
    ///
    /// A refused spawn releases the slot but keeps the budget charge, so a
    /// bounded run always makes forward progress. The caller stops launching
    /// for the rest of the tick on refusal; retries are paced by the tick
    /// rather than spinning inside one loop iteration.
    fn launch_one(&mut self) -> Result<bool, SlotError> {
        let number = self.slots.acquire()?;
        self.launches += 1;
        self.shared
            .launches
            .store(self.launches, AtomicOrdering::Release);

        let cancel = self.shared.stop.child_token();
        let ctx = WorkerContext {
            number,
            tasks: Arc::clone(&self.tasks),
            registry: Arc::clone(&self.registry),
            bus: self.bus.clone(),
            cancel: cancel.clone(),
        };

        match self.launcher.launch(ctx) {
            Ok(join) => {
                self.workers.push(WorkerHandle {
                    number,
                    join,
                    cancel,
                });
                self.shared
                    .workers
                    .store(self.workers.len(), AtomicOrdering::Release);
                self.bus
                    .publish(Event::new(EventKind::WorkerLaunched).with_worker(number));
                Ok(true)
            }
            Err(e) => {
                self.slots.release(number)?;
                self.bus.publish(
                    Event::new(EventKind::SpawnFailed)
                        .with_worker(number)
                        .with_reason(e.reason),
                );
                Ok(false)
            }
        }
    }

    /// Forcibly terminates every remaining worker: cancel, wait up to the
    /// configured grace, abandon what is still stuck. Always ends with zero
    /// live workers.
    async fn terminate_all(&mut self) {
        let workers = std::mem::take(&mut self.workers);
        for handle in &workers {
            handle.cancel.cancel();
        }

        for mut handle in workers {
            match time::timeout(self.cfg.terminate_grace, &mut handle.join).await {
                Ok(join_res) => {
                    if let Err(e) = join_res {
                        if e.is_panic() {
                            self.bus.publish(
                                Event::new(EventKind::ControllerError)
                                    .with_worker(handle.number)
                                    .with_reason("worker task panicked"),
                            );
                        }
                    }
                    self.bus
                        .publish(Event::new(EventKind::WorkerTerminated).with_worker(handle.number));
                }
                Err(_elapsed) => {
                    handle.join.abort();
                    self.bus
                        .publish(Event::new(EventKind::GraceExceeded).with_worker(handle.number));
                }
            }
            if let Err(e) = self.slots.release(handle.number) {
                self.bus.publish(
                    Event::new(EventKind::ControllerError)
                        .with_worker(handle.number)
                        .with_reason(e.to_string()),
                );
            }
        }
        self.shared.workers.store(0, AtomicOrdering::Release);
    }
}
