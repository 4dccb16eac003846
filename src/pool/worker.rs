//! # Worker body: replay the full task list once.
//!
//! For each name in order: resolve through the registry, run to completion,
//! report start/finish/error tagged with the worker's identity number, then
//! move on. A task failure (or an unresolvable name) is logged per-task and
//! the worker proceeds to its next task; only cancellation cuts the list
//! short.
//!
//! Per-worker event order is strict: task N's terminal event always precedes
//! task N+1's start event.

use crate::error::TaskError;
use crate::events::{Event, EventKind};
use crate::pool::launch::WorkerContext;

/// Runs one worker to completion or cancellation.
pub(crate) async fn run_worker(ctx: WorkerContext) {
    ctx.bus
        .publish(Event::new(EventKind::WorkerStarted).with_worker(ctx.number));

    for name in ctx.tasks.iter() {
        if ctx.cancel.is_cancelled() {
            break;
        }

        ctx.bus.publish(
            Event::new(EventKind::TaskStarted)
                .with_worker(ctx.number)
                .with_task(name.as_str()),
        );

        let task = match ctx.registry.resolve(name) {
            Ok(task) => task,
            Err(e) => {
                publish_failed(&ctx, name, &e.to_string());
                continue;
            }
        };

        // Cancellation is cooperative: the task gets a child token and is
        // expected to exit promptly. Tasks that ignore it are abandoned by
        // the controller after the termination grace.
        let res = task.run(ctx.number, ctx.cancel.child_token()).await;

        match res {
            Ok(()) => {
                ctx.bus.publish(
                    Event::new(EventKind::TaskCompleted)
                        .with_worker(ctx.number)
                        .with_task(name.as_str()),
                );
            }
            // A task that observed cancellation exits the list quietly; the
            // controller reports the termination.
            Err(TaskError::Canceled) => break,
            Err(e) => publish_failed(&ctx, name, &e.to_string()),
        }
    }
}

fn publish_failed(ctx: &WorkerContext, task: &str, reason: &str) {
    ctx.bus.publish(
        Event::new(EventKind::TaskFailed)
            .with_worker(ctx.number)
            .with_task(task)
            .with_reason(reason),
    );
}
