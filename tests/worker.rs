//! Worker behavior: full-list replay, per-worker event ordering,
//! skip-and-continue on task failure, and the log wire shape.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use taskpool::{
    Event, EventKind, LogLevel, PoolBuilder, PoolConfig, RunMode, TaskError, TaskFn, TaskRegistry,
};

const WAIT: Duration = Duration::from_secs(10);

fn noop_task() -> taskpool::TaskRef {
    TaskFn::arc(|_worker: u32, _cancel: CancellationToken| async { Ok::<(), TaskError>(()) })
}

fn cfg(tasks: Vec<&str>, mode: RunMode, max_workers: usize) -> PoolConfig {
    PoolConfig::new(
        max_workers,
        mode,
        tasks.into_iter().map(String::from).collect(),
    )
    .with_tick(Duration::from_millis(5))
}

fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut out = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(ev) => out.push(ev),
            Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }
    out
}

#[tokio::test]
async fn worker_replays_the_full_task_list_in_order() {
    let mut registry = TaskRegistry::new();
    registry.register_task("first", noop_task());
    registry.register_task("second", noop_task());
    registry.register_task("third", noop_task());

    let pool = PoolBuilder::new(
        cfg(
            vec!["first", "second", "third"],
            RunMode::Bounded { budget: 1 },
            1,
        ),
        Arc::new(registry),
    )
    .build()
    .unwrap();

    let mut rx = pool.subscribe();
    pool.start().unwrap();
    timeout(WAIT, pool.wait_stopped()).await.unwrap();

    let task_events: Vec<(EventKind, String)> = drain(&mut rx)
        .into_iter()
        .filter(|e| matches!(e.kind, EventKind::TaskStarted | EventKind::TaskCompleted))
        .map(|e| (e.kind, e.task.as_deref().unwrap().to_string()))
        .collect();

    // Task N's terminal event precedes task N+1's start event.
    assert_eq!(
        task_events,
        vec![
            (EventKind::TaskStarted, "first".into()),
            (EventKind::TaskCompleted, "first".into()),
            (EventKind::TaskStarted, "second".into()),
            (EventKind::TaskCompleted, "second".into()),
            (EventKind::TaskStarted, "third".into()),
            (EventKind::TaskCompleted, "third".into()),
        ]
    );
}

#[tokio::test]
async fn worker_started_bookend_precedes_task_events() {
    let mut registry = TaskRegistry::new();
    registry.register_task("only", noop_task());

    let pool = PoolBuilder::new(
        cfg(vec!["only"], RunMode::Bounded { budget: 1 }, 1),
        Arc::new(registry),
    )
    .build()
    .unwrap();

    let mut rx = pool.subscribe();
    pool.start().unwrap();
    timeout(WAIT, pool.wait_stopped()).await.unwrap();

    let events = drain(&mut rx);
    let started = events
        .iter()
        .position(|e| e.kind == EventKind::WorkerStarted)
        .expect("no WorkerStarted event");
    let first_task = events
        .iter()
        .position(|e| e.kind == EventKind::TaskStarted)
        .expect("no TaskStarted event");
    let finished = events
        .iter()
        .position(|e| e.kind == EventKind::WorkerFinished)
        .expect("no WorkerFinished event");
    assert!(started < first_task);
    assert!(first_task < finished);
}

#[tokio::test]
async fn unknown_task_is_skipped_not_fatal() {
    let real_ran = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&real_ran);

    let mut registry = TaskRegistry::new();
    registry.register("real", move || {
        let flag = Arc::clone(&flag);
        TaskFn::arc(move |_worker: u32, _cancel: CancellationToken| {
            let flag = Arc::clone(&flag);
            async move {
                flag.store(true, Ordering::SeqCst);
                Ok(())
            }
        })
    });

    let pool = PoolBuilder::new(
        cfg(vec!["ghost", "real"], RunMode::Bounded { budget: 1 }, 1),
        Arc::new(registry),
    )
    .build()
    .unwrap();

    let mut rx = pool.subscribe();
    pool.start().unwrap();
    timeout(WAIT, pool.wait_stopped()).await.unwrap();

    let events = drain(&mut rx);
    let failed: Vec<&Event> = events
        .iter()
        .filter(|e| e.kind == EventKind::TaskFailed)
        .collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].task.as_deref(), Some("ghost"));
    assert!(failed[0].reason.as_deref().unwrap().contains("unknown task"));

    // The worker carried on to the next task and finished normally.
    assert!(real_ran.load(Ordering::SeqCst));
    assert_eq!(
        events
            .iter()
            .filter(|e| e.kind == EventKind::WorkerFinished)
            .count(),
        1
    );
}

#[tokio::test]
async fn failing_task_does_not_abort_the_rest_of_the_list() {
    let after_ran = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&after_ran);

    let mut registry = TaskRegistry::new();
    registry.register("boom", || {
        TaskFn::arc(|_worker: u32, _cancel: CancellationToken| async {
            Err(TaskError::failed("connection refused"))
        })
    });
    registry.register("after", move || {
        let flag = Arc::clone(&flag);
        TaskFn::arc(move |_worker: u32, _cancel: CancellationToken| {
            let flag = Arc::clone(&flag);
            async move {
                flag.store(true, Ordering::SeqCst);
                Ok(())
            }
        })
    });

    let pool = PoolBuilder::new(
        cfg(vec!["boom", "after"], RunMode::Bounded { budget: 1 }, 1),
        Arc::new(registry),
    )
    .build()
    .unwrap();

    let mut rx = pool.subscribe();
    pool.start().unwrap();
    timeout(WAIT, pool.wait_stopped()).await.unwrap();

    let events = drain(&mut rx);
    let boom_failure = events
        .iter()
        .find(|e| e.kind == EventKind::TaskFailed)
        .expect("no TaskFailed event");
    assert_eq!(boom_failure.task.as_deref(), Some("boom"));
    assert_eq!(boom_failure.level(), LogLevel::Error);
    assert!(boom_failure
        .reason
        .as_deref()
        .unwrap()
        .contains("connection refused"));

    assert!(after_ran.load(Ordering::SeqCst));
    assert!(events
        .iter()
        .any(|e| e.kind == EventKind::TaskCompleted && e.task.as_deref() == Some("after")));
}

#[tokio::test]
async fn task_events_are_tagged_with_the_worker_number() {
    let mut registry = TaskRegistry::new();
    registry.register("work", || {
        TaskFn::arc(|_worker: u32, _cancel: CancellationToken| async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            Ok(())
        })
    });

    let pool = PoolBuilder::new(
        cfg(vec!["work"], RunMode::Bounded { budget: 4 }, 2),
        Arc::new(registry),
    )
    .build()
    .unwrap();

    let mut rx = pool.subscribe();
    pool.start().unwrap();
    timeout(WAIT, pool.wait_stopped()).await.unwrap();

    for ev in drain(&mut rx) {
        if matches!(
            ev.kind,
            EventKind::TaskStarted | EventKind::TaskCompleted | EventKind::WorkerStarted
        ) {
            let n = ev.worker.expect("event missing worker number");
            assert!((1..=2).contains(&n));
        }
    }
}

#[tokio::test]
async fn events_serialize_to_the_frozen_wire_shape() {
    let mut registry = TaskRegistry::new();
    registry.register("boom", || {
        TaskFn::arc(|_worker: u32, _cancel: CancellationToken| async {
            Err(TaskError::failed("boom"))
        })
    });

    let pool = PoolBuilder::new(
        cfg(vec!["boom"], RunMode::Bounded { budget: 1 }, 1),
        Arc::new(registry),
    )
    .build()
    .unwrap();

    let mut rx = pool.subscribe();
    pool.start().unwrap();
    timeout(WAIT, pool.wait_stopped()).await.unwrap();

    let events = drain(&mut rx);
    let failure = events
        .iter()
        .find(|e| e.kind == EventKind::TaskFailed)
        .expect("no TaskFailed event");

    let json = serde_json::to_value(failure.to_record()).unwrap();
    assert_eq!(json["level"], "ERROR");
    assert_eq!(json["message"], "worker 1: task 'boom' failed: execution failed: boom");
    // RFC 3339 timestamp string.
    let ts = json["timestamp"].as_str().unwrap();
    assert!(ts.contains('T'), "timestamp not ISO-8601: {ts}");

    // Sequence numbers are strictly increasing across the stream.
    for pair in events.windows(2) {
        assert!(pair[0].seq < pair[1].seq);
    }
}
