use futures::executor::block_on;
use futures::future::join_all;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use strata_pool::{DispatchError, Dispatcher, PoolOptions, TaskRegistry};

fn int_arg(args: &[Value]) -> Result<i64, String> {
    args.first()
        .and_then(Value::as_i64)
        .ok_or_else(|| "expected an integer argument".to_string())
}

fn registry() -> TaskRegistry {
    let mut registry = TaskRegistry::new();
    registry
        .register("double", |args| Ok(json!(int_arg(args)? * 2)))
        .register("fail", |_| Err("boom".to_string()))
        .register("panic", |_| panic!("worker exploded"))
        .register("sleep", |args| {
            let ms = int_arg(args)?;
            thread::sleep(Duration::from_millis(ms as u64));
            Ok(json!(ms))
        });
    registry
}

fn start(workers: usize) -> Dispatcher {
    Dispatcher::new(registry(), &PoolOptions::with_workers(workers)).unwrap()
}

#[test]
fn pool_of_two_runs_at_most_two_tasks_at_once() {
    let active = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let mut registry = TaskRegistry::new();
    {
        let (active, peak) = (Arc::clone(&active), Arc::clone(&peak));
        registry.register("square", move |args| {
            let n = int_arg(args)?;
            let now = active.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(30));
            active.fetch_sub(1, Ordering::SeqCst);
            Ok(json!(n * n))
        });
    }
    let dispatcher = Dispatcher::new(registry, &PoolOptions::with_workers(2)).unwrap();

    let handles: Vec<_> = (0..5)
        .map(|i| dispatcher.submit("square", vec![json!(i)]))
        .collect();
    let results: Vec<Value> = block_on(join_all(handles))
        .into_iter()
        .map(Result::unwrap)
        .collect();

    assert_eq!(
        results,
        vec![json!(0), json!(1), json!(4), json!(9), json!(16)]
    );
    assert!(peak.load(Ordering::SeqCst) <= 2);
    assert!(peak.load(Ordering::SeqCst) >= 1);
}

#[test]
fn task_ids_increase_monotonically() {
    let dispatcher = start(1);
    let a = dispatcher.submit("double", vec![json!(1)]);
    let b = dispatcher.submit("double", vec![json!(2)]);
    assert!(b.id() > a.id());
    assert_eq!(b.wait().unwrap(), json!(4));
    assert_eq!(a.wait().unwrap(), json!(2));
}

#[test]
fn task_errors_are_delivered_to_the_caller() {
    let dispatcher = start(1);
    match dispatcher.submit("fail", vec![]).wait() {
        Err(DispatchError::Task { name, message }) => {
            assert_eq!(name, "fail");
            assert_eq!(message, "boom");
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(matches!(
        dispatcher.submit("double", vec![json!("x")]).wait(),
        Err(DispatchError::Task { .. })
    ));
}

#[test]
fn panicking_task_does_not_take_the_worker_down() {
    let dispatcher = start(1);
    match dispatcher.submit("panic", vec![]).wait() {
        Err(DispatchError::WorkerPanicked { message, .. }) => {
            assert!(message.contains("worker exploded"))
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(
        dispatcher.submit("double", vec![json!(21)]).wait().unwrap(),
        json!(42)
    );
}

#[test]
fn unknown_task_resolves_immediately() {
    let dispatcher = start(1);
    assert!(matches!(
        dispatcher.submit("missing", vec![]).wait(),
        Err(DispatchError::UnknownTask { name }) if name == "missing"
    ));
}

#[test]
fn slow_task_times_out_and_frees_its_worker_later() {
    let dispatcher = start(1);
    let slow = dispatcher.submit_with_timeout("sleep", vec![json!(300)], Duration::from_millis(20));
    let id = slow.id();
    assert!(matches!(
        slow.wait(),
        Err(DispatchError::TimedOut { id: timed_out }) if timed_out == id
    ));
    assert_eq!(
        dispatcher.submit("double", vec![json!(5)]).wait().unwrap(),
        json!(10)
    );
}

#[test]
fn default_timeout_applies_to_plain_submissions() {
    let options = PoolOptions {
        workers: 1,
        default_timeout_ms: Some(10),
        ..Default::default()
    };
    let dispatcher = Dispatcher::new(registry(), &options).unwrap();
    assert!(matches!(
        dispatcher.submit("sleep", vec![json!(200)]).wait(),
        Err(DispatchError::TimedOut { .. })
    ));
}

#[test]
fn queued_task_can_be_cancelled() {
    let dispatcher = start(1);
    let blocker = dispatcher.submit("sleep", vec![json!(100)]);
    let queued = dispatcher.submit("double", vec![json!(1)]);
    dispatcher.cancel(queued.id());

    assert!(matches!(
        queued.wait(),
        Err(DispatchError::Cancelled { .. })
    ));
    assert_eq!(blocker.wait().unwrap(), json!(100));
}

#[test]
fn shutdown_resolves_outstanding_tasks() {
    let dispatcher = start(1);
    let running = dispatcher.submit("sleep", vec![json!(50)]);
    let queued = dispatcher.submit("double", vec![json!(1)]);
    dispatcher.shutdown();

    assert!(matches!(queued.wait(), Err(DispatchError::Shutdown)));
    assert!(matches!(running.wait(), Err(DispatchError::Shutdown)));
}

#[test]
fn dropping_the_dispatcher_does_not_wait_for_timed_out_tasks() {
    let dispatcher = start(1);
    let slow = dispatcher.submit_with_timeout("sleep", vec![json!(3000)], Duration::from_millis(10));
    assert!(matches!(slow.wait(), Err(DispatchError::TimedOut { .. })));

    let started = Instant::now();
    drop(dispatcher);
    assert!(
        started.elapsed() < Duration::from_millis(1500),
        "drop blocked for {:?}",
        started.elapsed()
    );
}

#[test]
fn shutdown_does_not_wait_for_cancelled_tasks() {
    let dispatcher = start(1);
    let slow = dispatcher.submit("sleep", vec![json!(3000)]);
    thread::sleep(Duration::from_millis(20));
    dispatcher.cancel(slow.id());
    assert!(matches!(slow.wait(), Err(DispatchError::Cancelled { .. })));

    let started = Instant::now();
    dispatcher.shutdown();
    assert!(started.elapsed() < Duration::from_millis(1500));
}

#[test]
fn registry_lists_names_in_order() {
    let registry = registry();
    assert_eq!(registry.names(), vec!["double", "fail", "panic", "sleep"]);
    assert!(registry.contains("sleep"));
    assert!(!registry.contains("nope"));
}
