use std::time::Duration;

use concheck::catalog::Catalog;
use concheck::objects::{BrokenQueue, MutexDeque, MutexQueue, NonLinearizableQueue};
use concheck::operation::Argument;
use concheck::workload::WorkloadPattern;
use concheck::{verify, verify_named, Error, Phase};

use super::common::{init_tracing, FlakyQueue};

#[test]
fn sequential_fifo_schedule_is_linearizable() {
    init_tracing();
    let result = verify::<MutexQueue>()
        .with_threads(1)
        .with_operations(5)
        .with_object_type("queue")
        .with_methods(["offer", "poll"])
        .with_schedule([
            ("offer", Some(Argument::Int(2))),
            ("poll", None),
            ("offer", Some(Argument::Int(3))),
            ("poll", None),
            ("offer", Some(Argument::Int(5))),
        ])
        .run()
        .unwrap();
    assert!(result.is_linearizable());
    assert!(result.total_duration() >= result.producer_duration());
    assert!(result.total_duration() >= result.verifier_duration());
}

#[test]
fn single_thread_executions_are_linearizable() {
    init_tracing();
    let result = verify::<MutexDeque>()
        .with_operations(300)
        .with_object_type("deque")
        .run()
        .unwrap();
    assert!(result.is_linearizable());
}

#[test]
fn broken_queue_is_never_linearizable() {
    init_tracing();
    for seed in 0..5 {
        let result = verify::<BrokenQueue>()
            .with_threads(4)
            .with_operations(100)
            .with_object_type("queue")
            .with_methods(["offer", "poll"])
            .with_workload(WorkloadPattern::with_seed(100, 4, seed))
            .run()
            .unwrap();
        assert!(!result.is_linearizable(), "seed {seed}");
    }
}

#[test]
fn lifo_order_is_not_linearizable() {
    init_tracing();
    let result = verify_named("NonLinearizableQueue")
        .with_operations(3)
        .with_schedule([
            ("offer", Some(Argument::Int(1))),
            ("offer", Some(Argument::Int(2))),
            ("poll", None),
        ])
        .run()
        .unwrap();
    assert!(!result.is_linearizable());
}

#[test]
fn nonlinearizable_queue_can_be_verified_by_type() {
    init_tracing();
    let result = verify::<NonLinearizableQueue>()
        .with_threads(1)
        .with_operations(5)
        .with_object_type("queue")
        .with_schedule([
            ("offer", Some(Argument::Int(1))),
            ("offer", Some(Argument::Int(2))),
            ("offer", Some(Argument::Int(3))),
            ("poll", None),
            ("poll", None),
        ])
        .run()
        .unwrap();
    assert!(!result.is_linearizable());
    assert_eq!(result.operations(), 5);
}

#[test]
fn built_in_objects_behave_as_catalogued() {
    init_tracing();
    for entry in Catalog::entries().iter().filter(|entry| entry.is_linearizable()) {
        let result = verify_named(entry.name())
            .with_threads(4)
            .with_operations(200)
            .run()
            .unwrap();
        assert!(result.is_linearizable(), "{}", entry.name());
    }
}

#[test]
fn faulted_operations_may_have_taken_effect() {
    init_tracing();
    let result = verify::<FlakyQueue>()
        .with_threads(3)
        .with_operations(120)
        .with_object_type("queue")
        .with_workload(WorkloadPattern::producer_consumer(120, 3, 0.5).seed(9))
        .run()
        .unwrap();
    assert!(result.is_linearizable());
}

#[test]
fn execution_that_exceeds_timeout_fails() {
    init_tracing();
    let result = verify::<MutexQueue>()
        .with_threads(4)
        .with_operations(200_000)
        .with_object_type("queue")
        .with_timeout(Duration::from_millis(1))
        .run();
    assert!(matches!(
        result,
        Err(Error::Timeout {
            phase: Phase::Execution,
            ..
        })
    ));
}

#[test]
fn recording_overflow_aborts_run() {
    init_tracing();
    let result = verify::<MutexQueue>()
        .with_operations(100)
        .with_object_type("queue")
        .with_recorder_capacity(10)
        .run();
    assert_eq!(result, Err(Error::RecordingOverflow { capacity: 10 }));
}

#[test]
fn exhausting_state_bound_is_inconclusive() {
    init_tracing();
    let result = verify::<MutexQueue>()
        .with_operations(5)
        .with_object_type("queue")
        .with_methods(["offer"])
        .with_max_states(1)
        .run();
    assert_eq!(result, Err(Error::Inconclusive { explored: 2 }));
}
