use concheck::objects::{MutexMap, MutexQueue};
use concheck::operation::Argument;
use concheck::workload::WorkloadPattern;
use concheck::{verify, verify_named, Error, ObjectType, Snapshot};

fn assert_rejected(result: Result<concheck::VerificationResult, Error>) {
    assert!(matches!(result, Err(Error::Configuration(_))), "{result:?}");
}

#[test]
fn accepts_typed_and_named_settings() {
    let typed = verify::<MutexQueue>()
        .with_operations(20)
        .with_object_type(ObjectType::Queue)
        .with_snapshot(Snapshot::Optimized)
        .run()
        .unwrap();
    let named = verify::<MutexQueue>()
        .with_operations(20)
        .with_object_type("Queue")
        .with_snapshot("gAIsnap")
        .run()
        .unwrap();
    assert_eq!(typed.is_linearizable(), named.is_linearizable());
}

#[test]
fn rejects_missing_settings() {
    assert_rejected(verify::<MutexQueue>().with_object_type("queue").run());
    assert_rejected(verify::<MutexQueue>().with_operations(5).run());
}

#[test]
fn rejects_unknown_names() {
    assert_rejected(verify_named("SkipList").with_operations(5).run());
    assert_rejected(
        verify::<MutexQueue>()
            .with_operations(5)
            .with_object_type("heap")
            .run(),
    );
    assert_rejected(
        verify::<MutexQueue>()
            .with_operations(5)
            .with_object_type("queue")
            .with_snapshot("snapshot")
            .run(),
    );
}

#[test]
fn rejects_methods_the_model_does_not_understand() {
    assert_rejected(
        verify::<MutexMap>()
            .with_operations(5)
            .with_object_type("set")
            .with_methods(["put", "get"])
            .run(),
    );
}

#[test]
fn rejects_schedule_that_does_not_fit() {
    let base = || {
        verify::<MutexMap>()
            .with_operations(2)
            .with_object_type("map")
    };
    assert_rejected(base().with_schedule([("get", Some(Argument::Int(1)))]).run());
    assert_rejected(
        base()
            .with_schedule([("put", Some(Argument::Int(1))), ("get", Some(Argument::Int(1)))])
            .run(),
    );
    assert_rejected(
        base()
            .with_schedule([("put", Some(Argument::Pair(1, 2))), ("get", None)])
            .with_workload(WorkloadPattern::random(2, 1))
            .run(),
    );
}

#[test]
fn named_objects_can_be_retyped() {
    assert_rejected(
        verify_named("MutexMap")
            .with_operations(5)
            .with_object_type("queue")
            .run(),
    );
}
