use concheck::objects::{MutexDeque, MutexMap, MutexQueue, MutexSet};
use concheck::ObjectType;

use super::common::{
    assert_random_operations_are_linearizable, NUM_ITERATIONS, NUM_PREEMPTIONS,
};

#[test]
fn mutex_queue_is_linearizable() {
    shuttle::check_pct(
        || assert_random_operations_are_linearizable::<MutexQueue>(ObjectType::Queue),
        NUM_ITERATIONS,
        NUM_PREEMPTIONS,
    );
}

#[test]
fn mutex_deque_is_linearizable() {
    shuttle::check_pct(
        || assert_random_operations_are_linearizable::<MutexDeque>(ObjectType::Deque),
        NUM_ITERATIONS,
        NUM_PREEMPTIONS,
    );
}

#[test]
fn mutex_map_is_linearizable() {
    shuttle::check_pct(
        || assert_random_operations_are_linearizable::<MutexMap>(ObjectType::Map),
        NUM_ITERATIONS,
        NUM_PREEMPTIONS,
    );
}

#[test]
fn mutex_set_is_linearizable() {
    shuttle::check_random(
        || assert_random_operations_are_linearizable::<MutexSet>(ObjectType::Set),
        NUM_ITERATIONS,
    );
}
