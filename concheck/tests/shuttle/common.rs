use std::sync::Arc;

use concheck::handle::{ConcurrentObject, Handle};
use concheck::history::History;
use concheck::recorder::{RawRecorder, ThreadLog};
use concheck::workload::WorkloadPattern;
use concheck::ObjectType;
use concheck_utils::linearizability::DEFAULT_MAX_STATES;
use shuttle::rand::{thread_rng, Rng};
use shuttle::thread;

pub const NUM_ITERATIONS: usize = 250;
pub const NUM_OPERATIONS: usize = 20;
pub const NUM_PREEMPTIONS: usize = 3;
pub const NUM_THREADS: usize = 3;

/// Asserts that random operations, performed concurrently on a fresh object
/// of type `T`, produce a linearizable history.
///
/// # Panics
///
/// Panics if the history of random operations is not linearizable.
pub fn assert_random_operations_are_linearizable<T: ConcurrentObject>(object_type: ObjectType) {
    let handle = Arc::new(Handle::new::<T>(&[]).unwrap());
    let instance = handle.instantiate().unwrap();
    let recorder = Arc::new(RawRecorder::new());

    let mut threads = Vec::new();
    for i in 0..NUM_THREADS {
        let seed: u64 = thread_rng().gen();
        let calls = WorkloadPattern::random(NUM_OPERATIONS, NUM_THREADS)
            .seed(seed)
            .generate(handle.methods());
        let handle = handle.clone();
        let instance = instance.clone();
        let recorder = recorder.clone();
        threads.push(thread::spawn(move || {
            let mut log = ThreadLog::new(i, recorder, 2 * NUM_OPERATIONS);
            for call in calls {
                log.record(call, || handle.invoke(instance.as_ref(), &call))
                    .unwrap();
            }
            log.into_records()
        }));
    }

    let records = threads
        .into_iter()
        .flat_map(|thread| thread.join().unwrap())
        .collect();
    let history = History::from_records(records);
    assert!(object_type
        .check(&history, DEFAULT_MAX_STATES, None)
        .unwrap());
}
