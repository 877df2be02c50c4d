use proptest::prelude::*;

use concheck::objects::{BrokenQueue, MutexQueue};
use concheck::workload::WorkloadPattern;
use concheck::{verify, Snapshot};

fn verdict<T: concheck::handle::ConcurrentObject>(snapshot: Snapshot, seed: u64) -> bool {
    verify::<T>()
        .with_threads(3)
        .with_operations(90)
        .with_object_type("queue")
        .with_methods(["offer", "poll"])
        .with_workload(WorkloadPattern::with_seed(90, 3, seed))
        .with_snapshot(snapshot)
        .run()
        .unwrap()
        .is_linearizable()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn strategies_agree_on_correct_queue(seed in any::<u64>()) {
        prop_assert!(verdict::<MutexQueue>(Snapshot::Raw, seed));
        prop_assert!(verdict::<MutexQueue>(Snapshot::Optimized, seed));
    }

    #[test]
    fn strategies_agree_on_broken_queue(seed in any::<u64>()) {
        prop_assert!(!verdict::<BrokenQueue>(Snapshot::Raw, seed));
        prop_assert!(!verdict::<BrokenQueue>(Snapshot::Optimized, seed));
    }
}
