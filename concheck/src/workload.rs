//! Generating the operations executed during a run.
use std::ops::Range;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::operation::{Argument, MethodKind, MethodRef, OperationCall};

#[derive(Clone, Copy, Debug, PartialEq)]
enum Mix {
    /// Every method is equally likely.
    Uniform,
    /// Insert methods are chosen with the given probability.
    Writes(f64),
}

/// A recipe for a workload of randomly chosen operations.
///
/// Insert methods count as writes, while remove and read methods count as
/// reads. If the methods of an object are all writes, or all reads, then the
/// ratio between them is ignored.
///
/// # Examples
///
/// ```
/// use concheck::workload::WorkloadPattern;
///
/// let pattern = WorkloadPattern::producer_consumer(1000, 4, 0.7).seed(42);
/// assert_eq!(pattern.operations(), 1000);
/// assert_eq!(pattern.threads(), 4);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct WorkloadPattern {
    operations: usize,
    threads: usize,
    mix: Mix,
    seed: Option<u64>,
}

impl WorkloadPattern {
    /// The range of values that are inserted.
    pub const VALUES: Range<i64> = 0..1000;

    /// The range of keys, for methods that take a key and a value.
    pub const KEYS: Range<i64> = 0..16;

    /// A workload in which every method is equally likely.
    pub fn random(operations: usize, threads: usize) -> Self {
        Self {
            operations,
            threads,
            mix: Mix::Uniform,
            seed: None,
        }
    }

    /// A workload in which a fraction `producer_ratio` of operations insert.
    ///
    /// # Panics
    ///
    /// Panics if the ratio is not between 0 and 1.
    pub fn producer_consumer(operations: usize, threads: usize, producer_ratio: f64) -> Self {
        Self::with_writes(operations, threads, producer_ratio)
    }

    /// A workload in which a fraction `read_ratio` of operations do not insert.
    ///
    /// # Panics
    ///
    /// Panics if the ratio is not between 0 and 1.
    pub fn read_heavy(operations: usize, threads: usize, read_ratio: f64) -> Self {
        assert_ratio(read_ratio);
        Self::with_writes(operations, threads, 1.0 - read_ratio)
    }

    /// A workload in which a fraction `write_ratio` of operations insert.
    ///
    /// # Panics
    ///
    /// Panics if the ratio is not between 0 and 1.
    pub fn write_heavy(operations: usize, threads: usize, write_ratio: f64) -> Self {
        Self::with_writes(operations, threads, write_ratio)
    }

    /// A random workload that is the same every time it is generated.
    pub fn with_seed(operations: usize, threads: usize, seed: u64) -> Self {
        Self::random(operations, threads).seed(seed)
    }

    fn with_writes(operations: usize, threads: usize, ratio: f64) -> Self {
        assert_ratio(ratio);
        Self {
            operations,
            threads,
            mix: Mix::Writes(ratio),
            seed: None,
        }
    }

    /// Makes the workload deterministic.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn operations(&self) -> usize {
        self.operations
    }

    /// Returns the number of threads the workload is meant for. A
    /// verification run rejects patterns made for a different number of
    /// threads than its own.
    pub fn threads(&self) -> usize {
        self.threads
    }

    pub fn seed_value(&self) -> Option<u64> {
        self.seed
    }

    /// Generates a sequence of calls of the given methods.
    ///
    /// Returns nothing if there are no methods to call.
    pub fn generate(&self, methods: &[MethodRef]) -> Vec<OperationCall> {
        if methods.is_empty() {
            return Vec::new();
        }
        let mut rng = match self.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let (writes, reads): (Vec<MethodRef>, Vec<MethodRef>) = methods
            .iter()
            .copied()
            .partition(|method| method.kind() == MethodKind::Insert);
        // Single-argument methods take keys, if some other method takes a key and a value.
        let keyed = methods.iter().any(|method| method.arity() == 2);

        (0..self.operations)
            .map(|_| {
                let bucket: &[MethodRef] = match self.mix {
                    Mix::Uniform => methods,
                    Mix::Writes(_) if writes.is_empty() => &reads,
                    Mix::Writes(_) if reads.is_empty() => &writes,
                    Mix::Writes(ratio) => {
                        if rng.gen_bool(ratio) {
                            &writes
                        } else {
                            &reads
                        }
                    }
                };
                let method = bucket[rng.gen_range(0..bucket.len())];
                let argument = argument_for(&method, keyed, &mut rng);
                OperationCall::new(method, argument)
            })
            .collect()
    }
}

fn assert_ratio(ratio: f64) {
    assert!(
        (0.0..=1.0).contains(&ratio),
        "Ratio {ratio} is not between 0 and 1"
    );
}

fn argument_for(method: &MethodRef, keyed: bool, rng: &mut SmallRng) -> Option<Argument> {
    match method.arity() {
        0 => None,
        1 if keyed => Some(Argument::Int(rng.gen_range(WorkloadPattern::KEYS))),
        1 => Some(Argument::Int(rng.gen_range(WorkloadPattern::VALUES))),
        _ => Some(Argument::Pair(
            rng.gen_range(WorkloadPattern::KEYS),
            rng.gen_range(WorkloadPattern::VALUES),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn method(name: &'static str, arity: usize, kind: MethodKind, slot: usize) -> MethodRef {
        MethodRef {
            name,
            arity,
            kind,
            slot,
        }
    }

    fn queue_methods() -> Vec<MethodRef> {
        vec![
            method("offer", 1, MethodKind::Insert, 0),
            method("poll", 0, MethodKind::Remove, 1),
            method("peek", 0, MethodKind::Read, 2),
        ]
    }

    fn writes(calls: &[OperationCall]) -> usize {
        calls
            .iter()
            .filter(|call| call.method().kind() == MethodKind::Insert)
            .count()
    }

    mod generate {
        use super::*;

        #[test]
        fn generates_requested_number_of_operations() {
            let calls = WorkloadPattern::random(250, 4).generate(&queue_methods());
            assert_eq!(calls.len(), 250);
            assert!(calls.iter().all(OperationCall::has_valid_arity));
        }

        #[test]
        fn is_deterministic_when_seeded() {
            let pattern = WorkloadPattern::with_seed(100, 2, 7);
            assert_eq!(pattern.generate(&queue_methods()), pattern.generate(&queue_methods()));
        }

        #[test]
        fn different_seeds_give_different_workloads() {
            let first = WorkloadPattern::with_seed(100, 2, 1).generate(&queue_methods());
            let second = WorkloadPattern::with_seed(100, 2, 2).generate(&queue_methods());
            assert_ne!(first, second);
        }

        #[test]
        fn respects_write_ratio() {
            let calls = WorkloadPattern::write_heavy(2000, 4, 0.8)
                .seed(3)
                .generate(&queue_methods());
            let count = writes(&calls);
            assert!((1400..1800).contains(&count), "{count} writes");
        }

        #[test]
        fn respects_read_ratio() {
            let calls = WorkloadPattern::read_heavy(2000, 4, 0.9)
                .seed(3)
                .generate(&queue_methods());
            assert!(writes(&calls) < 400);
        }

        #[test]
        fn falls_back_to_available_methods() {
            let reads = vec![method("poll", 0, MethodKind::Remove, 0)];
            let calls = WorkloadPattern::producer_consumer(50, 2, 1.0)
                .seed(5)
                .generate(&reads);
            assert_eq!(calls.len(), 50);
            assert_eq!(writes(&calls), 0);
        }

        #[test]
        fn draws_keys_for_keyed_objects() {
            let methods = vec![
                method("put", 2, MethodKind::Insert, 0),
                method("get", 1, MethodKind::Read, 1),
            ];
            let calls = WorkloadPattern::with_seed(500, 1, 11).generate(&methods);
            for call in calls {
                match call.argument() {
                    Some(Argument::Pair(key, value)) => {
                        assert!(WorkloadPattern::KEYS.contains(&key));
                        assert!(WorkloadPattern::VALUES.contains(&value));
                    }
                    Some(Argument::Int(key)) => assert!(WorkloadPattern::KEYS.contains(&key)),
                    None => panic!("{call} has no argument"),
                }
            }
        }

        #[test]
        fn generates_nothing_without_methods() {
            assert!(WorkloadPattern::random(10, 1).generate(&[]).is_empty());
        }
    }

    #[test]
    #[should_panic]
    fn rejects_ratio_above_one() {
        WorkloadPattern::write_heavy(10, 1, 1.5);
    }
}
