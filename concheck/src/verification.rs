//! Configuring and running the verification of an implementation.
use std::sync::Arc;
use std::time::{Duration, Instant};

use concheck_utils::linearizability::DEFAULT_MAX_STATES;
use concheck_utils::CheckError;
use tracing::{debug, info, warn};

use crate::catalog::{Binder, Catalog};
use crate::error::{Error, Phase};
use crate::handle::{ConcurrentObject, Handle};
use crate::harness::{Execution, Harness, Source};
use crate::object_type::ObjectType;
use crate::operation::{Argument, OperationCall};
use crate::recorder::{OptimizedRecorder, RawRecorder, Snapshot};
use crate::workload::WorkloadPattern;

enum Target {
    Bound {
        bind: Binder,
        default_methods: &'static [&'static str],
    },
    Unknown(String),
}

/// Starts the configuration of a run that verifies objects of type `T`.
///
/// # Examples
///
/// ```
/// use concheck::objects::MutexQueue;
/// use concheck::operation::Argument;
/// use concheck::verify;
///
/// let result = verify::<MutexQueue>()
///     .with_operations(3)
///     .with_object_type("queue")
///     .with_schedule([
///         ("offer", Some(Argument::Int(1))),
///         ("poll", None),
///         ("poll", None),
///     ])
///     .run()
///     .unwrap();
/// assert!(result.is_linearizable());
/// ```
pub fn verify<T: ConcurrentObject>() -> Verification {
    Verification::new(Target::Bound {
        bind: Handle::new::<T>,
        default_methods: &[],
    })
}

/// Starts the configuration of a run that verifies the built-in object with
/// the given name. See [`Catalog`].
///
/// The object type of the run defaults to that of the named object.
pub fn verify_named(name: &str) -> Verification {
    match Catalog::lookup(name) {
        Some(entry) => {
            let mut verification = Verification::new(Target::Bound {
                bind: entry.binder(),
                default_methods: entry.default_methods(),
            });
            verification.object_type = Some(entry.object_type().name().to_owned());
            verification
        }
        None => Verification::new(Target::Unknown(name.to_owned())),
    }
}

/// The configuration of a verification run.
///
/// Configuration is only validated by [`run`](Verification::run), before
/// anything is executed.
pub struct Verification {
    target: Target,
    threads: usize,
    operations: Option<usize>,
    timeout: Option<Duration>,
    object_type: Option<String>,
    methods: Option<Vec<String>>,
    schedule: Option<Vec<(String, Option<Argument>)>>,
    workload: Option<WorkloadPattern>,
    snapshot: Option<String>,
    capacity: usize,
    max_states: usize,
    clock_skew: Duration,
}

impl Verification {
    fn new(target: Target) -> Self {
        Self {
            target,
            threads: 1,
            operations: None,
            timeout: None,
            object_type: None,
            methods: None,
            schedule: None,
            workload: None,
            snapshot: None,
            capacity: Harness::DEFAULT_CAPACITY,
            max_states: DEFAULT_MAX_STATES,
            clock_skew: OptimizedRecorder::DEFAULT_SKEW,
        }
    }

    /// Sets the number of worker threads. Defaults to 1.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Sets the number of operations to execute. Required.
    pub fn with_operations(mut self, operations: usize) -> Self {
        self.operations = Some(operations);
        self
    }

    /// Bounds the duration of the whole run. Unbounded by default.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the type of object the implementation is checked against, either
    /// as an [`ObjectType`] or by name. Required.
    pub fn with_object_type(mut self, object_type: impl AsRef<str>) -> Self {
        self.object_type = Some(object_type.as_ref().to_owned());
        self
    }

    /// Restricts the methods that are called. By default, every method of
    /// the implementation is called.
    pub fn with_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.methods = Some(methods.into_iter().map(Into::into).collect());
        self
    }

    /// Executes exactly the given calls, in slices of consecutive calls per
    /// thread, instead of a generated workload.
    pub fn with_schedule<I, S>(mut self, calls: I) -> Self
    where
        I: IntoIterator<Item = (S, Option<Argument>)>,
        S: Into<String>,
    {
        self.schedule = Some(
            calls
                .into_iter()
                .map(|(method, argument)| (method.into(), argument))
                .collect(),
        );
        self
    }

    /// Generates the operations to execute from a pattern. By default, every
    /// method is equally likely.
    ///
    /// The pattern must describe the same number of operations and threads
    /// as the run.
    pub fn with_workload(mut self, pattern: WorkloadPattern) -> Self {
        self.workload = Some(pattern);
        self
    }

    /// Sets the strategy used to record the history, either as a
    /// [`Snapshot`] or by name. Defaults to [`Snapshot::Raw`].
    pub fn with_snapshot(mut self, snapshot: impl AsRef<str>) -> Self {
        self.snapshot = Some(snapshot.as_ref().to_owned());
        self
    }

    /// Sets the number of events that can be recorded, shared evenly among threads.
    pub fn with_recorder_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Bounds the number of states explored by the checker.
    pub fn with_max_states(mut self, max_states: usize) -> Self {
        self.max_states = max_states;
        self
    }

    /// Sets the clock skew tolerated by [`Snapshot::Optimized`].
    pub fn with_clock_skew(mut self, skew: Duration) -> Self {
        self.clock_skew = skew;
        self
    }

    /// Executes the operations on a shared object, then checks whether the
    /// recorded history is linearizable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`], without executing anything, if the
    /// run is configured incorrectly. Otherwise returns an error if the run
    /// times out, overflows its recorder, or if the checker cannot reach a
    /// verdict.
    pub fn run(self) -> Result<VerificationResult, Error> {
        let start = Instant::now();
        let deadline = self.timeout.map(|timeout| start + timeout);
        let plan = self.plan()?;

        info!(
            implementation = plan.handle.type_name(),
            object_type = %plan.object_type,
            snapshot = %plan.snapshot,
            threads = plan.threads,
            operations = plan.operations,
            "starting verification"
        );

        let source = match plan.calls {
            Calls::Scheduled(calls) => Source::Schedule(calls.into()),
            Calls::Generated(pattern) => {
                Source::Workload(pattern.generate(plan.handle.methods()).into())
            }
        };
        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Err(timed_out(Phase::Execution, start));
        }

        let mut harness = Harness::new(Arc::new(plan.handle), plan.threads)
            .with_capacity(self.capacity);
        if let Some(deadline) = deadline {
            harness = harness.with_deadline(deadline);
        }
        let Execution { history, duration } = match plan.snapshot {
            Snapshot::Raw => harness.execute(RawRecorder::new(), source),
            Snapshot::Optimized => {
                harness.execute(OptimizedRecorder::new(self.clock_skew), source)
            }
        }?;
        debug!(
            ?duration,
            faults = history.num_faults(),
            "execution finished"
        );

        let verification_start = Instant::now();
        let linearizable = plan
            .object_type
            .check(&history, self.max_states, deadline)
            .map_err(|error| match error {
                CheckError::Inconclusive { explored } => {
                    warn!(explored, "verification inconclusive");
                    Error::Inconclusive { explored }
                }
                CheckError::DeadlineExceeded { explored } => {
                    warn!(explored, "verification timed out");
                    timed_out(Phase::Verification, start)
                }
            })?;
        let verifier_duration = verification_start.elapsed();
        debug!(?verifier_duration, "verification finished");

        let total_duration = start.elapsed();
        if self.timeout.is_some_and(|timeout| total_duration > timeout) {
            return Err(timed_out(Phase::Verification, start));
        }

        info!(
            linearizable,
            ?total_duration,
            "finished verification"
        );
        Ok(VerificationResult {
            linearizable,
            producer_duration: duration,
            verifier_duration,
            total_duration,
            operations: plan.operations,
            threads: plan.threads,
        })
    }

    /// Validates the configuration, and binds the implementation.
    fn plan(&self) -> Result<Plan, Error> {
        let (bind, default_methods) = match &self.target {
            Target::Bound {
                bind,
                default_methods,
            } => (*bind, *default_methods),
            Target::Unknown(name) => {
                return Err(configuration(format!("no built-in object is named '{name}'")))
            }
        };
        let operations = match self.operations {
            Some(0) => return Err(configuration("operation count must be positive")),
            Some(operations) => operations,
            None => return Err(configuration("operation count is required")),
        };
        if self.threads == 0 {
            return Err(configuration("thread count must be positive"));
        }
        let object_type: ObjectType = self
            .object_type
            .as_deref()
            .ok_or_else(|| configuration("object type is required"))?
            .parse()?;
        let snapshot: Snapshot = match &self.snapshot {
            Some(name) => name.parse()?,
            None => Snapshot::default(),
        };
        if self.schedule.is_some() && self.workload.is_some() {
            return Err(configuration(
                "a run takes either a schedule or a workload, not both",
            ));
        }

        let names: Vec<&str> = match &self.methods {
            Some(methods) => methods.iter().map(String::as_str).collect(),
            None => default_methods.to_vec(),
        };
        let handle = bind(&names)?;
        if handle.methods().is_empty() {
            return Err(configuration(format!(
                "{} has no methods to call",
                handle.type_name()
            )));
        }
        if let Some(method) = handle
            .methods()
            .iter()
            .find(|method| !object_type.supports(method.name()))
        {
            return Err(configuration(format!(
                "'{}' is not a method of a {object_type}",
                method.name()
            )));
        }

        let calls = match (&self.schedule, &self.workload) {
            (Some(schedule), _) => {
                if schedule.len() != operations {
                    return Err(configuration(format!(
                        "schedule has {} calls, but {operations} operations were requested",
                        schedule.len()
                    )));
                }
                let calls = schedule
                    .iter()
                    .map(|(method, argument)| handle.call(method, *argument))
                    .collect::<Result<Vec<OperationCall>, Error>>()?;
                Calls::Scheduled(calls)
            }
            (None, Some(pattern)) => {
                if pattern.operations() != operations {
                    return Err(configuration(format!(
                        "workload has {} operations, but {operations} were requested",
                        pattern.operations()
                    )));
                }
                if pattern.threads() != self.threads {
                    return Err(configuration(format!(
                        "workload is for {} threads, but {} were requested",
                        pattern.threads(),
                        self.threads
                    )));
                }
                Calls::Generated(pattern.clone())
            }
            (None, None) => Calls::Generated(WorkloadPattern::random(operations, self.threads)),
        };

        Ok(Plan {
            handle,
            object_type,
            snapshot,
            threads: self.threads,
            operations,
            calls,
        })
    }
}

enum Calls {
    Scheduled(Vec<OperationCall>),
    Generated(WorkloadPattern),
}

/// A validated configuration.
struct Plan {
    handle: Handle,
    object_type: ObjectType,
    snapshot: Snapshot,
    threads: usize,
    operations: usize,
    calls: Calls,
}

fn configuration(message: impl Into<String>) -> Error {
    Error::Configuration(message.into())
}

fn timed_out(phase: Phase, start: Instant) -> Error {
    let elapsed = start.elapsed();
    warn!(%phase, ?elapsed, "verification run timed out");
    Error::Timeout { phase, elapsed }
}

/// The outcome of a verification run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerificationResult {
    linearizable: bool,
    producer_duration: Duration,
    verifier_duration: Duration,
    total_duration: Duration,
    operations: usize,
    threads: usize,
}

impl VerificationResult {
    pub fn is_linearizable(&self) -> bool {
        self.linearizable
    }

    /// Returns how long the worker threads took to execute every operation.
    pub fn producer_duration(&self) -> Duration {
        self.producer_duration
    }

    /// Returns how long the checker took to reach its verdict.
    pub fn verifier_duration(&self) -> Duration {
        self.verifier_duration
    }

    /// Returns how long the whole run took, including its configuration.
    pub fn total_duration(&self) -> Duration {
        self.total_duration
    }

    pub fn operations(&self) -> usize {
        self.operations
    }

    pub fn threads(&self) -> usize {
        self.threads
    }
}

#[cfg(all(test, not(feature = "shuttle")))]
mod tests {
    use super::*;
    use crate::objects::{MutexMap, MutexQueue};

    fn queue() -> Verification {
        verify::<MutexQueue>()
            .with_operations(10)
            .with_object_type(ObjectType::Queue)
    }

    fn assert_configuration_error(verification: Verification) {
        let result = verification.run();
        assert!(
            matches!(result, Err(Error::Configuration(_))),
            "{result:?}"
        );
    }

    mod run {
        use super::*;

        #[test]
        fn requires_operation_count() {
            assert_configuration_error(verify::<MutexQueue>().with_object_type("queue"));
            assert_configuration_error(queue().with_operations(0));
        }

        #[test]
        fn requires_object_type() {
            assert_configuration_error(verify::<MutexQueue>().with_operations(10));
        }

        #[test]
        fn rejects_unknown_names() {
            assert_configuration_error(queue().with_object_type("stack"));
            assert_configuration_error(queue().with_snapshot("vector"));
            assert_configuration_error(queue().with_methods(["push"]));
            assert_configuration_error(verify_named("LockFreeStack").with_operations(10));
        }

        #[test]
        fn rejects_zero_threads() {
            assert_configuration_error(queue().with_threads(0));
        }

        #[test]
        fn rejects_methods_outside_the_model() {
            assert_configuration_error(
                verify::<MutexMap>()
                    .with_operations(10)
                    .with_object_type("queue"),
            );
        }

        #[test]
        fn rejects_schedule_with_workload() {
            assert_configuration_error(
                queue()
                    .with_schedule([("poll", None); 10])
                    .with_workload(WorkloadPattern::random(10, 1)),
            );
        }

        #[test]
        fn rejects_schedule_of_wrong_length() {
            assert_configuration_error(queue().with_schedule([("poll", None); 3]));
        }

        #[test]
        fn rejects_schedule_with_wrong_arity() {
            let mut schedule = vec![("poll", None); 9];
            schedule.push(("offer", None));
            assert_configuration_error(queue().with_schedule(schedule));
        }

        #[test]
        fn rejects_scheduled_method_that_is_not_bound() {
            assert_configuration_error(
                queue()
                    .with_methods(["offer"])
                    .with_schedule([("poll", None); 10]),
            );
        }

        #[test]
        fn rejects_workload_of_wrong_size() {
            assert_configuration_error(queue().with_workload(WorkloadPattern::random(5, 1)));
        }

        #[test]
        fn rejects_workload_for_other_thread_count() {
            assert_configuration_error(
                queue()
                    .with_threads(2)
                    .with_workload(WorkloadPattern::random(10, 4)),
            );
            let result = queue()
                .with_threads(2)
                .with_workload(WorkloadPattern::with_seed(10, 2, 1))
                .run()
                .unwrap();
            assert!(result.is_linearizable());
        }

        #[test]
        fn reports_counts_of_run() {
            let result = queue().with_threads(2).run().unwrap();
            assert!(result.is_linearizable());
            assert_eq!(result.operations(), 10);
            assert_eq!(result.threads(), 2);
            assert!(result.total_duration() >= result.verifier_duration());
        }

        #[test]
        fn presets_object_type_of_named_object() {
            let result = verify_named("MutexSet").with_operations(20).run().unwrap();
            assert!(result.is_linearizable());
        }
    }
}
