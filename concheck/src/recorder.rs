//! Recording the invocations and responses of concurrent operations.
//!
//! Each worker thread appends to its own [`ThreadLog`], stamping the
//! boundaries of every operation with a [`Recorder`] shared by the run. Logs
//! are merged once every worker is done. Whichever recorder is used, if the
//! response of an operation is stamped before the invocation of another, the
//! first operation really did complete before the second began.
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::Error;
use crate::history::{Record, ThreadId};
use crate::operation::{OperationCall, Outcome};

mod optimized;
mod raw;
pub use self::optimized::OptimizedRecorder;
pub use self::raw::RawRecorder;

/// A source of stamps for the boundaries of operations.
pub trait Recorder: Send + Sync + 'static {
    /// Stamps an invocation, by a thread whose previous stamp was `last`.
    ///
    /// The stamp must be greater than `last`.
    fn invocation(&self, last: Option<u64>) -> u64;

    /// Stamps the response to an invocation stamped `invoked_at`.
    ///
    /// The stamp must be greater than `invoked_at`.
    fn response(&self, invoked_at: u64) -> u64;
}

/// The strategy used to record a history.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Snapshot {
    /// Stamps taken from a single atomic counter. See [`RawRecorder`].
    #[default]
    Raw,
    /// Stamps taken from each thread's reading of the clock. See [`OptimizedRecorder`].
    Optimized,
}

impl Snapshot {
    pub fn name(&self) -> &'static str {
        match self {
            Snapshot::Raw => "raw",
            Snapshot::Optimized => "optimized",
        }
    }
}

impl AsRef<str> for Snapshot {
    fn as_ref(&self) -> &str {
        self.name()
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Snapshot {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "raw" | "rawsnap" => Ok(Snapshot::Raw),
            "optimized" | "gaisnap" => Ok(Snapshot::Optimized),
            _ => Err(Error::Configuration(format!("unknown snapshot strategy '{s}'"))),
        }
    }
}

/// The operation could not be recorded, because the log was full.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Overflow;

/// The log of the operations performed by a single worker thread.
pub struct ThreadLog<R: Recorder> {
    thread: ThreadId,
    recorder: Arc<R>,
    records: Vec<Record>,
    // Maximum number of events (two per operation).
    capacity: usize,
    last: Option<u64>,
}

impl<R: Recorder> ThreadLog<R> {
    pub fn new(thread: ThreadId, recorder: Arc<R>, capacity: usize) -> Self {
        Self {
            thread,
            recorder,
            records: Vec::new(),
            capacity,
            last: None,
        }
    }

    /// Performs an operation, recording its invocation and response.
    ///
    /// # Errors
    ///
    /// Returns [`Overflow`], without performing the operation, if the log
    /// cannot hold two more events.
    pub fn record<F>(&mut self, call: OperationCall, operation: F) -> Result<(), Overflow>
    where
        F: FnOnce() -> Outcome,
    {
        if 2 * (self.records.len() + 1) > self.capacity {
            return Err(Overflow);
        }
        let invoked_at = self.recorder.invocation(self.last);
        let outcome = operation();
        let responded_at = self.recorder.response(invoked_at);
        self.last = Some(responded_at);
        self.records.push(Record {
            thread: self.thread,
            call,
            outcome,
            invoked_at,
            responded_at,
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::{MethodKind, MethodRef, Value};

    fn call() -> OperationCall {
        let method = MethodRef {
            name: "peek",
            arity: 0,
            kind: MethodKind::Read,
            slot: 0,
        };
        OperationCall::new(method, None)
    }

    fn fill<R: Recorder>(log: &mut ThreadLog<R>, operations: usize) {
        for _ in 0..operations {
            log.record(call(), || Ok(Value::Nil)).unwrap();
        }
    }

    fn assert_strictly_increasing(records: &[Record]) {
        let mut last = None;
        for record in records {
            assert!(Some(record.invoked_at) > last);
            assert!(record.responded_at > record.invoked_at);
            last = Some(record.responded_at);
        }
    }

    mod record {
        use super::*;

        #[test]
        fn raw_stamps_increase_within_thread() {
            let mut log = ThreadLog::new(0, Arc::new(RawRecorder::new()), 100);
            fill(&mut log, 10);
            assert_strictly_increasing(&log.into_records());
        }

        #[test]
        fn optimized_stamps_increase_within_thread() {
            let recorder = OptimizedRecorder::new(std::time::Duration::from_micros(5));
            let mut log = ThreadLog::new(0, Arc::new(recorder), 100);
            fill(&mut log, 10);
            assert_strictly_increasing(&log.into_records());
        }

        #[test]
        fn overflows_when_capacity_is_reached() {
            let mut log = ThreadLog::new(0, Arc::new(RawRecorder::new()), 4);
            fill(&mut log, 2);
            let mut performed = false;
            let result = log.record(call(), || {
                performed = true;
                Ok(Value::Nil)
            });
            assert_eq!(result, Err(Overflow));
            assert!(!performed);
            assert_eq!(log.len(), 2);
        }

        #[test]
        fn records_faults_as_outcomes() {
            let mut log = ThreadLog::new(3, Arc::new(RawRecorder::new()), 10);
            log.record(call(), || Err(crate::operation::Fault::new("boom")))
                .unwrap();
            let records = log.into_records();
            assert_eq!(records[0].thread, 3);
            assert!(records[0].outcome.is_err());
        }
    }

    mod from_str {
        use super::*;

        #[test]
        fn accepts_names_and_aliases() {
            assert_eq!("raw".parse::<Snapshot>(), Ok(Snapshot::Raw));
            assert_eq!("rawsnap".parse::<Snapshot>(), Ok(Snapshot::Raw));
            assert_eq!("optimized".parse::<Snapshot>(), Ok(Snapshot::Optimized));
            assert_eq!("gAIsnap".parse::<Snapshot>(), Ok(Snapshot::Optimized));
        }

        #[test]
        fn rejects_unknown_names() {
            assert!(matches!(
                "vector".parse::<Snapshot>(),
                Err(Error::Configuration(_))
            ));
        }
    }
}
