//! Histories of operations executed by worker threads.
use crate::operation::{OperationCall, Outcome};

/// An identifier for a worker thread.
pub type ThreadId = usize;

/// The invocation and response of a single executed operation.
///
/// Stamps come from the recorder that was used for the run, and are only
/// comparable to stamps of the same run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    pub thread: ThreadId,
    pub call: OperationCall,
    pub outcome: Outcome,
    pub invoked_at: u64,
    pub responded_at: u64,
}

/// A boundary of an operation, in the timeline of a history.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event<'a> {
    Invocation(&'a Record),
    Response(&'a Record),
}

impl<'a> Event<'a> {
    pub fn record(&self) -> &'a Record {
        match self {
            Event::Invocation(record) | Event::Response(record) => record,
        }
    }
}

/// A complete, immutable, history of the operations executed during a run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct History {
    records: Vec<Record>,
}

impl History {
    /// Creates a history from records of completed operations.
    ///
    /// # Panics
    ///
    /// Panics if a record responds before it was invoked.
    pub fn from_records(mut records: Vec<Record>) -> Self {
        for record in &records {
            assert!(
                record.invoked_at < record.responded_at,
                "Operation {} by thread {} responded before it was invoked",
                record.call,
                record.thread
            );
        }
        records.sort_by_key(|record| (record.invoked_at, record.thread));
        Self { records }
    }

    /// Merges the buffers of each worker thread.
    pub(crate) fn merge(buffers: Vec<Vec<Record>>) -> Self {
        Self::from_records(buffers.into_iter().flatten().collect())
    }

    /// Returns the records of the history, ordered by invocation.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the number of operations that raised a fault.
    pub fn num_faults(&self) -> usize {
        self.records.iter().filter(|record| record.outcome.is_err()).count()
    }

    /// Returns every invocation and response, in the order in which they
    /// occurred, along with the index of its record.
    ///
    /// When an invocation and a response carry the same stamp, the invocation
    /// comes first, so that their operations are considered to overlap.
    pub fn events(&self) -> Vec<(usize, Event<'_>)> {
        let mut events: Vec<(u64, u8, usize, Event<'_>)> =
            Vec::with_capacity(2 * self.records.len());
        for (index, record) in self.records.iter().enumerate() {
            events.push((record.invoked_at, 0, index, Event::Invocation(record)));
            events.push((record.responded_at, 1, index, Event::Response(record)));
        }
        events.sort_by_key(|(stamp, rank, index, _)| (*stamp, *rank, *index));
        events
            .into_iter()
            .map(|(_, _, index, event)| (index, event))
            .collect()
    }
}
