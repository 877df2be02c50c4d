use std::sync::atomic::{AtomicU64, Ordering};

use super::Recorder;

/// A recorder that stamps boundaries with tickets from a single atomic counter.
///
/// Tickets give an exact total order of every boundary in the run, at the cost
/// of every thread contending on the counter, twice per operation. A ticket
/// for an invocation is taken before the operation starts, and a ticket for a
/// response after it ends, so the recorded interval of an operation always
/// contains its real one.
///
/// Each run owns its own counter.
#[derive(Debug, Default)]
pub struct RawRecorder {
    counter: AtomicU64,
}

impl RawRecorder {
    pub fn new() -> Self {
        Self {
            counter: AtomicU64::new(0),
        }
    }

    fn ticket(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::SeqCst)
    }
}

impl Recorder for RawRecorder {
    fn invocation(&self, _last: Option<u64>) -> u64 {
        self.ticket()
    }

    fn response(&self, _invoked_at: u64) -> u64 {
        self.ticket()
    }
}
