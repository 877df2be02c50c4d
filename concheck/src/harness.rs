//! Executing operations on a shared object from many threads at once.
use std::ops::Range;
use std::panic;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::{Arc, Barrier};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::{Error, Phase};
use crate::handle::Handle;
use crate::history::{History, Record, ThreadId};
use crate::operation::OperationCall;
use crate::recorder::{Overflow, Recorder, ThreadLog};

/// Where worker threads get their operations from.
#[derive(Clone, Debug)]
pub enum Source {
    /// A schedule, cut into one contiguous slice per thread.
    Schedule(Arc<[OperationCall]>),
    /// A generated workload, from which threads pull operations as they go.
    Workload(Arc<[OperationCall]>),
}

impl Source {
    pub fn len(&self) -> usize {
        match self {
            Source::Schedule(calls) | Source::Workload(calls) => calls.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn work_for(&self, thread: ThreadId, threads: usize, cursor: &Arc<AtomicUsize>) -> Work {
        match self {
            Source::Schedule(calls) => Work::Slice {
                calls: calls.clone(),
                range: slice_of(calls.len(), thread, threads),
            },
            Source::Workload(calls) => Work::Shared {
                calls: calls.clone(),
                cursor: cursor.clone(),
            },
        }
    }
}

/// Returns the range of a schedule of `len` operations executed by `thread`.
fn slice_of(len: usize, thread: ThreadId, threads: usize) -> Range<usize> {
    let chunk = len.div_ceil(threads);
    let start = (thread * chunk).min(len);
    let end = (start + chunk).min(len);
    start..end
}

enum Work {
    Slice {
        calls: Arc<[OperationCall]>,
        range: Range<usize>,
    },
    Shared {
        calls: Arc<[OperationCall]>,
        cursor: Arc<AtomicUsize>,
    },
}

impl Iterator for Work {
    type Item = OperationCall;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Work::Slice { calls, range } => range.next().map(|i| calls[i]),
            Work::Shared { calls, cursor } => {
                let i = cursor.fetch_add(1, Ordering::Relaxed);
                calls.get(i).copied()
            }
        }
    }
}

/// The result of executing every operation.
#[derive(Debug)]
pub struct Execution {
    pub history: History,
    /// Wall-clock time from the release of the workers until the last of them finished.
    pub duration: Duration,
}

type Report = (ThreadId, Result<Vec<Record>, Overflow>);

/// Runs worker threads against a single shared instance of an implementation.
///
/// The harness does not synchronize access to the instance in any way.
pub struct Harness {
    handle: Arc<Handle>,
    threads: usize,
    capacity: usize,
    deadline: Option<Instant>,
    grace: Duration,
}

impl Harness {
    /// The default number of events that can be recorded by a run.
    pub const DEFAULT_CAPACITY: usize = 1 << 22;

    /// How long cancelled workers are waited for before they are abandoned.
    pub const DEFAULT_GRACE: Duration = Duration::from_millis(100);

    /// # Panics
    ///
    /// Panics if `threads` is zero.
    pub fn new(handle: Arc<Handle>, threads: usize) -> Self {
        assert!(threads > 0, "A harness needs at least one thread");
        Self {
            handle,
            threads,
            capacity: Self::DEFAULT_CAPACITY,
            deadline: None,
            grace: Self::DEFAULT_GRACE,
        }
    }

    /// Sets the number of events that can be recorded, shared evenly among threads.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Cancels execution if it has not finished by `deadline`.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    /// Executes every operation of `source`, recording them with `recorder`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`] if the deadline passes before every
    /// operation is executed, and [`Error::RecordingOverflow`] if the
    /// operations generate more events than the harness can record. In
    /// either case, nothing that was recorded is returned.
    pub fn execute<R: Recorder>(&self, recorder: R, source: Source) -> Result<Execution, Error> {
        let instance = self.handle.instantiate()?;
        let recorder = Arc::new(recorder);
        let cancelled = Arc::new(AtomicBool::new(false));
        let barrier = Arc::new(Barrier::new(self.threads + 1));
        let cursor = Arc::new(AtomicUsize::new(0));
        let capacity = self.capacity / self.threads;
        let (sender, receiver) = mpsc::channel::<Report>();

        debug!(
            threads = self.threads,
            operations = source.len(),
            "starting workers"
        );
        let mut workers = Vec::with_capacity(self.threads);
        for thread in 0..self.threads {
            let mut work = source.work_for(thread, self.threads, &cursor);
            let handle = self.handle.clone();
            let instance = instance.clone();
            let recorder = recorder.clone();
            let cancelled = cancelled.clone();
            let barrier = barrier.clone();
            let sender = sender.clone();
            workers.push(thread::spawn(move || {
                let mut log = ThreadLog::new(thread, recorder, capacity);
                barrier.wait();
                let mut result = Ok(());
                while !cancelled.load(Ordering::Acquire) {
                    let Some(call) = work.next() else {
                        break;
                    };
                    result = log.record(call, || handle.invoke(instance.as_ref(), &call));
                    if result.is_err() {
                        cancelled.store(true, Ordering::Release);
                        break;
                    }
                }
                // The receiver is gone only if the harness gave up on this worker.
                let _ = sender.send((thread, result.map(|()| log.into_records())));
            }));
        }
        drop(sender);

        barrier.wait();
        let start = Instant::now();

        let mut buffers = Vec::with_capacity(self.threads);
        let mut overflowed = false;
        let mut received = 0;
        while received < self.threads {
            let report = match self.deadline {
                Some(deadline) => {
                    receiver.recv_timeout(deadline.saturating_duration_since(Instant::now()))
                }
                None => receiver.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };
            match report {
                Ok((_, Ok(records))) => buffers.push(records),
                Ok((thread, Err(Overflow))) => {
                    warn!(thread, capacity = self.capacity, "recording overflowed");
                    overflowed = true;
                }
                Err(RecvTimeoutError::Timeout) => {
                    let elapsed = start.elapsed();
                    cancelled.store(true, Ordering::Release);
                    warn!(?elapsed, "execution timed out, cancelling workers");
                    self.abandon(workers, &receiver, self.threads - received);
                    return Err(Error::Timeout {
                        phase: Phase::Execution,
                        elapsed,
                    });
                }
                Err(RecvTimeoutError::Disconnected) => {
                    // Every worker reports before exiting, unless it panicked.
                    for worker in workers {
                        if let Err(payload) = worker.join() {
                            panic::resume_unwind(payload);
                        }
                    }
                    unreachable!("worker exited without reporting");
                }
            }
            received += 1;
        }
        let duration = start.elapsed();

        for worker in workers {
            if let Err(payload) = worker.join() {
                panic::resume_unwind(payload);
            }
        }
        if overflowed {
            return Err(Error::RecordingOverflow {
                capacity: self.capacity,
            });
        }

        let history = History::merge(buffers);
        debug!(
            operations = history.len(),
            faults = history.num_faults(),
            ?duration,
            "workers finished"
        );
        Ok(Execution { history, duration })
    }

    /// Waits, for at most the grace period, for cancelled workers to finish
    /// their current operation. Workers that are still running afterwards are
    /// left to finish on their own.
    fn abandon(&self, workers: Vec<JoinHandle<()>>, receiver: &Receiver<Report>, remaining: usize) {
        let grace_deadline = Instant::now() + self.grace;
        let mut finished = 0;
        while finished < remaining {
            let timeout = grace_deadline.saturating_duration_since(Instant::now());
            match receiver.recv_timeout(timeout) {
                Ok(_) => finished += 1,
                Err(_) => break,
            }
        }
        if finished < remaining {
            warn!(
                abandoned = remaining - finished,
                "workers did not stop within the grace period"
            );
        } else {
            for worker in workers {
                let _ = worker.join();
            }
        }
    }
}
