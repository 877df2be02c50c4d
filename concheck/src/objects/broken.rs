//! Queues that are not linearizable.
use std::collections::VecDeque;

use crate::handle::{ConcurrentObject, MethodDef};
use crate::operation::{Fault, MethodKind::*, Value};
use crate::sync::{AtomicUsize, Mutex, MutexGuard, Ordering};

use super::{int_argument, poisoned, MutexQueue};

/// A queue whose every seventh poll returns an element that was never offered.
///
/// # Examples
///
/// ```
/// use concheck::objects::BrokenQueue;
///
/// let queue = BrokenQueue::new();
/// for _ in 0..6 {
///     assert_eq!(queue.poll(), Ok(None));
/// }
/// assert_eq!(queue.poll(), Ok(Some(BrokenQueue::FABRICATED)));
/// ```
pub struct BrokenQueue {
    queue: MutexQueue,
    polls: AtomicUsize,
}

impl BrokenQueue {
    /// The element returned by faulty polls.
    pub const FABRICATED: i64 = -1;

    const PERIOD: usize = 7;

    pub fn new() -> Self {
        Self {
            queue: MutexQueue::new(),
            polls: AtomicUsize::new(0),
        }
    }

    pub fn offer(&self, value: i64) -> Result<bool, Fault> {
        self.queue.offer(value)
    }

    pub fn poll(&self) -> Result<Option<i64>, Fault> {
        let count = self.polls.fetch_add(1, Ordering::SeqCst) + 1;
        if count % Self::PERIOD == 0 {
            return Ok(Some(Self::FABRICATED));
        }
        self.queue.poll()
    }

    pub fn peek(&self) -> Result<Option<i64>, Fault> {
        self.queue.peek()
    }

    pub fn size(&self) -> Result<usize, Fault> {
        self.queue.size()
    }

    pub fn is_empty(&self) -> Result<bool, Fault> {
        self.queue.is_empty()
    }
}

impl Default for BrokenQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl ConcurrentObject for BrokenQueue {
    fn instantiate() -> Result<Self, Fault> {
        Ok(Self::new())
    }

    fn methods() -> Vec<MethodDef<Self>> {
        vec![
            MethodDef::new("offer", 1, Insert, |queue: &Self, argument| {
                queue.offer(int_argument(argument)?).map(Value::from)
            }),
            MethodDef::new("poll", 0, Remove, |queue: &Self, _| {
                queue.poll().map(Value::from)
            }),
            MethodDef::new("peek", 0, Read, |queue: &Self, _| {
                queue.peek().map(Value::from)
            }),
            MethodDef::new("size", 0, Read, |queue: &Self, _| {
                queue.size().map(Value::from)
            }),
            MethodDef::new("is_empty", 0, Read, |queue: &Self, _| {
                queue.is_empty().map(Value::from)
            }),
        ]
    }
}

/// A "queue" that polls the most recently offered element.
pub struct NonLinearizableQueue {
    stack: Mutex<VecDeque<i64>>,
}

impl NonLinearizableQueue {
    pub fn new() -> Self {
        Self {
            stack: Mutex::new(VecDeque::new()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, VecDeque<i64>>, Fault> {
        self.stack.lock().map_err(poisoned)
    }

    pub fn offer(&self, value: i64) -> Result<bool, Fault> {
        self.lock()?.push_back(value);
        Ok(true)
    }

    pub fn poll(&self) -> Result<Option<i64>, Fault> {
        Ok(self.lock()?.pop_back())
    }

    pub fn peek(&self) -> Result<Option<i64>, Fault> {
        Ok(self.lock()?.back().copied())
    }
}

impl Default for NonLinearizableQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl ConcurrentObject for NonLinearizableQueue {
    fn instantiate() -> Result<Self, Fault> {
        Ok(Self::new())
    }

    fn methods() -> Vec<MethodDef<Self>> {
        vec![
            MethodDef::new("offer", 1, Insert, |queue: &Self, argument| {
                queue.offer(int_argument(argument)?).map(Value::from)
            }),
            MethodDef::new("poll", 0, Remove, |queue: &Self, _| {
                queue.poll().map(Value::from)
            }),
            MethodDef::new("peek", 0, Read, |queue: &Self, _| {
                queue.peek().map(Value::from)
            }),
        ]
    }
}
