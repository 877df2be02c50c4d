//! Collections made linearizable by a single [`Mutex`].
use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::handle::{ConcurrentObject, MethodDef};
use crate::operation::{Fault, MethodKind::*, Value};
use crate::sync::{Mutex, MutexGuard};

use super::{int_argument, pair_argument, poisoned};

/// A first-in-first-out queue, backed by a [`Mutex`].
///
/// This object is **not** lock-free.
///
/// # Examples
///
/// ```
/// use concheck::objects::MutexQueue;
///
/// let queue = MutexQueue::new();
/// queue.offer(1).unwrap();
/// queue.offer(2).unwrap();
/// assert_eq!(queue.poll(), Ok(Some(1)));
/// assert_eq!(queue.size(), Ok(1));
/// ```
pub struct MutexQueue {
    queue: Mutex<VecDeque<i64>>,
}

impl MutexQueue {
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, VecDeque<i64>>, Fault> {
        self.queue.lock().map_err(poisoned)
    }

    pub fn offer(&self, value: i64) -> Result<bool, Fault> {
        self.lock()?.push_back(value);
        Ok(true)
    }

    pub fn poll(&self) -> Result<Option<i64>, Fault> {
        Ok(self.lock()?.pop_front())
    }

    pub fn peek(&self) -> Result<Option<i64>, Fault> {
        Ok(self.lock()?.front().copied())
    }

    pub fn size(&self) -> Result<usize, Fault> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, Fault> {
        Ok(self.lock()?.is_empty())
    }
}

impl Default for MutexQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl ConcurrentObject for MutexQueue {
    fn instantiate() -> Result<Self, Fault> {
        Ok(Self::new())
    }

    fn methods() -> Vec<MethodDef<Self>> {
        vec![
            MethodDef::new("offer", 1, Insert, |queue: &Self, argument| {
                queue.offer(int_argument(argument)?).map(Value::from)
            }),
            MethodDef::new("add", 1, Insert, |queue: &Self, argument| {
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

/// A double-ended queue, backed by a [`Mutex`].
pub struct MutexDeque {
    deque: Mutex<VecDeque<i64>>,
}

impl MutexDeque {
    pub fn new() -> Self {
        Self {
            deque: Mutex::new(VecDeque::new()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, VecDeque<i64>>, Fault> {
        self.deque.lock().map_err(poisoned)
    }

    pub fn offer_first(&self, value: i64) -> Result<bool, Fault> {
        self.lock()?.push_front(value);
        Ok(true)
    }

    pub fn offer_last(&self, value: i64) -> Result<bool, Fault> {
        self.lock()?.push_back(value);
        Ok(true)
    }

    pub fn poll_first(&self) -> Result<Option<i64>, Fault> {
        Ok(self.lock()?.pop_front())
    }

    pub fn poll_last(&self) -> Result<Option<i64>, Fault> {
        Ok(self.lock()?.pop_back())
    }

    pub fn peek_first(&self) -> Result<Option<i64>, Fault> {
        Ok(self.lock()?.front().copied())
    }

    pub fn peek_last(&self) -> Result<Option<i64>, Fault> {
        Ok(self.lock()?.back().copied())
    }

    pub fn size(&self) -> Result<usize, Fault> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, Fault> {
        Ok(self.lock()?.is_empty())
    }
}

impl Default for MutexDeque {
    fn default() -> Self {
        Self::new()
    }
}

impl ConcurrentObject for MutexDeque {
    fn instantiate() -> Result<Self, Fault> {
        Ok(Self::new())
    }

    fn methods() -> Vec<MethodDef<Self>> {
        vec![
            MethodDef::new("offer_first", 1, Insert, |deque: &Self, argument| {
                deque.offer_first(int_argument(argument)?).map(Value::from)
            }),
            MethodDef::new("offer_last", 1, Insert, |deque: &Self, argument| {
                deque.offer_last(int_argument(argument)?).map(Value::from)
            }),
            MethodDef::new("poll_first", 0, Remove, |deque: &Self, _| {
                deque.poll_first().map(Value::from)
            }),
            MethodDef::new("poll_last", 0, Remove, |deque: &Self, _| {
                deque.poll_last().map(Value::from)
            }),
            MethodDef::new("peek_first", 0, Read, |deque: &Self, _| {
                deque.peek_first().map(Value::from)
            }),
            MethodDef::new("peek_last", 0, Read, |deque: &Self, _| {
                deque.peek_last().map(Value::from)
            }),
            MethodDef::new("size", 0, Read, |deque: &Self, _| {
                deque.size().map(Value::from)
            }),
            MethodDef::new("is_empty", 0, Read, |deque: &Self, _| {
                deque.is_empty().map(Value::from)
            }),
        ]
    }
}

/// A map, backed by a [`Mutex`].
///
/// # Examples
///
/// ```
/// use concheck::objects::MutexMap;
///
/// let map = MutexMap::new();
/// assert_eq!(map.put(1, 10), Ok(None));
/// assert_eq!(map.put(1, 20), Ok(Some(10)));
/// assert_eq!(map.get(1), Ok(Some(20)));
/// ```
pub struct MutexMap {
    map: Mutex<BTreeMap<i64, i64>>,
}

impl MutexMap {
    pub fn new() -> Self {
        Self {
            map: Mutex::new(BTreeMap::new()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<i64, i64>>, Fault> {
        self.map.lock().map_err(poisoned)
    }

    pub fn put(&self, key: i64, value: i64) -> Result<Option<i64>, Fault> {
        Ok(self.lock()?.insert(key, value))
    }

    pub fn get(&self, key: i64) -> Result<Option<i64>, Fault> {
        Ok(self.lock()?.get(&key).copied())
    }

    pub fn remove(&self, key: i64) -> Result<Option<i64>, Fault> {
        Ok(self.lock()?.remove(&key))
    }

    pub fn contains_key(&self, key: i64) -> Result<bool, Fault> {
        Ok(self.lock()?.contains_key(&key))
    }

    pub fn size(&self) -> Result<usize, Fault> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, Fault> {
        Ok(self.lock()?.is_empty())
    }
}

impl Default for MutexMap {
    fn default() -> Self {
        Self::new()
    }
}

impl ConcurrentObject for MutexMap {
    fn instantiate() -> Result<Self, Fault> {
        Ok(Self::new())
    }

    fn methods() -> Vec<MethodDef<Self>> {
        vec![
            MethodDef::new("put", 2, Insert, |map: &Self, argument| {
                let (key, value) = pair_argument(argument)?;
                map.put(key, value).map(Value::from)
            }),
            MethodDef::new("remove", 1, Remove, |map: &Self, argument| {
                map.remove(int_argument(argument)?).map(Value::from)
            }),
            MethodDef::new("get", 1, Read, |map: &Self, argument| {
                map.get(int_argument(argument)?).map(Value::from)
            }),
            MethodDef::new("contains_key", 1, Read, |map: &Self, argument| {
                map.contains_key(int_argument(argument)?).map(Value::from)
            }),
            MethodDef::new("size", 0, Read, |map: &Self, _| map.size().map(Value::from)),
            MethodDef::new("is_empty", 0, Read, |map: &Self, _| {
                map.is_empty().map(Value::from)
            }),
        ]
    }
}

/// A set, backed by a [`Mutex`].
pub struct MutexSet {
    set: Mutex<BTreeSet<i64>>,
}

impl MutexSet {
    pub fn new() -> Self {
        Self {
            set: Mutex::new(BTreeSet::new()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeSet<i64>>, Fault> {
        self.set.lock().map_err(poisoned)
    }

    /// Adds a value, returning whether it was absent.
    pub fn add(&self, value: i64) -> Result<bool, Fault> {
        Ok(self.lock()?.insert(value))
    }

    /// Removes a value, returning whether it was present.
    pub fn remove(&self, value: i64) -> Result<bool, Fault> {
        Ok(self.lock()?.remove(&value))
    }

    pub fn contains(&self, value: i64) -> Result<bool, Fault> {
        Ok(self.lock()?.contains(&value))
    }

    pub fn size(&self) -> Result<usize, Fault> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, Fault> {
        Ok(self.lock()?.is_empty())
    }
}

impl Default for MutexSet {
    fn default() -> Self {
        Self::new()
    }
}

impl ConcurrentObject for MutexSet {
    fn instantiate() -> Result<Self, Fault> {
        Ok(Self::new())
    }

    fn methods() -> Vec<MethodDef<Self>> {
        vec![
            MethodDef::new("add", 1, Insert, |set: &Self, argument| {
                set.add(int_argument(argument)?).map(Value::from)
            }),
            MethodDef::new("remove", 1, Remove, |set: &Self, argument| {
                set.remove(int_argument(argument)?).map(Value::from)
            }),
            MethodDef::new("contains", 1, Read, |set: &Self, argument| {
                set.contains(int_argument(argument)?).map(Value::from)
            }),
            MethodDef::new("size", 0, Read, |set: &Self, _| set.size().map(Value::from)),
            MethodDef::new("is_empty", 0, Read, |set: &Self, _| {
                set.is_empty().map(Value::from)
            }),
        ]
    }
}
