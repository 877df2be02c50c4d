//! A history of operations performed on a shared object.
//!
//! Entries are kept in an arena and threaded together as a doubly-linked
//! list. Removing ("lifting") an operation unlinks its call and response
//! entries but leaves their own links intact, so that the operation can be
//! re-introduced ("unlifted") in constant time, provided that lifts are
//! undone in the reverse order in which they happened.
use std::ops::Index;

/// An identifier for a process (or thread).
pub type ProcessId = usize;

/// An identifier for an operation in a history.
///
/// Operations are numbered `0..num_operations()` in the order they were called.
pub type OperationId = usize;

/// An action performed by a process on a shared object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action<T> {
    /// The invocation of an operation.
    Call(T),
    /// The response of an operation.
    Response(T),
    /// The response of an operation that failed part way through. It may or
    /// may not have taken effect before it responded.
    Fault(T),
}

/// The entry for the invocation of an operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallEntry<T> {
    pub id: OperationId,
    pub operation: T,
    /// Index of the matching response entry.
    pub response: usize,
    /// Whether the operation never received a response. The response entry
    /// of a pending operation is synthetic, and placed at the end of the history.
    pub pending: bool,
}

/// The entry for the response of an operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResponseEntry<T> {
    pub id: OperationId,
    pub operation: T,
    /// Whether the operation faulted, in which case it may be linearized
    /// without changing the state of the object.
    pub faulted: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Entry<T> {
    Call(CallEntry<T>),
    Response(ResponseEntry<T>),
}

impl<T> Entry<T> {
    pub fn id(&self) -> OperationId {
        match self {
            Entry::Call(call) => call.id,
            Entry::Response(response) => response.id,
        }
    }

    pub fn is_call(&self) -> bool {
        matches!(self, Entry::Call(_))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Link {
    prev: Option<usize>,
    next: Option<usize>,
}

/// A history of operations.
///
/// A history is built from a sequence of [`Action`]s, each performed by some
/// process. A process may have at most one operation outstanding at a time.
/// Calls that never receive a response are _pending_: they may or may not
/// have taken effect. Calls that respond with an [`Action::Fault`] may also
/// have taken effect or not, but only before their response.
///
/// # Examples
///
/// ```
/// use concheck_utils::{Action::{Call, Response}, History};
///
/// let history = History::from_actions(vec![
///     (0, Call("enq")),
///     (1, Call("deq")),
///     (0, Response("enq")),
/// ]);
/// assert_eq!(history.num_operations(), 2);
/// assert_eq!(history.num_pending(), 1);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct History<T> {
    entries: Vec<Entry<T>>,
    links: Vec<Link>,
    head: Option<usize>,
    num_operations: usize,
    num_pending: usize,
}

impl<T: Clone> History<T> {
    /// Creates a history from a sequence of actions, in the order in which they occurred.
    ///
    /// # Panics
    ///
    /// Panics if a process calls an operation while another of its operations is
    /// outstanding, or if a process responds without an outstanding call.
    pub fn from_actions(actions: Vec<(ProcessId, Action<T>)>) -> Self {
        let mut entries: Vec<Entry<T>> = Vec::with_capacity(actions.len());
        // Index of the outstanding call entry of each process.
        let mut outstanding: Vec<Option<usize>> = Vec::new();
        let mut num_operations = 0;

        for (process, action) in actions {
            if process >= outstanding.len() {
                outstanding.resize(process + 1, None);
            }
            let (operation, faulted) = match action {
                Action::Call(operation) => {
                    if outstanding[process].is_some() {
                        panic!("Process {process} called an operation before its previous one responded");
                    }
                    outstanding[process] = Some(entries.len());
                    entries.push(Entry::Call(CallEntry {
                        id: num_operations,
                        operation,
                        response: usize::MAX,
                        pending: false,
                    }));
                    num_operations += 1;
                    continue;
                }
                Action::Response(operation) => (operation, false),
                Action::Fault(operation) => (operation, true),
            };
            let call_index = match outstanding[process].take() {
                Some(index) => index,
                None => panic!("Process {process} responded without an outstanding call"),
            };
            let response_index = entries.len();
            let Entry::Call(call) = &mut entries[call_index] else {
                panic!("Outstanding entry of process {process} is not a call");
            };
            call.response = response_index;
            let id = call.id;
            entries.push(Entry::Response(ResponseEntry {
                id,
                operation,
                faulted,
            }));
        }

        // Pending operations respond, with unknown results, after everything else.
        let mut num_pending = 0;
        for call_index in outstanding.into_iter().flatten() {
            let response_index = entries.len();
            let Entry::Call(call) = &mut entries[call_index] else {
                unreachable!("outstanding entries are calls");
            };
            call.response = response_index;
            call.pending = true;
            let response = ResponseEntry {
                id: call.id,
                operation: call.operation.clone(),
                faulted: false,
            };
            entries.push(Entry::Response(response));
            num_pending += 1;
        }

        let len = entries.len();
        let links = (0..len)
            .map(|i| Link {
                prev: i.checked_sub(1),
                next: if i + 1 < len { Some(i + 1) } else { None },
            })
            .collect();

        Self {
            entries,
            links,
            head: if len > 0 { Some(0) } else { None },
            num_operations,
            num_pending,
        }
    }
}

impl<T> History<T> {
    /// Returns the index of the first entry remaining in the history.
    pub fn first(&self) -> Option<usize> {
        self.head
    }

    /// Returns the index of the entry following the one at `index`.
    ///
    /// For an entry that has been lifted, this is the entry that followed it
    /// at the time it was lifted.
    pub fn next(&self, index: usize) -> Option<usize> {
        self.links[index].next
    }

    /// Returns whether every entry has been lifted from the history.
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Returns the total number of entries, including lifted ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn num_operations(&self) -> usize {
        self.num_operations
    }

    pub fn num_pending(&self) -> usize {
        self.num_pending
    }

    /// Returns the entries remaining in the history, in order.
    pub fn iter(&self) -> impl Iterator<Item = &Entry<T>> {
        std::iter::successors(self.head, |&i| self.links[i].next).map(|i| &self.entries[i])
    }

    /// Removes the call entry at `index`, and its response entry, from the history.
    ///
    /// # Panics
    ///
    /// Panics if the entry at `index` is not a call.
    pub fn lift(&mut self, index: usize) {
        let response = self.response_of(index);
        self.unlink(index);
        self.unlink(response);
    }

    /// Re-introduces the call entry at `index`, and its response entry, into the history.
    ///
    /// Must be applied in the reverse order of calls to [`lift`](Self::lift).
    ///
    /// # Panics
    ///
    /// Panics if the entry at `index` is not a call.
    pub fn unlift(&mut self, index: usize) {
        let response = self.response_of(index);
        self.relink(response);
        self.relink(index);
    }

    fn response_of(&self, index: usize) -> usize {
        match &self.entries[index] {
            Entry::Call(call) => call.response,
            Entry::Response(_) => panic!("Entry {index} is a response, not a call"),
        }
    }

    fn unlink(&mut self, index: usize) {
        let Link { prev, next } = self.links[index];
        match prev {
            Some(prev) => self.links[prev].next = next,
            None => self.head = next,
        }
        if let Some(next) = next {
            self.links[next].prev = prev;
        }
    }

    fn relink(&mut self, index: usize) {
        let Link { prev, next } = self.links[index];
        match prev {
            Some(prev) => self.links[prev].next = Some(index),
            None => self.head = Some(index),
        }
        if let Some(next) = next {
            self.links[next].prev = Some(index);
        }
    }
}

impl<T> Index<usize> for History<T> {
    type Output = Entry<T>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.entries[index]
    }
}
