//! Checking [linearizability](https://en.wikipedia.org/wiki/Linearizability) of a
//! history of operations applied to a shared object.
//!
//! For more information, see the documentation of the [`WGLChecker`] and [`History`] structs.
use std::collections::{HashMap, HashSet};
use std::time::Instant;

use thiserror::Error;

use crate::linearizability::history::{Entry, History, OperationId};
use crate::specifications::Specification;

pub mod history;

/// The number of search steps between checks of the deadline.
const DEADLINE_CHECK_INTERVAL: usize = 1024;

/// The default bound on the number of states explored by a single check.
pub const DEFAULT_MAX_STATES: usize = 1_000_000;

/// Reasons why the checker could not reach a verdict.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CheckError {
    /// The search visited more states than it was allowed to.
    #[error("search was abandoned after exploring {explored} states")]
    Inconclusive { explored: usize },
    /// The search did not finish before its deadline.
    #[error("search passed its deadline after exploring {explored} states")]
    DeadlineExceeded { explored: usize },
}

/// A linearizability checker.
///
/// An implementation of the algorithm originally defined by Jeannette Wing and Chun Gong
/// [\[WG93\]](https://www.cs.cmu.edu/~wing/publications/WingGong93.pdf), and
/// extended by Gavin Lowe [\[L17\]](http://www.cs.ox.ac.uk/people/gavin.lowe/LinearizabiltyTesting/).
/// This particular implementation is based on the description given by Alex Horn
/// and Daniel Kroenig [\[HK15\]](https://arxiv.org/abs/1504.00204).
///
/// Given a history of operations, the algorithm works by linearizing each operation
/// as soon as possible. When an operation cannot be linearized, it backtracks and
/// proceeds with the next operation. Memoization occurs by caching each partial
/// linearization, and preventing the algorithm from continuing its search when it
/// is already known that the state of the object and remaining operations have no
/// valid linearization.
///
/// Operations that are still pending at the end of the history may be linearized
/// anywhere after they were called, or left out entirely. Operations that
/// faulted must be linearized between their call and their response, but may
/// leave the state of the object unchanged.
///
/// # Examples
///
/// ```
/// use concheck_utils::specifications::queue::{QueueOperation::*, QueueSpecification};
/// use concheck_utils::{Action::{Call, Response}, History, WGLChecker};
///
/// let checker = WGLChecker::new(QueueSpecification::<u32>::new());
///
/// // Concurrent offers may be linearized in either order.
/// // P0 |--------|         Offer(1)
/// // P1  |--------|        Offer(2)
/// // P2            |---|   Poll -> 2
/// let history = History::from_actions(vec![
///     (0, Call(Offer(1, None))),
///     (1, Call(Offer(2, None))),
///     (0, Response(Offer(1, Some(true)))),
///     (1, Response(Offer(2, Some(true)))),
///     (2, Call(Poll(None))),
///     (2, Response(Poll(Some(Some(2))))),
/// ]);
/// assert_eq!(checker.check(history), Ok(true));
///
/// // But a poll cannot return a value before it was offered.
/// // P0 |---|              Poll -> 1
/// // P1       |---|        Offer(1)
/// let history = History::from_actions(vec![
///     (0, Call(Poll(None))),
///     (0, Response(Poll(Some(Some(1))))),
///     (1, Call(Offer(1, None))),
///     (1, Response(Offer(1, Some(true)))),
/// ]);
/// assert_eq!(checker.check(history), Ok(false));
/// ```
///
/// # Implementations in Other Languages
///
/// For an implementation in C++, see [`linearizability-checker`](https://github.com/ahorn/linearizability-checker).
/// For an implementation in Go, see [`porcupine`](https://github.com/anishathalye/porcupine).
pub struct WGLChecker<S: Specification> {
    spec: S,
    max_states: usize,
    deadline: Option<Instant>,
}

impl<S: Specification> WGLChecker<S> {
    pub fn new(spec: S) -> Self {
        Self {
            spec,
            max_states: DEFAULT_MAX_STATES,
            deadline: None,
        }
    }

    /// Bounds the number of distinct states the search may explore.
    pub fn with_max_states(mut self, max_states: usize) -> Self {
        self.max_states = max_states;
        self
    }

    /// Abandons the search if it is still running at `deadline`.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Returns whether the history of operations is linearizable with respect to the specification.
    pub fn check(&self, mut history: History<S::Operation>) -> Result<bool, CheckError> {
        let mut state = self.spec.init();
        let mut linearized = Linearized::new(history.num_operations());
        let mut remaining = history.num_operations() - history.num_pending();
        let mut calls: Vec<Frame<S::State>> = Vec::new();
        let mut states: StateArena<S::State> = StateArena::default();
        let mut cache: HashSet<(Linearized, usize)> = HashSet::new();
        let mut steps: usize = 0;
        let mut curr = history.first();
        loop {
            if remaining == 0 {
                return Ok(true);
            }
            steps += 1;
            if steps % DEADLINE_CHECK_INTERVAL == 0 {
                if let Some(deadline) = self.deadline {
                    if Instant::now() >= deadline {
                        return Err(CheckError::DeadlineExceeded {
                            explored: cache.len(),
                        });
                    }
                }
            }

            let call = curr.and_then(|index| match &history[index] {
                Entry::Call(call) => Some((index, call.id, call.pending)),
                Entry::Response(_) => None,
            });
            match call {
                Some((index, id, pending)) => {
                    let outcome = self.linearize(
                        &history,
                        index,
                        0,
                        &state,
                        &linearized,
                        &mut states,
                        &mut cache,
                    );
                    match outcome {
                        Some((outcome, new_state)) => {
                            self.bound(&cache)?;
                            linearized.insert(id);
                            if !pending {
                                remaining -= 1;
                            }
                            history.lift(index);
                            let previous = std::mem::replace(&mut state, new_state);
                            calls.push(Frame {
                                index,
                                state: previous,
                                outcome,
                            });
                            curr = history.first();
                        }
                        None => curr = history.next(index),
                    }
                }
                // Reaching a response (or the end of the history) means some
                // operation was not linearized before it had to be.
                None => match calls.pop() {
                    None => return Ok(false),
                    Some(frame) => {
                        state = frame.state;
                        let Entry::Call(call) = &history[frame.index] else {
                            panic!("Linearized entry {} is not a call", frame.index);
                        };
                        let (id, pending) = (call.id, call.pending);
                        linearized.remove(id);
                        // A faulted operation is retried without its effect
                        // before it is put back into the history.
                        let retry = self.linearize(
                            &history,
                            frame.index,
                            frame.outcome + 1,
                            &state,
                            &linearized,
                            &mut states,
                            &mut cache,
                        );
                        match retry {
                            Some((outcome, new_state)) => {
                                self.bound(&cache)?;
                                linearized.insert(id);
                                let previous = std::mem::replace(&mut state, new_state);
                                calls.push(Frame {
                                    index: frame.index,
                                    state: previous,
                                    outcome,
                                });
                                curr = history.first();
                            }
                            None => {
                                history.unlift(frame.index);
                                if !pending {
                                    remaining += 1;
                                }
                                curr = history.next(frame.index);
                            }
                        }
                    }
                },
            }
        }
    }

    /// Tries to linearize the call at `index`, starting from its `first`
    /// possible outcome. Every operation can take effect, and faulted ones can
    /// also leave the state unchanged.
    ///
    /// Returns the outcome and the resulting state, if the operation is valid
    /// and leads to a combination of linearized operations and state that has
    /// not been seen before.
    #[allow(clippy::too_many_arguments)]
    fn linearize(
        &self,
        history: &History<S::Operation>,
        index: usize,
        first: usize,
        state: &S::State,
        linearized: &Linearized,
        states: &mut StateArena<S::State>,
        cache: &mut HashSet<(Linearized, usize)>,
    ) -> Option<(usize, S::State)> {
        let Entry::Call(call) = &history[index] else {
            panic!("Entry {index} is not a call");
        };
        let Entry::Response(response) = &history[call.response] else {
            panic!("Response cannot be a call entry");
        };
        let outcomes = if response.faulted { 2 } else { 1 };
        (first..outcomes).find_map(|outcome| {
            let (is_valid, new_state) = match outcome {
                0 => self.spec.apply(&response.operation, state),
                _ => (true, state.clone()),
            };
            if !is_valid {
                return None;
            }
            let mut tmp_linearized = linearized.clone();
            tmp_linearized.insert(call.id);
            cache
                .insert((tmp_linearized, states.intern(&new_state)))
                .then_some((outcome, new_state))
        })
    }

    fn bound(&self, cache: &HashSet<(Linearized, usize)>) -> Result<(), CheckError> {
        if cache.len() > self.max_states {
            return Err(CheckError::Inconclusive {
                explored: cache.len(),
            });
        }
        Ok(())
    }
}

/// A linearized call, and the state of the object before it.
struct Frame<T> {
    index: usize,
    state: T,
    /// Which of the call's possible outcomes was chosen.
    outcome: usize,
}

/// The set of operations linearized so far.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct Linearized {
    words: Vec<u64>,
}

impl Linearized {
    fn new(num_operations: usize) -> Self {
        Self {
            words: vec![0; num_operations.div_ceil(64)],
        }
    }

    fn insert(&mut self, id: OperationId) {
        self.words[id / 64] |= 1 << (id % 64);
    }

    fn remove(&mut self, id: OperationId) {
        self.words[id / 64] &= !(1 << (id % 64));
    }
}

/// Interned states of the object, so that the cache stores each distinct state once.
struct StateArena<T> {
    states: Vec<T>,
    index: HashMap<T, usize>,
}

impl<T> Default for StateArena<T> {
    fn default() -> Self {
        Self {
            states: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: Clone + Eq + std::hash::Hash> StateArena<T> {
    fn intern(&mut self, state: &T) -> usize {
        if let Some(&id) = self.index.get(state) {
            return id;
        }
        let id = self.states.len();
        self.states.push(state.clone());
        self.index.insert(state.clone(), id);
        id
    }
}
