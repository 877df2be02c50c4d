//! A sequential specification of a double-ended queue.
use std::collections::VecDeque;
use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;

use crate::specifications::{agrees, Specification};

/// An end of a double-ended queue.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum End {
    First,
    Last,
}

/// An operation for a double-ended queue.
///
/// The last field of each variant is the result returned by the deque, or
/// `None` if it is not-yet-known.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DequeOperation<T> {
    /// Insert a value at one end, returning whether it was accepted.
    Offer(End, T, Option<bool>),
    /// Remove and return the value at one end, if any.
    Poll(End, Option<Option<T>>),
    /// Return the value at one end, if any.
    Peek(End, Option<Option<T>>),
    /// Return the number of values in the deque.
    Size(Option<usize>),
    /// Return whether the deque contains no values.
    IsEmpty(Option<bool>),
}

use DequeOperation::*;

/// A sequential specification of an unbounded double-ended queue.
pub struct DequeSpecification<T> {
    data_type: PhantomData<T>,
}

impl<T> DequeSpecification<T> {
    pub fn new() -> Self {
        Self {
            data_type: PhantomData,
        }
    }
}

impl<T> Default for DequeSpecification<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Debug + Eq + Hash> Specification for DequeSpecification<T> {
    type State = VecDeque<T>;
    type Operation = DequeOperation<T>;

    fn init(&self) -> Self::State {
        VecDeque::new()
    }

    fn apply(&self, operation: &Self::Operation, state: &Self::State) -> (bool, Self::State) {
        match operation {
            Offer(_, _, Some(false)) => (true, state.clone()),
            Offer(end, value, _) => {
                let mut new_state = state.clone();
                match end {
                    End::First => new_state.push_front(value.clone()),
                    End::Last => new_state.push_back(value.clone()),
                }
                (true, new_state)
            }
            Poll(end, result) => {
                let mut new_state = state.clone();
                let value = match end {
                    End::First => new_state.pop_front(),
                    End::Last => new_state.pop_back(),
                };
                if agrees(result, &value) {
                    (true, new_state)
                } else {
                    (false, state.clone())
                }
            }
            Peek(end, result) => {
                let value = match end {
                    End::First => state.front(),
                    End::Last => state.back(),
                };
                (agrees(result, &value.cloned()), state.clone())
            }
            Size(result) => (agrees(result, &state.len()), state.clone()),
            IsEmpty(result) => (agrees(result, &state.is_empty()), state.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Spec = DequeSpecification<u32>;

    fn deque_of(values: &[u32]) -> VecDeque<u32> {
        values.iter().copied().collect()
    }

    mod apply {
        use super::*;

        #[test]
        fn offers_insert_at_requested_end() {
            let spec = Spec::new();
            let (_, state) = spec.apply(&Offer(End::First, 1, Some(true)), &deque_of(&[2]));
            let (_, state) = spec.apply(&Offer(End::Last, 3, None), &state);
            assert_eq!(state, deque_of(&[1, 2, 3]));
        }

        #[test]
        fn polls_remove_from_requested_end() {
            let spec = Spec::new();
            let state = deque_of(&[1, 2, 3]);
            let (is_valid, state) = spec.apply(&Poll(End::Last, Some(Some(3))), &state);
            assert!(is_valid);
            let (is_valid, state) = spec.apply(&Poll(End::First, Some(Some(1))), &state);
            assert!(is_valid);
            assert_eq!(state, deque_of(&[2]));
        }

        #[test]
        fn poll_from_wrong_end_is_not_valid() {
            let spec = Spec::new();
            let state = deque_of(&[1, 2, 3]);
            let (is_valid, new_state) = spec.apply(&Poll(End::First, Some(Some(3))), &state);
            assert!(!is_valid);
            assert_eq!(new_state, state);
        }

        #[test]
        fn peeks_do_not_affect_state() {
            let spec = Spec::new();
            let state = deque_of(&[1, 2]);
            let (is_valid, new_state) = spec.apply(&Peek(End::Last, Some(Some(2))), &state);
            assert!(is_valid);
            assert_eq!(new_state, state);
        }

        #[test]
        fn poll_of_empty_deque_returns_nothing() {
            let spec = Spec::new();
            let (is_valid, _) = spec.apply(&Poll(End::Last, Some(None)), &spec.init());
            assert!(is_valid);
        }
    }
}
