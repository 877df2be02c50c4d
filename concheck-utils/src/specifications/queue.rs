//! A sequential specification of a first-in-first-out queue.
use std::collections::VecDeque;
use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;

use crate::specifications::{agrees, Specification};

/// An operation for a queue.
///
/// The last field of each variant is the result returned by the queue, or
/// `None` if it is not-yet-known.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum QueueOperation<T> {
    /// Append a value to the tail of the queue, returning whether it was accepted.
    ///
    /// A rejected offer leaves the queue unchanged, as a bounded queue would.
    Offer(T, Option<bool>),
    /// Remove and return the value at the head of the queue, if any.
    Poll(Option<Option<T>>),
    /// Return the value at the head of the queue, if any.
    Peek(Option<Option<T>>),
    /// Return the number of values in the queue.
    Size(Option<usize>),
    /// Return whether the queue contains no values.
    IsEmpty(Option<bool>),
}

use QueueOperation::*;

/// A sequential specification of an unbounded FIFO queue.
pub struct QueueSpecification<T> {
    data_type: PhantomData<T>,
}

impl<T> QueueSpecification<T> {
    pub fn new() -> Self {
        Self {
            data_type: PhantomData,
        }
    }
}

impl<T> Default for QueueSpecification<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Debug + Eq + Hash> Specification for QueueSpecification<T> {
    type State = VecDeque<T>;
    type Operation = QueueOperation<T>;

    fn init(&self) -> Self::State {
        VecDeque::new()
    }

    fn apply(&self, operation: &Self::Operation, state: &Self::State) -> (bool, Self::State) {
        match operation {
            Offer(value, accepted) => match accepted {
                Some(false) => (true, state.clone()),
                _ => {
                    let mut new_state = state.clone();
                    new_state.push_back(value.clone());
                    (true, new_state)
                }
            },
            Poll(result) => {
                let mut new_state = state.clone();
                let head = new_state.pop_front();
                if agrees(result, &head) {
                    (true, new_state)
                } else {
                    (false, state.clone())
                }
            }
            Peek(result) => (agrees(result, &state.front().cloned()), state.clone()),
            Size(result) => (agrees(result, &state.len()), state.clone()),
            IsEmpty(result) => (agrees(result, &state.is_empty()), state.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Spec = QueueSpecification<u32>;

    fn queue_of(values: &[u32]) -> VecDeque<u32> {
        values.iter().copied().collect()
    }

    mod init {
        use super::*;

        #[test]
        fn starts_empty() {
            assert!(Spec::new().init().is_empty());
        }
    }

    mod apply {
        use super::*;

        #[test]
        fn offer_appends_to_tail() {
            let spec = Spec::new();
            let (is_valid, new_state) = spec.apply(&Offer(3, Some(true)), &queue_of(&[1, 2]));
            assert!(is_valid);
            assert_eq!(new_state, queue_of(&[1, 2, 3]));
        }

        #[test]
        fn rejected_offer_leaves_queue_unchanged() {
            let spec = Spec::new();
            let (is_valid, new_state) = spec.apply(&Offer(3, Some(false)), &queue_of(&[1]));
            assert!(is_valid);
            assert_eq!(new_state, queue_of(&[1]));
        }

        #[test]
        fn poll_is_valid_if_value_is_head() {
            let spec = Spec::new();
            let (is_valid, new_state) = spec.apply(&Poll(Some(Some(1))), &queue_of(&[1, 2]));
            assert!(is_valid);
            assert_eq!(new_state, queue_of(&[2]));
        }

        #[test]
        fn poll_is_not_valid_if_value_is_not_head() {
            let spec = Spec::new();
            let (is_valid, new_state) = spec.apply(&Poll(Some(Some(2))), &queue_of(&[1, 2]));
            assert!(!is_valid);
            assert_eq!(new_state, queue_of(&[1, 2]));
        }

        #[test]
        fn poll_of_empty_queue_returns_nothing() {
            let spec = Spec::new();
            let (is_valid, _) = spec.apply(&Poll(Some(None)), &spec.init());
            assert!(is_valid);
            let (is_valid, _) = spec.apply(&Poll(Some(Some(1))), &spec.init());
            assert!(!is_valid);
        }

        #[test]
        fn poll_with_unknown_result_removes_head() {
            let spec = Spec::new();
            let (is_valid, new_state) = spec.apply(&Poll(None), &queue_of(&[1, 2]));
            assert!(is_valid);
            assert_eq!(new_state, queue_of(&[2]));
        }

        #[test]
        fn queries_do_not_affect_state() {
            let spec = Spec::new();
            let state = queue_of(&[4, 5]);
            for operation in [Peek(Some(Some(4))), Size(Some(2)), IsEmpty(Some(false))] {
                let (is_valid, new_state) = spec.apply(&operation, &state);
                assert!(is_valid, "{operation:?} should be valid");
                assert_eq!(new_state, state);
            }
        }

        #[test]
        fn size_is_not_valid_if_it_differs_from_length() {
            let spec = Spec::new();
            let (is_valid, _) = spec.apply(&Size(Some(3)), &queue_of(&[1]));
            assert!(!is_valid);
        }
    }
}
