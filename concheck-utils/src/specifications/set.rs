//! A sequential specification of a set.
use std::collections::BTreeSet;
use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;

use crate::specifications::{agrees, Specification};

/// An operation for a set.
///
/// The last field of each variant is the result returned by the set, or
/// `None` if it is not-yet-known.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SetOperation<T> {
    /// Add a value, returning whether it was absent.
    Add(T, Option<bool>),
    /// Remove a value, returning whether it was present.
    Remove(T, Option<bool>),
    /// Return whether a value is present.
    Contains(T, Option<bool>),
    /// Return the number of values in the set.
    Size(Option<usize>),
    /// Return whether the set contains no values.
    IsEmpty(Option<bool>),
}

use SetOperation::*;

/// A sequential specification of a set, in which adds and removes are idempotent.
pub struct SetSpecification<T> {
    data_type: PhantomData<T>,
}

impl<T> SetSpecification<T> {
    pub fn new() -> Self {
        Self {
            data_type: PhantomData,
        }
    }
}

impl<T> Default for SetSpecification<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Debug + Ord + Hash> Specification for SetSpecification<T> {
    type State = BTreeSet<T>;
    type Operation = SetOperation<T>;

    fn init(&self) -> Self::State {
        BTreeSet::new()
    }

    fn apply(&self, operation: &Self::Operation, state: &Self::State) -> (bool, Self::State) {
        match operation {
            Add(value, result) => {
                let mut new_state = state.clone();
                let added = new_state.insert(value.clone());
                if agrees(result, &added) {
                    (true, new_state)
                } else {
                    (false, state.clone())
                }
            }
            Remove(value, result) => {
                let mut new_state = state.clone();
                let removed = new_state.remove(value);
                if agrees(result, &removed) {
                    (true, new_state)
                } else {
                    (false, state.clone())
                }
            }
            Contains(value, result) => (agrees(result, &state.contains(value)), state.clone()),
            Size(result) => (agrees(result, &state.len()), state.clone()),
            IsEmpty(result) => (agrees(result, &state.is_empty()), state.clone()),
        }
    }
}
