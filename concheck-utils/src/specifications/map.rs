//! A sequential specification of a key-value map.
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;

use crate::specifications::{agrees, Specification};

/// An operation for a map.
///
/// The last field of each variant is the result returned by the map, or
/// `None` if it is not-yet-known.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MapOperation<K, V> {
    /// Associate a value with a key, returning the value it replaced, if any.
    Put(K, V, Option<Option<V>>),
    /// Return the value associated with a key, if any.
    Get(K, Option<Option<V>>),
    /// Remove a key, returning the value that was associated with it, if any.
    Remove(K, Option<Option<V>>),
    /// Return whether a key has a value associated with it.
    ContainsKey(K, Option<bool>),
    /// Return the number of keys in the map.
    Size(Option<usize>),
    /// Return whether the map contains no keys.
    IsEmpty(Option<bool>),
}

use MapOperation::*;

/// A sequential specification of a map in which puts overwrite.
pub struct MapSpecification<K, V> {
    data_type: PhantomData<(K, V)>,
}

impl<K, V> MapSpecification<K, V> {
    pub fn new() -> Self {
        Self {
            data_type: PhantomData,
        }
    }
}

impl<K, V> Default for MapSpecification<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Specification for MapSpecification<K, V>
where
    K: Clone + Debug + Ord + Hash,
    V: Clone + Debug + Eq + Hash,
{
    type State = BTreeMap<K, V>;
    type Operation = MapOperation<K, V>;

    fn init(&self) -> Self::State {
        BTreeMap::new()
    }

    fn apply(&self, operation: &Self::Operation, state: &Self::State) -> (bool, Self::State) {
        match operation {
            Put(key, value, result) => {
                let mut new_state = state.clone();
                let previous = new_state.insert(key.clone(), value.clone());
                if agrees(result, &previous) {
                    (true, new_state)
                } else {
                    (false, state.clone())
                }
            }
            Remove(key, result) => {
                let mut new_state = state.clone();
                let previous = new_state.remove(key);
                if agrees(result, &previous) {
                    (true, new_state)
                } else {
                    (false, state.clone())
                }
            }
            Get(key, result) => (agrees(result, &state.get(key).cloned()), state.clone()),
            ContainsKey(key, result) => (agrees(result, &state.contains_key(key)), state.clone()),
            Size(result) => (agrees(result, &state.len()), state.clone()),
            IsEmpty(result) => (agrees(result, &state.is_empty()), state.clone()),
        }
    }
}
