//! Specifying the behavior of shared objects.
//!
//! Operations carry the value their object returned, when it is known. An
//! unknown result (for example, the result of an operation that never
//! responded) is represented by `None` and is always valid, while the state
//! of the object still changes as the operation dictates.
use std::fmt::Debug;
use std::hash::Hash;

pub mod deque;
pub mod map;
pub mod queue;
pub mod set;

/// A specification of a shared object.
///
/// This trait defines how operations performed on the object affect its state.
///
/// # Examples
///
/// For an example, see [`QueueSpecification`](queue::QueueSpecification).
pub trait Specification {
    type State: Clone + Eq + Hash + Debug;
    type Operation: Clone + Debug;

    /// Returns an initial state for the object.
    fn init(&self) -> Self::State;

    /// Returns whether applying an operation to a given state is valid, and
    /// the new state that occurs after the operation has been applied.
    ///
    /// If the operation is not valid, then the state of the object should not change.
    fn apply(&self, op: &Self::Operation, state: &Self::State) -> (bool, Self::State);
}

/// Returns whether a recorded result agrees with the expected one.
///
/// Unknown results agree with everything.
pub(crate) fn agrees<R: PartialEq>(recorded: &Option<R>, expected: &R) -> bool {
    recorded.as_ref().map_or(true, |recorded| recorded == expected)
}
