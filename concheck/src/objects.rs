//! Reference implementations of concurrent objects.
//!
//! The objects in [`mutex`] serialize every operation behind a lock, and are
//! therefore linearizable. The objects in [`broken`] are not, and exist to
//! show that the checker notices.
use crate::operation::{Argument, Fault};

pub mod broken;
pub mod mutex;

pub use self::broken::{BrokenQueue, NonLinearizableQueue};
pub use self::mutex::{MutexDeque, MutexMap, MutexQueue, MutexSet};

pub(crate) fn int_argument(argument: Option<Argument>) -> Result<i64, Fault> {
    match argument {
        Some(Argument::Int(value)) => Ok(value),
        other => Err(Fault::new(format!("expected an integer, got {other:?}"))),
    }
}

pub(crate) fn pair_argument(argument: Option<Argument>) -> Result<(i64, i64), Fault> {
    match argument {
        Some(Argument::Pair(key, value)) => Ok((key, value)),
        other => Err(Fault::new(format!("expected a key and a value, got {other:?}"))),
    }
}

pub(crate) fn poisoned<T>(_: T) -> Fault {
    Fault::new("lock was poisoned by a panicking operation")
}
