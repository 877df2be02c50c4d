//! Errors raised while verifying an implementation.
use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// A phase of a verification run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Worker threads are executing operations on the object under test.
    Execution,
    /// The recorded history is being checked for linearizability.
    Verification,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Execution => write!(f, "execution"),
            Phase::Verification => write!(f, "verification"),
        }
    }
}

/// Errors that abort a verification run.
///
/// Faults raised by the object under test are not errors: they are recorded
/// as the responses of the operations that raised them.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The run was configured incorrectly, and nothing was executed.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The run did not finish within its timeout.
    #[error("{phase} phase timed out after {elapsed:?}")]
    Timeout { phase: Phase, elapsed: Duration },

    /// More events occurred than the recorder could hold.
    #[error("recording overflow: more than {capacity} events")]
    RecordingOverflow { capacity: usize },

    /// The checker explored too many states to reach a verdict.
    #[error("verification inconclusive after exploring {explored} states")]
    Inconclusive { explored: usize },
}

impl Error {
    /// Returns the phase that was active when the error occurred, if any.
    pub fn phase(&self) -> Option<Phase> {
        match self {
            Error::Configuration(_) => None,
            Error::Timeout { phase, .. } => Some(*phase),
            Error::RecordingOverflow { .. } => Some(Phase::Execution),
            Error::Inconclusive { .. } => Some(Phase::Verification),
        }
    }
}
