//! Utilities for checking the linearizability of concurrent objects.
pub mod linearizability;
pub mod specifications;

pub use linearizability::history::{Action, History};
pub use linearizability::{CheckError, WGLChecker};

pub use specifications::Specification;
