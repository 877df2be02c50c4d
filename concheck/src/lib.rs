//! Checking the linearizability of concurrent objects under real multi-threaded execution.
//!
//! A run executes operations on a single shared object from many threads,
//! records when each operation was invoked and when it responded, and then
//! searches for a sequential order of the operations that respects both real
//! time and the sequential behavior of the object's type.
//!
//! # Examples
//!
//! ```
//! use concheck::verify_named;
//! use concheck::workload::WorkloadPattern;
//!
//! let result = verify_named("BrokenQueue")
//!     .with_threads(4)
//!     .with_operations(100)
//!     .with_workload(WorkloadPattern::with_seed(100, 4, 1))
//!     .run()
//!     .unwrap();
//! assert!(!result.is_linearizable());
//! ```
pub mod catalog;
pub mod error;
pub mod handle;
pub mod harness;
pub mod history;
pub mod object_type;
pub mod objects;
pub mod operation;
pub mod recorder;
pub(crate) mod sync;
pub mod verification;
pub mod workload;

pub use error::{Error, Phase};
pub use object_type::ObjectType;
pub use recorder::Snapshot;
pub use verification::{verify, verify_named, Verification, VerificationResult};
