//! Thread-safe scheduler facade and its clock actor.
//!
//! Split into focused submodules:
//! - `core`: Scheduler struct, constructors, and accessor methods
//! - `operations`: submit, terminate, tick and status, each one atomic transition
//! - `execution`: the periodic clock task and shutdown

mod core;
mod execution;
mod operations;

pub use self::core::Scheduler;
pub use self::operations::Submitted;
