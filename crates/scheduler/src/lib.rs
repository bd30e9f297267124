//! Preemptive, priority-driven job scheduler over a fixed pool of
//! heterogeneous cores.
//!
//! [`SchedulerState`] holds the core pool, the waiting queue and the
//! completed history; the `engine` module implements every transition on it.
//! [`Scheduler`] wraps the state in one lock, serializes operator requests
//! against the periodic clock actor, and hands out consistent snapshots.

pub mod engine;
pub mod error;
pub mod generator;
pub mod metrics;
pub mod pool;
pub mod queue;
pub mod runner;
pub mod state;
pub mod status;

pub use engine::{Admission, DispatchReport, Dispatched, Placement, TickReport};
pub use error::SchedulerError;
pub use generator::{JobGenerator, RandomJobGenerator};
pub use metrics::SchedulerMetrics;
pub use pool::{Assignment, CorePool};
pub use queue::WaitingQueue;
pub use runner::{Scheduler, Submitted};
pub use state::{CompletedJob, Completion, SchedulerState, SharedSchedulerState};
pub use status::{ClassAvailability, JobStatus, StatusSnapshot};
