use coresched_core::CoreError;

/// Error type for scheduler operations.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("Job '{0}' is already waiting or running")]
    DuplicateJob(String),
    #[error("Invalid job: {0}")]
    InvalidJob(String),
    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),
    #[error("Invariant violated: {0}")]
    InvariantViolation(String),
    #[error("Clock is already running")]
    ClockRunning,
    #[error("No async runtime available to drive the clock")]
    NoRuntime,
    #[error(transparent)]
    Core(#[from] CoreError),
}
