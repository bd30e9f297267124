use std::collections::HashSet;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use coresched_core::{CoreCatalog, CoreClass, Job, JobId};
use serde::Serialize;

use crate::error::SchedulerError;
use crate::pool::CorePool;
use crate::queue::WaitingQueue;

/// How a job left the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Completion {
    /// Ran out of work on a clock tick.
    Finished,
    /// Removed by an operator request.
    Terminated,
}

/// History entry for a job that is no longer scheduled.
#[derive(Debug, Clone, Serialize)]
pub struct CompletedJob {
    pub job: Job,
    /// Class the job was running on when it left.
    pub class: CoreClass,
    pub outcome: Completion,
    /// Tick count at the time of completion.
    pub tick: u64,
}

/// All mutable scheduler state. Every transition in [`crate::engine`]
/// operates on this struct as a whole.
#[derive(Debug)]
pub struct SchedulerState {
    pub(crate) pool: CorePool,
    pub(crate) queue: WaitingQueue,
    /// Append-only.
    pub(crate) completed: Vec<CompletedJob>,
    pub(crate) ticks: u64,
    pub(crate) next_id: u64,
}

impl SchedulerState {
    pub fn new(catalog: Arc<CoreCatalog>) -> Self {
        Self {
            pool: CorePool::new(catalog),
            queue: WaitingQueue::new(),
            completed: Vec::new(),
            ticks: 0,
            next_id: 1,
        }
    }

    pub fn pool(&self) -> &CorePool {
        &self.pool
    }

    pub fn queue(&self) -> &WaitingQueue {
        &self.queue
    }

    pub fn completed(&self) -> &[CompletedJob] {
        &self.completed
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn catalog(&self) -> &CoreCatalog {
        self.pool.catalog()
    }

    /// True if a waiting or running job carries `name`.
    pub fn is_live(&self, name: &str) -> bool {
        self.pool.contains_name(name) || self.queue.contains_name(name)
    }

    pub(crate) fn allocate_id(&mut self) -> JobId {
        let id = JobId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Verify capacity conservation and that every live job is in exactly
    /// one place with work left.
    pub fn check_invariants(&self) -> Result<(), SchedulerError> {
        self.pool
            .check_invariants()
            .map_err(SchedulerError::InvariantViolation)?;

        let mut seen = HashSet::new();
        for job in self.pool.running().iter().map(|a| &a.job).chain(self.queue.iter()) {
            if job.is_finished() {
                return Err(SchedulerError::InvariantViolation(format!(
                    "job '{}' has no work left but is still scheduled",
                    job.name
                )));
            }
            if !seen.insert(job.id) {
                return Err(SchedulerError::InvariantViolation(format!(
                    "job {} scheduled twice",
                    job.id
                )));
            }
        }
        Ok(())
    }
}

/// Thread-safe handle to the scheduler state.
pub type SharedSchedulerState = Arc<RwLock<SchedulerState>>;

/// Create a new shared scheduler state for `catalog`.
pub fn new_shared_state(catalog: Arc<CoreCatalog>) -> SharedSchedulerState {
    Arc::new(RwLock::new(SchedulerState::new(catalog)))
}

pub(crate) fn read_state(
    state: &SharedSchedulerState,
) -> Result<RwLockReadGuard<'_, SchedulerState>, SchedulerError> {
    state
        .read()
        .map_err(|e| SchedulerError::LockPoisoned(format!("SchedulerState read lock: {}", e)))
}

pub(crate) fn write_state(
    state: &SharedSchedulerState,
) -> Result<RwLockWriteGuard<'_, SchedulerState>, SchedulerError> {
    state
        .write()
        .map_err(|e| SchedulerError::LockPoisoned(format!("SchedulerState write lock: {}", e)))
}
