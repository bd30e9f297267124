use tracing::info;

use crate::pool::Assignment;
use crate::state::{CompletedJob, Completion, SchedulerState};

impl SchedulerState {
    /// Stop the running job called `name` and free its unit.
    ///
    /// Returns `None` without side effects when no running job has that
    /// name (already completed, still waiting, or unknown).
    pub fn terminate(&mut self, name: &str) -> Option<CompletedJob> {
        let index = self.pool.position_by_name(name)?;
        let assignment = self.pool.release(index);
        let done = self.retire(assignment, Completion::Terminated);
        info!(job = %done.job.name, class = %self.catalog().name(done.class), "terminated");
        Some(done)
    }

    /// Record a job that has already left the pool.
    pub(crate) fn retire(&mut self, assignment: Assignment, outcome: Completion) -> CompletedJob {
        let done = CompletedJob {
            job: assignment.job,
            class: assignment.class,
            outcome,
            tick: self.ticks,
        };
        self.completed.push(done.clone());
        done
    }
}
