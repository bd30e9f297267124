use tracing::{debug, info};

use crate::state::{Completion, SchedulerState};

use super::TickReport;

impl SchedulerState {
    /// Advance every running job by its class rate, retire the ones that
    /// ran out of work, then backfill with one dispatch pass.
    pub fn tick(&mut self) -> TickReport {
        self.ticks += 1;
        let tick = self.ticks;

        let mut finished = Vec::new();
        for id in self.pool.advance_all() {
            if let Some(assignment) = self.pool.release_by_id(id) {
                let done = self.retire(assignment, Completion::Finished);
                info!(job = %done.job.name, class = %self.catalog().name(done.class), tick, "completed");
                finished.push(done);
            }
        }

        let dispatch = if finished.is_empty() && self.queue.is_empty() {
            Default::default()
        } else {
            self.dispatch_pass()
        };

        debug!(
            tick,
            running = self.pool.running().len(),
            waiting = self.queue.len(),
            "tick"
        );
        TickReport { tick, finished, dispatch }
    }
}
