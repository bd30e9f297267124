use tracing::debug;

use crate::state::SchedulerState;

use super::{DispatchReport, Dispatched};

impl SchedulerState {
    /// Visit every waiting job once, in queue order, trying direct placement
    /// and then preemption within its own class.
    ///
    /// Jobs evicted during the pass are queued but not visited until the
    /// next pass; declined jobs stay queued.
    pub fn dispatch_pass(&mut self) -> DispatchReport {
        let pending = self.queue.drain_ordered();
        let mut report = DispatchReport::default();
        let mut declined = Vec::new();

        for job in pending {
            let (id, name) = (job.id, job.name.clone());
            let attempt = self
                .place_directly(job)
                .or_else(|job| self.preempt_in_class(job));
            match attempt {
                Ok(placement) => report.placed.push(Dispatched { id, name, placement }),
                Err(job) => declined.push(job),
            }
        }

        for job in declined {
            self.queue.push(job);
        }
        report.still_waiting = self.queue.len();

        debug!(
            placed = report.placed.len(),
            waiting = report.still_waiting,
            "dispatch pass"
        );
        report
    }
}
