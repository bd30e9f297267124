use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::engine::{Admission, DispatchReport, Placement, TickReport};

/// Scheduler counters, updated in the same critical section as the
/// transition they describe.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SchedulerMetrics {
    /// Accepted submissions.
    pub submitted: u64,
    /// Submissions refused because the name was live.
    pub rejected: u64,
    /// Placements on the job's own class.
    pub placed_direct: u64,
    /// Placements on a fallback class.
    pub placed_fallback: u64,
    /// Jobs evicted back to the waiting queue.
    pub preemptions: u64,
    /// Submissions that went straight to the waiting queue.
    pub queued: u64,
    /// Jobs that ran out of work.
    pub completed: u64,
    /// Jobs removed by an operator.
    pub terminated: u64,
    /// Clock ticks applied.
    pub ticks: u64,
    /// Wall time of the last tick.
    pub last_tick: Option<DateTime<Utc>>,
}

impl SchedulerMetrics {
    /// Record the outcome of a submission.
    pub fn record_admission(&mut self, admission: &Admission) {
        self.submitted += 1;
        match admission {
            Admission::Placed(placement) => self.record_placement(placement),
            Admission::Queued => self.queued += 1,
        }
    }

    pub fn record_rejection(&mut self) {
        self.rejected += 1;
    }

    pub fn record_dispatch(&mut self, report: &DispatchReport) {
        for dispatched in &report.placed {
            self.record_placement(&dispatched.placement);
        }
    }

    pub fn record_tick(&mut self, report: &TickReport) {
        self.ticks += 1;
        self.completed += report.finished.len() as u64;
        self.last_tick = Some(Utc::now());
        self.record_dispatch(&report.dispatch);
    }

    pub fn record_termination(&mut self) {
        self.terminated += 1;
    }

    fn record_placement(&mut self, placement: &Placement) {
        match placement {
            Placement::Direct { .. } => self.placed_direct += 1,
            Placement::Fallback { .. } => self.placed_fallback += 1,
            Placement::Preempted { .. } => self.preemptions += 1,
        }
    }
}
