use coresched_core::Job;
use tracing::info;

use crate::state::SchedulerState;

use super::Placement;

impl SchedulerState {
    /// Evict the least urgent job running on `job`'s own class if `job`
    /// strictly outranks it. The evicted job goes back to the waiting queue
    /// with its remaining work as it stands, and `job` takes its unit.
    pub fn preempt_in_class(&mut self, job: Job) -> Result<Placement, Job> {
        let victim = self.pool.least_urgent_on(job.core_class);
        self.preempt_at(victim, job)
    }

    /// Like [`preempt_in_class`](Self::preempt_in_class) but the victim is
    /// the least urgent job on any class; `job` runs wherever it vacated.
    pub fn preempt_global(&mut self, job: Job) -> Result<Placement, Job> {
        let victim = self.pool.least_urgent();
        self.preempt_at(victim, job)
    }

    fn preempt_at(&mut self, victim: Option<usize>, job: Job) -> Result<Placement, Job> {
        let Some(index) = victim else {
            return Err(job);
        };
        match self.pool.get(index) {
            Some(current) if job.priority.outranks(current.job.priority) => {}
            _ => return Err(job),
        }

        let (name, priority) = (job.name.clone(), job.priority);
        let evicted = self.pool.replace(index, job);
        info!(
            evicted = %evicted.job.name,
            evicted_priority = %evicted.job.priority,
            job = %name,
            priority = %priority,
            class = %self.catalog().name(evicted.class),
            "preempted"
        );

        let placement = Placement::Preempted {
            class: evicted.class,
            evicted: evicted.job.id,
            evicted_name: evicted.job.name.clone(),
        };
        self.queue.push(evicted.job);
        Ok(placement)
    }
}
