use coresched_core::{Job, PreemptionScope};
use tracing::{debug, info};

use crate::state::SchedulerState;

use super::{Admission, Placement};

impl SchedulerState {
    /// Place `job` on a free unit without disturbing any running job.
    ///
    /// Tries the job's own class, then the catalog's fallback order. Hands
    /// the job back untouched when every candidate class is full.
    pub fn place_directly(&mut self, job: Job) -> Result<Placement, Job> {
        let own = job.core_class;
        let name = job.name.clone();

        let mut job = match self.pool.occupy(own, job) {
            Ok(()) => {
                info!(job = %name, class = %self.catalog().name(own), "assigned");
                return Ok(Placement::Direct { class: own });
            }
            Err(job) => job,
        };

        for class in self.catalog().fallback_order(own) {
            job = match self.pool.occupy(class, job) {
                Ok(()) => {
                    info!(
                        job = %name,
                        wanted = %self.catalog().name(own),
                        class = %self.catalog().name(class),
                        "fallback assigned"
                    );
                    return Ok(Placement::Fallback { class });
                }
                Err(job) => job,
            };
        }

        debug!(job = %name, "no free unit");
        Err(job)
    }

    /// Offer a freshly submitted job: free unit first, then preemption
    /// within `scope`, otherwise the waiting queue.
    pub fn admit(&mut self, job: Job, scope: PreemptionScope) -> Admission {
        let job = match self.place_directly(job) {
            Ok(placement) => return Admission::Placed(placement),
            Err(job) => job,
        };

        let attempt = match scope {
            PreemptionScope::PerClass => self.preempt_in_class(job),
            PreemptionScope::Global => self.preempt_global(job),
        };

        match attempt {
            Ok(placement) => Admission::Placed(placement),
            Err(job) => {
                info!(
                    job = %job.name,
                    priority = %job.priority,
                    wanted = %self.catalog().name(job.core_class),
                    "queued"
                );
                self.queue.push(job);
                Admission::Queued
            }
        }
    }
}
