use std::sync::{Arc, RwLock};

use coresched_core::{CoreError, Job, JobId, JobSpec};
use serde::Serialize;
use tracing::{debug, warn};

use crate::engine::{Admission, TickReport};
use crate::error::SchedulerError;
use crate::metrics::SchedulerMetrics;
use crate::state::{read_state, write_state, CompletedJob, SchedulerState, SharedSchedulerState};
use crate::status::StatusSnapshot;

use super::Scheduler;

/// Result of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Submitted {
    pub id: JobId,
    pub admission: Admission,
}

impl Scheduler {
    /// Submit a job called `name` with attributes drawn from the generator.
    pub fn submit(&self, name: &str) -> Result<Submitted, SchedulerError> {
        let spec = {
            let mut generator = self.generator.lock().map_err(|e| {
                SchedulerError::LockPoisoned(format!("JobGenerator lock: {}", e))
            })?;
            generator.draw(&self.catalog)
        };
        self.submit_spec(name, spec)
    }

    /// Submit a job with explicit attributes.
    ///
    /// Rejects a name that belongs to a job still waiting or running; names
    /// of completed jobs may be reused.
    pub fn submit_spec(&self, name: &str, spec: JobSpec) -> Result<Submitted, SchedulerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SchedulerError::InvalidJob("job name is empty".into()));
        }
        if spec.remaining_work == 0 {
            return Err(SchedulerError::InvalidJob(format!("job '{}' has no work", name)));
        }
        if self.catalog.get(spec.core_class).is_none() {
            return Err(CoreError::UnknownClass(format!("#{}", spec.core_class.index())).into());
        }

        let mut state = write_state(&self.state)?;
        if state.is_live(name) {
            warn!(job = %name, "rejected duplicate submission");
            record(&self.metrics, SchedulerMetrics::record_rejection);
            return Err(SchedulerError::DuplicateJob(name.to_string()));
        }

        let id = state.allocate_id();
        let job = Job::new(id, name, spec, self.elapsed_secs());
        let admission = state.admit(job, self.config.preemption_scope);
        debug_check(&state);
        record(&self.metrics, |m| m.record_admission(&admission));

        Ok(Submitted { id, admission })
    }

    /// Terminate the running job called `name`, then backfill its unit from
    /// the waiting queue. Returns false, changing nothing, when no running
    /// job has that name.
    pub fn terminate(&self, name: &str) -> Result<bool, SchedulerError> {
        let mut state = write_state(&self.state)?;
        if state.terminate(name.trim()).is_none() {
            debug!(job = %name, "terminate: no running job with that name");
            return Ok(false);
        }

        let report = state.dispatch_pass();
        debug_check(&state);
        record(&self.metrics, |m| {
            m.record_termination();
            m.record_dispatch(&report);
        });
        Ok(true)
    }

    /// Apply one clock tick now.
    pub fn tick(&self) -> Result<TickReport, SchedulerError> {
        apply_tick(&self.state, &self.metrics)
    }

    /// Consistent snapshot of running, waiting and free capacity.
    pub fn status(&self) -> Result<StatusSnapshot, SchedulerError> {
        let state = read_state(&self.state)?;
        Ok(StatusSnapshot::capture(&state, self.elapsed_secs()))
    }

    /// Every job that has finished or been terminated, oldest first.
    pub fn completed(&self) -> Result<Vec<CompletedJob>, SchedulerError> {
        Ok(read_state(&self.state)?.completed().to_vec())
    }

    pub fn check_invariants(&self) -> Result<(), SchedulerError> {
        read_state(&self.state)?.check_invariants()
    }
}

/// One clock transition: advance, retire, backfill. Shared by the manual
/// [`Scheduler::tick`] and the clock task.
pub(super) fn apply_tick(
    state: &SharedSchedulerState,
    metrics: &Arc<RwLock<SchedulerMetrics>>,
) -> Result<TickReport, SchedulerError> {
    let mut state = write_state(state)?;
    let report = state.tick();
    debug_check(&state);
    record(metrics, |m| m.record_tick(&report));
    Ok(report)
}

/// Metrics are best-effort: a poisoned metrics lock never fails a transition,
/// the update is dropped and logged.
fn record(metrics: &RwLock<SchedulerMetrics>, f: impl FnOnce(&mut SchedulerMetrics)) {
    match metrics.write() {
        Ok(mut m) => f(&mut m),
        Err(e) => warn!(error = %e, "SchedulerMetrics write lock poisoned, update dropped"),
    }
}

fn debug_check(state: &SchedulerState) {
    debug_assert_eq!(state.check_invariants().map_err(|e| e.to_string()), Ok(()));
}
