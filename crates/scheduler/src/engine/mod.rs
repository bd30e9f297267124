//! Scheduling transitions on [`SchedulerState`](crate::state::SchedulerState).
//!
//! Split into focused submodules:
//! - `admission`: direct and fallback placement, submission-time admission
//! - `preemption`: per-class and global evict-and-requeue
//! - `dispatch`: one ordered pass over the waiting queue
//! - `clock`: the periodic tick that advances work and backfills capacity
//! - `termination`: retiring running jobs
//!
//! Every method here runs to completion on `&mut SchedulerState`; callers
//! hold the state lock for the whole call so no partial transition is ever
//! observable.

mod admission;
mod clock;
mod dispatch;
mod preemption;
mod termination;

use coresched_core::{CoreClass, JobId};
use serde::Serialize;

use crate::state::CompletedJob;

/// Where a job ended up when it was given a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Placement {
    /// Free unit on the job's own class.
    Direct { class: CoreClass },
    /// Free unit on another class, own class being full.
    Fallback { class: CoreClass },
    /// Took over the unit of a less urgent job, which went back to the queue.
    Preempted {
        class: CoreClass,
        evicted: JobId,
        evicted_name: String,
    },
}

impl Placement {
    pub fn class(&self) -> CoreClass {
        match self {
            Placement::Direct { class }
            | Placement::Fallback { class }
            | Placement::Preempted { class, .. } => *class,
        }
    }

    pub fn is_preemption(&self) -> bool {
        matches!(self, Placement::Preempted { .. })
    }
}

/// Outcome of offering a job to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Admission {
    Placed(Placement),
    Queued,
}

impl Admission {
    pub fn placement(&self) -> Option<&Placement> {
        match self {
            Admission::Placed(p) => Some(p),
            Admission::Queued => None,
        }
    }
}

/// A waiting job that got a unit during a dispatch pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dispatched {
    pub id: JobId,
    pub name: String,
    pub placement: Placement,
}

/// Result of one dispatch pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub placed: Vec<Dispatched>,
    /// Queue length after the pass.
    pub still_waiting: usize,
}

impl DispatchReport {
    pub fn preemptions(&self) -> usize {
        self.placed.iter().filter(|d| d.placement.is_preemption()).count()
    }
}

/// Result of one clock tick.
#[derive(Debug, Clone, Serialize)]
pub struct TickReport {
    /// Tick number, starting at 1.
    pub tick: u64,
    /// Jobs that ran out of work on this tick.
    pub finished: Vec<CompletedJob>,
    /// The backfill pass run after completions.
    pub dispatch: DispatchReport,
}
