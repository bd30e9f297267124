use std::fmt;

use coresched_core::{Job, JobId};
use indexmap::IndexMap;
use serde::Serialize;

use crate::state::SchedulerState;

/// A waiting or running job as shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobStatus {
    pub id: JobId,
    pub name: String,
    pub priority: u8,
    pub remaining_work: u32,
    /// Class the job asked for.
    pub wanted: String,
    /// Class the job is running on; `None` while waiting.
    pub running_on: Option<String>,
    pub arrival_secs: u64,
}

/// Unit counts for one core class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClassAvailability {
    pub available: u32,
    pub capacity: u32,
}

/// Consistent view of the scheduler, taken under one read lock.
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    /// Wall seconds since the scheduler started.
    pub elapsed_secs: u64,
    pub ticks: u64,
    /// Running jobs, most urgent first.
    pub running: Vec<JobStatus>,
    /// Waiting jobs in dispatch order.
    pub waiting: Vec<JobStatus>,
    /// Keyed by class name, in catalog order.
    pub available_by_class: IndexMap<String, ClassAvailability>,
    pub completed_count: usize,
}

impl StatusSnapshot {
    pub fn capture(state: &SchedulerState, elapsed_secs: u64) -> Self {
        let catalog = state.catalog();
        let describe = |job: &Job, running_on: Option<String>| JobStatus {
            id: job.id,
            name: job.name.clone(),
            priority: job.priority.value(),
            remaining_work: job.remaining_work,
            wanted: catalog.name(job.core_class).to_string(),
            running_on,
            arrival_secs: job.arrival_secs,
        };

        let mut running: Vec<JobStatus> = state
            .pool()
            .running()
            .iter()
            .map(|a| describe(&a.job, Some(catalog.name(a.class).to_string())))
            .collect();
        running.sort_by_key(|j| (j.priority, j.id));

        let waiting = state.queue().iter().map(|job| describe(job, None)).collect();

        let available_by_class = catalog
            .classes()
            .map(|class| {
                (
                    catalog.name(class).to_string(),
                    ClassAvailability {
                        available: state.pool().available(class),
                        capacity: catalog.capacity(class),
                    },
                )
            })
            .collect();

        Self {
            elapsed_secs,
            ticks: state.ticks(),
            running,
            waiting,
            available_by_class,
            completed_count: state.completed().len(),
        }
    }

    pub fn is_running(&self, name: &str) -> bool {
        self.running.iter().any(|j| j.name == name)
    }

    pub fn is_waiting(&self, name: &str) -> bool {
        self.waiting.iter().any(|j| j.name == name)
    }

    pub fn available(&self, class: &str) -> Option<u32> {
        self.available_by_class.get(class).map(|c| c.available)
    }
}

impl fmt::Display for StatusSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Scheduler Status ===")?;
        writeln!(f, "Clock: {}s ({} ticks)", self.elapsed_secs, self.ticks)?;

        writeln!(f, "\nRunning:")?;
        for job in &self.running {
            writeln!(
                f,
                "- {} on {} (priority {}, remaining {})",
                job.name,
                job.running_on.as_deref().unwrap_or("?"),
                job.priority,
                job.remaining_work
            )?;
        }

        writeln!(f, "\nWaiting:")?;
        for job in &self.waiting {
            writeln!(
                f,
                "- {} (priority {}, remaining {}, wants {})",
                job.name, job.priority, job.remaining_work, job.wanted
            )?;
        }

        writeln!(f, "\nAvailable cores:")?;
        for (class, units) in &self.available_by_class {
            writeln!(f, "- {}: {}/{} free", class, units.available, units.capacity)?;
        }
        write!(f, "\nCompleted: {}", self.completed_count)
    }
}
