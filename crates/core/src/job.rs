use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::CoreClass;
use crate::error::CoreError;

/// Job urgency. Lower numeric value = higher priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Priority(u8);

impl Priority {
    /// Most urgent.
    pub const HIGHEST: Priority = Priority(1);
    /// Least urgent.
    pub const LOWEST: Priority = Priority(19);

    pub fn new(value: u8) -> Result<Self, CoreError> {
        if (Self::HIGHEST.0..=Self::LOWEST.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(CoreError::InvalidPriority(value))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// True if `self` would win a preemption against `other`.
    pub fn outranks(self, other: Priority) -> bool {
        self.0 < other.0
    }
}

impl TryFrom<u8> for Priority {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Priority> for u8 {
    fn from(p: Priority) -> Self {
        p.0
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sequence number assigned at submission. Names are operator labels;
/// this is the identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobId(pub u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Attributes drawn for a new job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSpec {
    pub remaining_work: u32,
    pub priority: Priority,
    pub core_class: CoreClass,
}

/// A job as tracked by the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub name: String,
    /// Work left. Positive while the job is waiting or running.
    pub remaining_work: u32,
    pub priority: Priority,
    /// Class the job asked for. It may still run elsewhere via fallback.
    pub core_class: CoreClass,
    /// Seconds since scheduler start. Informational only.
    pub arrival_secs: u64,
}

/// The one total order used for waiting jobs: priority, then shortest
/// remaining work, then submission order.
pub type QueueKey = (Priority, u32, JobId);

impl Job {
    pub fn new(id: JobId, name: impl Into<String>, spec: JobSpec, arrival_secs: u64) -> Self {
        Self {
            id,
            name: name.into(),
            remaining_work: spec.remaining_work,
            priority: spec.priority,
            core_class: spec.core_class,
            arrival_secs,
        }
    }

    pub fn queue_key(&self) -> QueueKey {
        (self.priority, self.remaining_work, self.id)
    }

    /// Retire `rate` units of work. Returns true once nothing is left.
    pub fn advance(&mut self, rate: u32) -> bool {
        self.remaining_work = self.remaining_work.saturating_sub(rate);
        self.is_finished()
    }

    pub fn is_finished(&self) -> bool {
        self.remaining_work == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CoreCatalog;

    fn job(id: u64, priority: u8, work: u32) -> Job {
        let class = CoreCatalog::standard().classes().next().unwrap();
        let spec = JobSpec {
            remaining_work: work,
            priority: Priority::new(priority).unwrap(),
            core_class: class,
        };
        Job::new(JobId(id), format!("job-{}", id), spec, 0)
    }

    #[test]
    fn priority_bounds() {
        assert!(Priority::new(0).is_err());
        assert!(Priority::new(20).is_err());
        assert_eq!(Priority::new(1).unwrap(), Priority::HIGHEST);
        assert_eq!(Priority::new(19).unwrap(), Priority::LOWEST);
    }

    #[test]
    fn priority_ordering() {
        let urgent = Priority::new(2).unwrap();
        let lax = Priority::new(5).unwrap();
        assert!(urgent < lax);
        assert!(urgent.outranks(lax));
        assert!(!lax.outranks(urgent));
        assert!(!urgent.outranks(urgent));
    }

    #[test]
    fn queue_key_breaks_ties_by_work_then_id() {
        let a = job(1, 3, 100);
        let b = job(2, 3, 50);
        let c = job(3, 3, 50);
        let d = job(4, 1, 300);

        let mut jobs = vec![a.clone(), b.clone(), c.clone(), d.clone()];
        jobs.sort_by_key(Job::queue_key);
        let ids: Vec<u64> = jobs.iter().map(|j| j.id.0).collect();
        assert_eq!(ids, vec![4, 2, 3, 1]);
    }

    #[test]
    fn advance_saturates_at_zero() {
        let mut j = job(1, 1, 10);
        assert!(!j.advance(4));
        assert_eq!(j.remaining_work, 6);
        assert!(!j.advance(4));
        assert!(j.advance(4));
        assert_eq!(j.remaining_work, 0);
    }

    #[test]
    fn priority_deserialize_validates() {
        assert!(serde_json::from_str::<Priority>("7").is_ok());
        assert!(serde_json::from_str::<Priority>("0").is_err());
    }
}
