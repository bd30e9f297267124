use std::collections::BTreeMap;

use coresched_core::{Job, QueueKey};

/// Jobs waiting for a core, kept in (priority, remaining work, id) order.
///
/// Waiting jobs never change their work, so a job's key is fixed for as long
/// as it sits in the queue.
#[derive(Debug, Clone, Default)]
pub struct WaitingQueue {
    jobs: BTreeMap<QueueKey, Job>,
}

impl WaitingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, job: Job) {
        self.jobs.insert(job.queue_key(), job);
    }

    /// Remove and return the next candidate for dispatch.
    pub fn pop(&mut self) -> Option<Job> {
        self.jobs.pop_first().map(|(_, job)| job)
    }

    pub fn peek(&self) -> Option<&Job> {
        self.jobs.values().next()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Waiting jobs in dispatch order.
    pub fn iter(&self) -> impl Iterator<Item = &Job> {
        self.jobs.values()
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.jobs.values().any(|j| j.name == name)
    }

    /// Empty the queue, yielding its jobs in dispatch order.
    pub(crate) fn drain_ordered(&mut self) -> Vec<Job> {
        std::mem::take(&mut self.jobs).into_values().collect()
    }
}
