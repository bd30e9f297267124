use std::sync::Arc;

use coresched_core::{CoreCatalog, CoreClass, Job, JobId};
use serde::Serialize;

/// A job occupying one unit of a core class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub class: CoreClass,
    pub job: Job,
}

/// Per-class unit accounting plus the running set.
///
/// For every class, `available + running jobs on that class == capacity`.
/// All mutation goes through paired operations that keep this true.
#[derive(Debug, Clone)]
pub struct CorePool {
    catalog: Arc<CoreCatalog>,
    /// Free units, indexed by class.
    available: Vec<u32>,
    /// Running jobs in placement order.
    running: Vec<Assignment>,
}

impl CorePool {
    pub fn new(catalog: Arc<CoreCatalog>) -> Self {
        let available = catalog.classes().map(|c| catalog.capacity(c)).collect();
        Self {
            catalog,
            available,
            running: Vec::new(),
        }
    }

    pub fn catalog(&self) -> &CoreCatalog {
        &self.catalog
    }

    pub fn available(&self, class: CoreClass) -> u32 {
        self.available.get(class.index()).copied().unwrap_or(0)
    }

    pub fn running(&self) -> &[Assignment] {
        &self.running
    }

    pub fn running_count(&self, class: CoreClass) -> usize {
        self.running.iter().filter(|a| a.class == class).count()
    }

    pub fn is_idle(&self) -> bool {
        self.running.is_empty()
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.position_by_name(name).is_some()
    }

    pub fn position_by_name(&self, name: &str) -> Option<usize> {
        self.running.iter().position(|a| a.job.name == name)
    }

    /// Take a free unit of `class` for `job`. Hands the job back if the
    /// class is full.
    pub(crate) fn occupy(&mut self, class: CoreClass, job: Job) -> Result<(), Job> {
        match self.available.get_mut(class.index()) {
            Some(free) if *free > 0 => {
                *free -= 1;
                self.running.push(Assignment { class, job });
                Ok(())
            }
            _ => Err(job),
        }
    }

    /// Remove the assignment at `index` and return its unit to the class.
    pub(crate) fn release(&mut self, index: usize) -> Assignment {
        let assignment = self.running.remove(index);
        self.available[assignment.class.index()] += 1;
        assignment
    }

    /// Hand the unit held at `index` straight to `job`, returning the
    /// evicted assignment. Unit counts are untouched.
    pub(crate) fn replace(&mut self, index: usize, job: Job) -> Assignment {
        let class = self.running[index].class;
        std::mem::replace(&mut self.running[index], Assignment { class, job })
    }

    /// Least urgent job running on `class`. Ties go to the earliest placed.
    pub fn least_urgent_on(&self, class: CoreClass) -> Option<usize> {
        self.least_urgent_where(|a| a.class == class)
    }

    /// Least urgent job running anywhere. Ties go to the earliest placed.
    pub fn least_urgent(&self) -> Option<usize> {
        self.least_urgent_where(|_| true)
    }

    fn least_urgent_where(&self, keep: impl Fn(&Assignment) -> bool) -> Option<usize> {
        let mut worst: Option<usize> = None;
        for (i, a) in self.running.iter().enumerate() {
            if !keep(a) {
                continue;
            }
            match worst {
                Some(w) if self.running[w].job.priority >= a.job.priority => {}
                _ => worst = Some(i),
            }
        }
        worst
    }

    pub fn get(&self, index: usize) -> Option<&Assignment> {
        self.running.get(index)
    }

    /// Apply one tick of work to every running job and return the ids of
    /// jobs that ran out of work.
    pub(crate) fn advance_all(&mut self) -> Vec<JobId> {
        let catalog = &self.catalog;
        self.running
            .iter_mut()
            .filter_map(|a| a.job.advance(catalog.rate(a.class)).then_some(a.job.id))
            .collect()
    }

    pub(crate) fn release_by_id(&mut self, id: JobId) -> Option<Assignment> {
        let index = self.running.iter().position(|a| a.job.id == id)?;
        Some(self.release(index))
    }

    /// Check the capacity conservation invariant for every class.
    pub fn check_invariants(&self) -> Result<(), String> {
        for class in self.catalog.classes() {
            let free = self.available(class) as usize;
            let busy = self.running_count(class);
            let capacity = self.catalog.capacity(class) as usize;
            if free + busy != capacity {
                return Err(format!(
                    "class {}: {} available + {} running != capacity {}",
                    self.catalog.name(class),
                    free,
                    busy,
                    capacity
                ));
            }
        }
        if let Some(a) = self.running.iter().find(|a| a.job.is_finished()) {
            return Err(format!("finished job '{}' still running", a.job.name));
        }
        Ok(())
    }
}
