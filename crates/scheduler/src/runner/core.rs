use std::sync::{Arc, Mutex, RwLock};
use std::time::Instant;

use coresched_core::{Config, CoreCatalog, SchedulerConfig};
use tracing::info;

use crate::error::SchedulerError;
use crate::generator::{JobGenerator, RandomJobGenerator};
use crate::metrics::SchedulerMetrics;
use crate::state::{new_shared_state, SharedSchedulerState};

use super::execution::ClockHandle;

/// The scheduler facade. Owns all shared state and serializes operator
/// requests against the clock actor: every mutating call holds the state
/// write lock for its whole transition, status reads take the read lock.
pub struct Scheduler {
    pub(super) config: SchedulerConfig,
    pub(super) catalog: Arc<CoreCatalog>,
    /// Core pool, waiting queue and completed history.
    pub(super) state: SharedSchedulerState,
    /// Scheduler metrics.
    pub(super) metrics: Arc<RwLock<SchedulerMetrics>>,
    /// Attribute source for `submit`.
    pub(super) generator: Mutex<Box<dyn JobGenerator>>,
    pub(super) started: Instant,
    /// Running clock task, if any.
    pub(super) clock: Mutex<Option<ClockHandle>>,
}

impl Scheduler {
    /// Create a scheduler whose generator is seeded from `config.seed`.
    pub fn new(catalog: CoreCatalog, config: SchedulerConfig) -> Self {
        let generator = RandomJobGenerator::from_seed(config.seed);
        Self::with_generator(catalog, config, generator)
    }

    /// Create a scheduler with an explicit job generator.
    pub fn with_generator(
        catalog: CoreCatalog,
        config: SchedulerConfig,
        generator: impl JobGenerator + 'static,
    ) -> Self {
        let catalog = Arc::new(catalog);
        info!(
            "Scheduler created: {} core classes, {} units, {} preemption",
            catalog.len(),
            catalog.total_capacity(),
            config.preemption_scope
        );
        Self {
            config,
            state: new_shared_state(Arc::clone(&catalog)),
            catalog,
            metrics: Arc::new(RwLock::new(SchedulerMetrics::default())),
            generator: Mutex::new(Box::new(generator)),
            started: Instant::now(),
            clock: Mutex::new(None),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.catalog.clone(), config.scheduler.clone())
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn catalog(&self) -> &CoreCatalog {
        &self.catalog
    }

    pub(super) fn elapsed_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }

    /// Get a snapshot of the current scheduler metrics.
    pub fn metrics(&self) -> Result<SchedulerMetrics, SchedulerError> {
        self.metrics
            .read()
            .map(|m| m.clone())
            .map_err(|e| SchedulerError::LockPoisoned(format!("SchedulerMetrics read lock: {}", e)))
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        // A clock that outlives its scheduler would tick forever.
        if let Some(clock) = self.clock.get_mut().ok().and_then(Option::take) {
            clock.signal();
        }
    }
}
