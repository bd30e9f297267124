use coresched_core::{CoreCatalog, CoreClass, JobSpec, Priority};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Smallest amount of work drawn for a new job.
pub const MIN_WORK: u32 = 50;
/// Largest amount of work drawn for a new job.
pub const MAX_WORK: u32 = 300;

/// Source of attributes for operator-submitted jobs.
pub trait JobGenerator: Send {
    fn draw(&mut self, catalog: &CoreCatalog) -> JobSpec;
}

/// Uniform draws: work in [50, 300], priority in [1, 19], class uniform
/// over the catalog.
#[derive(Debug)]
pub struct RandomJobGenerator {
    rng: StdRng,
}

impl RandomJobGenerator {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible sequence of draws.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map(Self::seeded).unwrap_or_default()
    }
}

impl Default for RandomJobGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl JobGenerator for RandomJobGenerator {
    fn draw(&mut self, catalog: &CoreCatalog) -> JobSpec {
        let remaining_work = self.rng.gen_range(MIN_WORK..=MAX_WORK);
        let priority = self
            .rng
            .gen_range(Priority::HIGHEST.value()..=Priority::LOWEST.value());
        let classes: Vec<CoreClass> = catalog.classes().collect();
        let core_class = classes[self.rng.gen_range(0..classes.len())];

        JobSpec {
            remaining_work,
            priority: Priority::new(priority).unwrap_or(Priority::LOWEST),
            core_class,
        }
    }
}
