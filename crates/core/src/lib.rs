pub mod catalog;
pub mod config;
pub mod error;
pub mod job;

pub use catalog::{CoreCatalog, CoreClass, CoreSpec, STANDARD_CATALOG};
pub use config::{load_dotenv, Config, PreemptionScope, SchedulerConfig};
pub use error::*;
pub use job::*;
