use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::catalog::{CoreCatalog, STANDARD_CATALOG};
use crate::error::CoreError;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_parse<T: FromStr>(profile: &str, key: &str) -> Result<Option<T>, CoreError> {
    match profiled_env_opt(profile, key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| CoreError::InvalidConfig {
                key: key.to_string(),
                value,
            }),
    }
}

// ── Preemption scope ─────────────────────────────────────────

/// Which running jobs a freshly submitted job may evict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PreemptionScope {
    /// Only jobs running on the candidate's own core class.
    #[default]
    PerClass,
    /// The least urgent running job on any class.
    Global,
}

impl FromStr for PreemptionScope {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "per-class" | "per_class" | "class" => Ok(Self::PerClass),
            "global" => Ok(Self::Global),
            other => Err(CoreError::InvalidConfig {
                key: "PREEMPTION_SCOPE".into(),
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for PreemptionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PerClass => write!(f, "per-class"),
            Self::Global => write!(f, "global"),
        }
    }
}

// ── Scheduler ────────────────────────────────────────────────

/// Engine settings, typically read from the environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Length of one clock tick in milliseconds.
    #[serde(default = "default_tick_millis")]
    pub tick_millis: u64,
    /// Scope used when a submitted job looks for a victim.
    #[serde(default)]
    pub preemption_scope: PreemptionScope,
    /// Seed for the job generator. `None` = seeded from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_tick_millis() -> u64 { 1000 }

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_millis: default_tick_millis(),
            preemption_scope: PreemptionScope::default(),
            seed: None,
        }
    }
}

impl SchedulerConfig {
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_millis.max(1))
    }

    fn from_env_profiled(p: &str) -> Result<Self, CoreError> {
        Ok(Self {
            tick_millis: profiled_env_parse(p, "CORESCHED_TICK_MILLIS")?
                .unwrap_or_else(default_tick_millis),
            preemption_scope: profiled_env_parse(p, "CORESCHED_PREEMPTION_SCOPE")?
                .unwrap_or_default(),
            seed: profiled_env_parse(p, "CORESCHED_SEED")?,
        })
    }
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub catalog: CoreCatalog,
    pub scheduler: SchedulerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            profile: String::new(),
            catalog: CoreCatalog::standard(),
            scheduler: SchedulerConfig::default(),
        }
    }
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `CORESCHED_PROFILE`. When set (e.g. `BENCH`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Result<Self, CoreError> {
        let profile = env_or("CORESCHED_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Result<Self, CoreError> {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Ok(Self {
            profile: p.to_string(),
            catalog: CoreCatalog::parse(&profiled_env_or(p, "CORESCHED_CATALOG", STANDARD_CATALOG))?,
            scheduler: SchedulerConfig::from_env_profiled(p)?,
        })
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  catalog:     {}", self.catalog);
        tracing::info!("  tick:        {}ms", self.scheduler.tick_millis);
        tracing::info!("  preemption:  {}", self.scheduler.preemption_scope);
        match self.scheduler.seed {
            Some(seed) => tracing::info!("  seed:        {}", seed),
            None => tracing::info!("  seed:        (entropy)"),
        }
    }

    /// Summary as JSON, for status output.
    pub fn summary(&self) -> serde_json::Value {
        serde_json::json!({
            "profile": self.profile_label(),
            "catalog": self.catalog.to_string(),
            "tick_millis": self.scheduler.tick_millis,
            "preemption_scope": self.scheduler.preemption_scope,
            "seed": self.scheduler.seed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheduler_config_defaults() {
        let config = SchedulerConfig::default();
        assert_eq!(config.tick_millis, 1000);
        assert_eq!(config.preemption_scope, PreemptionScope::PerClass);
        assert_eq!(config.seed, None);
        assert_eq!(config.tick_period(), Duration::from_secs(1));
    }

    #[test]
    fn scheduler_config_serde_defaults() {
        let config: SchedulerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, SchedulerConfig::default());

        let config: SchedulerConfig =
            serde_json::from_str(r#"{"preemption_scope":"global","seed":7}"#).unwrap();
        assert_eq!(config.preemption_scope, PreemptionScope::Global);
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn preemption_scope_parses() {
        assert_eq!("per-class".parse::<PreemptionScope>().unwrap(), PreemptionScope::PerClass);
        assert_eq!("GLOBAL".parse::<PreemptionScope>().unwrap(), PreemptionScope::Global);
        assert!("nearest".parse::<PreemptionScope>().is_err());
    }

    #[test]
    fn profile_prefers_prefixed_keys() {
        // Unique profile name keeps this test independent of the process env.
        env::set_var("CFGTEST_CORESCHED_TICK_MILLIS", "250");
        env::set_var("CFGTEST_CORESCHED_CATALOG", "4GHz:1:4");

        let config = Config::for_profile("cfgtest").unwrap();
        assert_eq!(config.profile_label(), "CFGTEST");
        assert_eq!(config.scheduler.tick_millis, 250);
        assert_eq!(config.catalog.total_capacity(), 1);

        env::remove_var("CFGTEST_CORESCHED_TICK_MILLIS");
        env::remove_var("CFGTEST_CORESCHED_CATALOG");
    }

    #[test]
    fn summary_reports_effective_values() {
        let config = Config {
            scheduler: SchedulerConfig {
                preemption_scope: PreemptionScope::Global,
                seed: Some(3),
                ..SchedulerConfig::default()
            },
            ..Config::default()
        };
        let summary = config.summary();
        assert_eq!(summary["profile"], "default");
        assert_eq!(summary["catalog"], STANDARD_CATALOG);
        assert_eq!(summary["preemption_scope"], "global");
        assert_eq!(summary["seed"], 3);
    }

    #[test]
    fn invalid_env_value_is_an_error() {
        env::set_var("BADTEST_CORESCHED_SEED", "not-a-number");
        let err = Config::for_profile("badtest").unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfig { .. }));
        env::remove_var("BADTEST_CORESCHED_SEED");
    }
}
