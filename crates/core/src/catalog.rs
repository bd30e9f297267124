use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// One class of processing unit: how many units exist and how much work a
/// unit retires per tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreSpec {
    /// Display name, e.g. `"4GHz"`. Unique within a catalog.
    pub name: String,
    /// Number of units of this class.
    pub capacity: u32,
    /// Work decrement applied per tick to a job running on this class.
    pub rate: u32,
}

impl CoreSpec {
    pub fn new(name: impl Into<String>, capacity: u32, rate: u32) -> Self {
        Self {
            name: name.into(),
            capacity,
            rate,
        }
    }
}

/// Handle to a class inside a [`CoreCatalog`].
///
/// Handles are only meaningful for the catalog that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CoreClass(usize);

impl CoreClass {
    /// Position of the class in catalog order (fastest first).
    pub fn index(self) -> usize {
        self.0
    }
}

/// The fixed set of core classes available to the scheduler.
///
/// Classes are kept ordered fastest-first by rate. The catalog is built once
/// at startup and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CoreSpec>", into = "Vec<CoreSpec>")]
pub struct CoreCatalog {
    classes: Vec<CoreSpec>,
}

/// Catalog string for [`CoreCatalog::standard`].
pub const STANDARD_CATALOG: &str = "4GHz:2:4,3GHz:4:3,2GHz:4:2";

impl CoreCatalog {
    /// Build a catalog, validating names, capacities and rates.
    pub fn new(mut specs: Vec<CoreSpec>) -> Result<Self, CoreError> {
        if specs.is_empty() {
            return Err(CoreError::InvalidCatalog("catalog has no core classes".into()));
        }

        let mut seen = HashSet::new();
        for spec in &specs {
            if spec.name.trim().is_empty() {
                return Err(CoreError::InvalidCatalog("core class with empty name".into()));
            }
            if !seen.insert(spec.name.as_str()) {
                return Err(CoreError::InvalidCatalog(format!(
                    "duplicate core class '{}'",
                    spec.name
                )));
            }
            if spec.capacity == 0 {
                return Err(CoreError::InvalidCatalog(format!(
                    "core class '{}' has zero capacity",
                    spec.name
                )));
            }
            if spec.rate == 0 {
                return Err(CoreError::InvalidCatalog(format!(
                    "core class '{}' has zero rate",
                    spec.name
                )));
            }
        }

        // Stable, so equal-rate classes keep their declared order.
        specs.sort_by(|a, b| b.rate.cmp(&a.rate));
        Ok(Self { classes: specs })
    }

    /// The default three-class catalog: 4GHz x2, 3GHz x4, 2GHz x4.
    pub fn standard() -> Self {
        Self {
            classes: vec![
                CoreSpec::new("4GHz", 2, 4),
                CoreSpec::new("3GHz", 4, 3),
                CoreSpec::new("2GHz", 4, 2),
            ],
        }
    }

    /// Parse a comma-separated list of `name:capacity:rate` entries.
    pub fn parse(input: &str) -> Result<Self, CoreError> {
        let mut specs = Vec::new();
        for entry in input.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let parts: Vec<&str> = entry.split(':').map(str::trim).collect();
            let [name, capacity, rate] = parts.as_slice() else {
                return Err(CoreError::InvalidCatalog(format!(
                    "expected name:capacity:rate, got '{}'",
                    entry
                )));
            };
            let capacity = capacity.parse::<u32>().map_err(|_| {
                CoreError::InvalidCatalog(format!("bad capacity in '{}'", entry))
            })?;
            let rate = rate
                .parse::<u32>()
                .map_err(|_| CoreError::InvalidCatalog(format!("bad rate in '{}'", entry)))?;
            specs.push(CoreSpec::new(*name, capacity, rate));
        }
        Self::new(specs)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// All classes, fastest first.
    pub fn classes(&self) -> impl Iterator<Item = CoreClass> + '_ {
        (0..self.classes.len()).map(CoreClass)
    }

    pub fn get(&self, class: CoreClass) -> Option<&CoreSpec> {
        self.classes.get(class.0)
    }

    /// Spec for a class handle issued by this catalog.
    pub fn spec(&self, class: CoreClass) -> &CoreSpec {
        &self.classes[class.0]
    }

    pub fn name(&self, class: CoreClass) -> &str {
        &self.spec(class).name
    }

    pub fn capacity(&self, class: CoreClass) -> u32 {
        self.spec(class).capacity
    }

    pub fn rate(&self, class: CoreClass) -> u32 {
        self.spec(class).rate
    }

    pub fn by_name(&self, name: &str) -> Option<CoreClass> {
        self.classes.iter().position(|s| s.name == name).map(CoreClass)
    }

    pub fn lookup(&self, name: &str) -> Result<CoreClass, CoreError> {
        self.by_name(name)
            .ok_or_else(|| CoreError::UnknownClass(name.to_string()))
    }

    /// Total units across every class.
    pub fn total_capacity(&self) -> u32 {
        self.classes.iter().map(|s| s.capacity).sum()
    }

    /// Classes a job may fall back to when its own class is full.
    ///
    /// Ordered from the second-fastest class down to the slowest; the
    /// fastest class is never a fallback target and neither is `own`.
    pub fn fallback_order(&self, own: CoreClass) -> Vec<CoreClass> {
        self.classes().skip(1).filter(|c| *c != own).collect()
    }
}

impl Default for CoreCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl TryFrom<Vec<CoreSpec>> for CoreCatalog {
    type Error = CoreError;

    fn try_from(specs: Vec<CoreSpec>) -> Result<Self, Self::Error> {
        Self::new(specs)
    }
}

impl From<CoreCatalog> for Vec<CoreSpec> {
    fn from(catalog: CoreCatalog) -> Self {
        catalog.classes
    }
}

impl fmt::Display for CoreCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, spec) in self.classes.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}:{}:{}", spec.name, spec.capacity, spec.rate)?;
        }
        Ok(())
    }
}
