//! Named priority overrides.

use crate::Priority;
use rand::Rng;
use std::collections::BTreeMap;

/// Priorities pinned by name (`W1`, `R3`, a worker's name, ...).
///
/// Anything not named here gets a priority drawn with [`Priority::random`].
/// Checking that the names refer to real participants is up to the config
/// that owns the overrides, since only it knows the roster.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriorityOverrides {
    by_name: BTreeMap<String, Priority>,
}

impl PriorityOverrides {
    /// Create an empty set of overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin `name` to `priority`, returning the previous override if any.
    pub fn insert(&mut self, name: impl Into<String>, priority: Priority) -> Option<Priority> {
        self.by_name.insert(name.into(), priority)
    }

    /// Get the override for `name`.
    pub fn get(&self, name: &str) -> Option<Priority> {
        self.by_name.get(name).copied()
    }

    /// The override for `name`, or a fresh random priority.
    pub fn resolve(&self, name: &str, rng: &mut impl Rng) -> Priority {
        self.get(name).unwrap_or_else(|| Priority::random(rng))
    }

    /// Names with an override, in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }

    /// Number of overrides.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Check if there are no overrides.
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
