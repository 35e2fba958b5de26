//! Shared fixtures for arbiter tests.
//!
//! Deliberately independent of the engine and ring crates so both can use it
//! as a dev-dependency without a cycle.

use arbiter_core::{Action, Notification, TimedNotification};
use arbiter_types::Priority;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Deterministic RNG for reproducible scenarios.
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Wrap raw values as priorities without range checks.
pub fn priorities(values: &[u32]) -> Vec<Priority> {
    values.iter().copied().map(Priority).collect()
}

/// The notifications among `actions`, in order.
pub fn notifications(actions: &[Action]) -> Vec<Notification> {
    actions
        .iter()
        .filter_map(Action::notification)
        .cloned()
        .collect()
}

/// Number of timed notifications of the given type.
pub fn count_kind(log: &[TimedNotification], type_name: &str) -> usize {
    log.iter()
        .filter(|t| t.notification.type_name() == type_name)
        .count()
}
