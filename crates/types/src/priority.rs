//! Scheduling priority.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Scheduling priority. Lower values take precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Priority(pub u32);

/// Priority value outside the accepted closed range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("priority {value} outside [{min}, {max}]")]
pub struct PriorityOutOfRange {
    pub value: u32,
    pub min: u32,
    pub max: u32,
}

impl Priority {
    /// Highest precedence accepted from configuration.
    pub const MIN: Self = Priority(1);

    /// Lowest precedence accepted from configuration.
    pub const MAX: Self = Priority(10);

    /// Validate a caller-supplied value against [`Priority::MIN`]..=[`Priority::MAX`].
    pub fn new(value: u32) -> Result<Self, PriorityOutOfRange> {
        if (Self::MIN.0..=Self::MAX.0).contains(&value) {
            Ok(Priority(value))
        } else {
            Err(PriorityOutOfRange {
                value,
                min: Self::MIN.0,
                max: Self::MAX.0,
            })
        }
    }

    /// Draw a priority uniformly from the closed default range.
    pub fn random(rng: &mut impl Rng) -> Self {
        Priority(rng.gen_range(Self::MIN.0..=Self::MAX.0))
    }

    /// Get the raw value.
    pub fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_random_priority_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..1000 {
            let p = Priority::random(&mut rng);
            assert!(p >= Priority::MIN && p <= Priority::MAX, "{p} out of range");
        }
    }

    #[test]
    fn test_random_priority_is_reproducible() {
        let draw = |seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            (0..8).map(|_| Priority::random(&mut rng)).collect::<Vec<_>>()
        };
        assert_eq!(draw(42), draw(42));
    }

    #[test]
    fn test_new_rejects_out_of_range() {
        assert_eq!(Priority::new(1), Ok(Priority(1)));
        assert_eq!(Priority::new(10), Ok(Priority(10)));
        assert!(Priority::new(0).is_err());
        assert!(Priority::new(11).is_err());
    }

    #[test]
    fn test_lower_value_sorts_first() {
        let mut ps = vec![Priority(7), Priority(2), Priority(9)];
        ps.sort();
        assert_eq!(ps[0], Priority(2));
    }
}
