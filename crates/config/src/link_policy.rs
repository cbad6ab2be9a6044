#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use std::time::Duration;

const MAX_CAPACITY: usize = 1_048_576;
const MIN_TTL: Duration = Duration::from_secs(1);

/// Retention of temp-file to original-file links kept by the watcher.
#[serde_as]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LinkPolicy {
    /// Maximum number of links held at once (clamped to 1..=1048576).
    pub capacity: usize,

    /// Age after which a link is forgotten, in seconds (at least 1).
    #[serde_as(as = "serde_with::DurationSeconds")]
    pub ttl: Duration,
}

impl Default for LinkPolicy {
    fn default() -> Self {
        Self {
            capacity: 4096,
            ttl: Duration::from_secs(10 * 60),
        }
    }
}

impl LinkPolicy {
    pub fn clamp(self) -> Self {
        Self {
            capacity: self.capacity.clamp(1, MAX_CAPACITY),
            ttl: self.ttl.max(MIN_TTL),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn clamp_limits_values(capacity in 0usize..4 * MAX_CAPACITY, ttl in 0u64..100_000) {
            let policy = LinkPolicy { capacity, ttl: Duration::from_secs(ttl) }.clamp();
            prop_assert!((1..=MAX_CAPACITY).contains(&policy.capacity));
            prop_assert!(policy.ttl >= MIN_TTL);
        }
    }
}
