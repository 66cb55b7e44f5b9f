//! Reconnect policy for the broker connection.
//!
//! A pure delay schedule, separate from the consume loop, so backoff
//! behavior is testable without a broker.

use std::time::Duration;

/// Bounded exponential backoff: `max_attempts` connection attempts,
/// waiting `base_delay * multiplier^(n-1)` after the n-th failure.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub multiplier: f64,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(5),
            multiplier: 2.0,
        }
    }
}

/// Mutable cursor over a [`ReconnectPolicy`].
pub struct ReconnectSchedule {
    policy: ReconnectPolicy,
    failures: u32,
}

impl ReconnectSchedule {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            policy,
            failures: 0,
        }
    }

    /// Record a failed attempt. Returns the delay before the next
    /// attempt, or `None` once the attempt budget is exhausted.
    pub fn next_delay(&mut self) -> Option<Duration> {
        self.failures += 1;
        if self.failures >= self.policy.max_attempts {
            return None;
        }

        let factor = self.policy.multiplier.powi(self.failures as i32 - 1);
        Some(self.policy.base_delay.mul_f64(factor))
    }

    /// Restart from attempt 1, called after a successful connection.
    pub fn reset(&mut self) {
        self.failures = 0;
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }
}
