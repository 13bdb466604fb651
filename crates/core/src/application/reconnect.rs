// Consumer Reconnect Policy

use std::time::Duration;

/// Backoff schedule for re-establishing the broker connection.
///
/// The default mirrors the consumer's long-standing behavior: a fixed
/// 5 second delay and no attempt limit, so the process runs until
/// externally terminated. A multiplier above 1.0 turns the schedule
/// exponential, bounded by `max_delay`; `max_attempts` turns the endless
/// loop into a bounded one that surfaces exhaustion instead of spinning
/// silently.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    pub initial_delay: Duration,
    pub multiplier: f64,
    pub max_delay: Duration,
    pub max_attempts: Option<u32>,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::fixed(Duration::from_secs(5))
    }
}

impl ReconnectPolicy {
    /// Fixed-interval schedule with no attempt limit.
    pub fn fixed(delay: Duration) -> Self {
        Self {
            initial_delay: delay,
            multiplier: 1.0,
            max_delay: delay,
            max_attempts: None,
        }
    }

    /// Exponential schedule capped at `max_delay`, no attempt limit.
    pub fn exponential(initial_delay: Duration, multiplier: f64, max_delay: Duration) -> Self {
        Self {
            initial_delay,
            multiplier,
            max_delay,
            max_attempts: None,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Delay before reconnect attempt number `attempt` (0-based).
    ///
    /// Returns `None` once the attempt budget is exhausted; the caller
    /// should give up instead of sleeping again.
    pub fn delay(&self, attempt: u32) -> Option<Duration> {
        if let Some(max) = self.max_attempts {
            if attempt >= max {
                return None;
            }
        }
        let factor = self.multiplier.powi(attempt as i32);
        let secs = (self.initial_delay.as_secs_f64() * factor).min(self.max_delay.as_secs_f64());
        Some(Duration::from_secs_f64(secs))
    }
}
