use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Minimum-spacing limiter keyed by upstream name. Each key may be hit once
/// per `spacing`; keys do not affect one another.
#[derive(Debug)]
pub struct RateLimiter {
    spacing: Duration,
    last_calls: HashMap<String, Instant>,
}

impl RateLimiter {
    pub fn new(spacing: Duration) -> Self {
        Self {
            spacing,
            last_calls: HashMap::new(),
        }
    }

    /// Time left before `key` may be called again.
    pub fn remaining(&self, key: &str) -> Duration {
        match self.last_calls.get(key) {
            Some(last_call) => self.spacing.saturating_sub(last_call.elapsed()),
            None => Duration::ZERO,
        }
    }

    /// Records a call and returns true if `key` is ready, otherwise leaves
    /// the limiter untouched and returns false.
    pub fn check(&mut self, key: &str) -> bool {
        if !self.remaining(key).is_zero() {
            return false;
        }
        self.last_calls.insert(key.to_string(), Instant::now());
        true
    }
}
