// src/provider/rate_limit.rs

//! Request pacing and retry backoff

use crate::config::RateLimitSettings;
use std::time::{Duration, Instant};
use tracing::debug;

/// Enforces a minimum interval between consecutive requests
///
/// Single-threaded: callers hold it by `&mut` and it sleeps the caller.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_request: Option<Instant>,
}

impl RateLimiter {
    /// Create a limiter with an explicit minimum interval
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: None,
        }
    }

    /// Create a limiter allowing `requests_per_minute` requests
    pub fn per_minute(requests_per_minute: u32) -> Self {
        if requests_per_minute == 0 {
            return Self::new(Duration::ZERO);
        }
        Self::new(Duration::from_secs(60) / requests_per_minute)
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// How long `acquire` would sleep right now
    pub fn wait_time(&self) -> Duration {
        match self.last_request {
            Some(last) => self.min_interval.saturating_sub(last.elapsed()),
            None => Duration::ZERO,
        }
    }

    /// Block until a request may be sent, then record and return the send time
    pub fn acquire(&mut self) -> Instant {
        let wait = self.wait_time();
        if !wait.is_zero() {
            debug!("Rate limiter sleeping {:?}", wait);
            std::thread::sleep(wait);
        }
        let now = Instant::now();
        self.last_request = Some(now);
        now
    }
}

/// Bounded exponential backoff
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    pub fn from_settings(settings: &RateLimitSettings) -> Self {
        Self {
            max_retries: settings.max_retries,
            base_delay: Duration::from_secs(settings.base_delay_secs),
            max_delay: Duration::from_secs(settings.max_delay_secs),
        }
    }

    /// No waiting between retries (tests, offline runs)
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Delay before retry number `attempt` (1-based): base * 2^(attempt-1), capped
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let delay = self.base_delay.saturating_mul(1u32 << exponent);
        delay.min(self.max_delay)
    }

    /// Delay honoring a server `Retry-After` hint, still capped
    pub fn delay_with_hint(&self, attempt: u32, hint: Option<Duration>) -> Duration {
        let computed = self.delay_for(attempt);
        match hint {
            Some(hint) => computed.max(hint).min(self.max_delay),
            None => computed,
        }
    }
}
