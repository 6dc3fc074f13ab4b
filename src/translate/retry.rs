use std::time::Duration;
use tracing::{debug, warn};

/// Bounded retry with exponential backoff between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// No sleeping between attempts
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO)
    }

    /// Delay before attempt `attempt + 1`, doubling each time
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(factor)
    }
}

/// Outcome of [`with_retry`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Retried<T> {
    pub value: T,
    pub attempts: u32,
    pub fell_back: bool,
}

/// Run `op` up to `policy.max_attempts` times; on exhaustion return `fallback`.
pub fn with_retry<T, E, F>(policy: &RetryPolicy, fallback: T, mut op: F) -> Retried<T>
where
    E: std::fmt::Display,
    F: FnMut(u32) -> Result<T, E>,
{
    let max_attempts = policy.max_attempts.max(1);

    for attempt in 1..=max_attempts {
        match op(attempt) {
            Ok(value) => {
                if attempt > 1 {
                    debug!("succeeded after {} attempts", attempt);
                }
                return Retried {
                    value,
                    attempts: attempt,
                    fell_back: false,
                };
            }
            Err(e) if attempt < max_attempts => {
                let delay = policy.delay_after(attempt);
                debug!(
                    "attempt {}/{} failed, retrying in {}ms: {}",
                    attempt,
                    max_attempts,
                    delay.as_millis(),
                    e
                );
                if !delay.is_zero() {
                    std::thread::sleep(delay);
                }
            }
            Err(e) => {
                warn!("giving up after {} attempts: {}", max_attempts, e);
            }
        }
    }

    Retried {
        value: fallback,
        attempts: max_attempts,
        fell_back: true,
    }
}
