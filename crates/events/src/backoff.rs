//! Exponential backoff for opening the card subscription.
//!
//! [`CardLifecycleManager::start`](crate::CardLifecycleManager::start) retries
//! a failed subscribe with increasing delays and gives up after
//! [`RetryConfig::max_attempts`].

use std::time::Duration;

use cardbus_core::config::{env_or, ConfigError};

/// Tunable parameters for the exponential-backoff strategy.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total subscribe attempts before giving up (at least one is made).
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub initial_delay: Duration,
    /// Upper bound on the delay between attempts.
    pub max_delay: Duration,
    /// Factor by which the delay grows after each failure.
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Load from environment variables with defaults.
    ///
    /// | Env Var                           | Default |
    /// |-----------------------------------|---------|
    /// | `CARD_SUBSCRIBE_MAX_ATTEMPTS`     | `5`     |
    /// | `CARD_SUBSCRIBE_INITIAL_DELAY_MS` | `500`   |
    /// | `CARD_SUBSCRIBE_MAX_DELAY_MS`     | `10000` |
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            max_attempts: env_or("CARD_SUBSCRIBE_MAX_ATTEMPTS", defaults.max_attempts)?,
            initial_delay: Duration::from_millis(env_or(
                "CARD_SUBSCRIBE_INITIAL_DELAY_MS",
                defaults.initial_delay.as_millis() as u64,
            )?),
            max_delay: Duration::from_millis(env_or(
                "CARD_SUBSCRIBE_MAX_DELAY_MS",
                defaults.max_delay.as_millis() as u64,
            )?),
            multiplier: defaults.multiplier,
        })
    }
}

/// Calculate the next backoff delay from the current delay and config.
///
/// The result is clamped to [`RetryConfig::max_delay`].
pub fn next_delay(current: Duration, config: &RetryConfig) -> Duration {
    let next_ms = (current.as_millis() as f64 * config.multiplier) as u64;
    Duration::from_millis(next_ms).min(config.max_delay)
}
