//! Poller configuration
//!
//! Defaults for how often a job is re-checked and how many checks are made
//! before giving up. Individual `start` calls may override both.

use std::time::Duration;

/// Default delay between two status checks
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

/// Default number of status checks before a pending job times out
pub const DEFAULT_MAX_ATTEMPTS: u32 = 60;

/// Poller configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollerConfig {
    /// Delay between the end of one status check and the start of the next
    pub interval: Duration,

    /// Maximum number of status checks per job, failed ones included
    pub max_attempts: u32,
}

impl PollerConfig {
    /// Creates a new configuration
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - SARTHI_POLL_INTERVAL_MS (optional, milliseconds, default: 5000)
    /// - SARTHI_MAX_ATTEMPTS (optional, default: 60)
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup
    ///
    /// Unset keys fall back to defaults; set but unparsable keys are errors.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let interval = match lookup("SARTHI_POLL_INTERVAL_MS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| {
                    anyhow::anyhow!("SARTHI_POLL_INTERVAL_MS must be an integer, got {:?}", raw)
                })?,
            None => DEFAULT_INTERVAL,
        };

        let max_attempts = match lookup("SARTHI_MAX_ATTEMPTS") {
            Some(raw) => raw.trim().parse::<u32>().map_err(|_| {
                anyhow::anyhow!("SARTHI_MAX_ATTEMPTS must be an integer, got {:?}", raw)
            })?,
            None => DEFAULT_MAX_ATTEMPTS,
        };

        let config = Self {
            interval,
            max_attempts,
        };
        config.validate()?;
        Ok(config)
    }

    /// Upper bound on how long a job is polled before it times out
    pub fn max_wait(&self) -> Duration {
        self.interval.saturating_mul(self.max_attempts)
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.interval.is_zero() {
            anyhow::bail!("interval must be greater than 0");
        }

        if self.max_attempts == 0 {
            anyhow::bail!("max_attempts must be greater than 0");
        }

        Ok(())
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL, DEFAULT_MAX_ATTEMPTS)
    }
}
