//! Client configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default operator-directory endpoint (The Graph deployment of the BLS
/// public-key registry).
pub const DEFAULT_DIRECTORY_URL: &str =
    "https://api.studio.thegraph.com/query/85556/bls_apk_registry/version/latest";

/// Default minimum fraction of total stake that must have signed.
pub const DEFAULT_THRESHOLD_PERCENT: f64 = 67.0;

/// Backoff policy for transient transport failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Attempts before the transient error is surfaced
    pub max_attempts: u32,
    /// Delay after the first failed attempt
    pub initial_delay_ms: u64,
    /// Cap on the exponential growth
    pub max_delay_ms: u64,
    /// Growth factor between attempts
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay_ms: 500,
            max_delay_ms: 10_000,
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (counted from 1).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = (self.initial_delay_ms as f64)
            * self.multiplier.powi(attempt.saturating_sub(1) as i32);
        let delay = delay.min(self.max_delay_ms as f64);
        Duration::from_millis(delay as u64)
    }
}

/// Configuration for a [`SequencerClient`](crate::SequencerClient).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Application namespace whose batches are being followed
    pub app_name: String,
    /// Base URL of the sequencer node to poll
    pub base_url: String,
    /// GraphQL endpoint serving the operator records
    pub directory_url: String,
    /// Minimum percentage of total stake that must have signed a
    /// finalization for it to be accepted
    pub threshold_percent: f64,
    /// Backoff policy for transient poll failures
    pub retry: RetryPolicy,
    /// Pause between polls that returned no new batches
    pub poll_interval_ms: u64,
}

impl ClientConfig {
    pub fn new(app_name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            base_url: base_url.into(),
            directory_url: DEFAULT_DIRECTORY_URL.to_string(),
            threshold_percent: DEFAULT_THRESHOLD_PERCENT,
            retry: RetryPolicy::default(),
            poll_interval_ms: 1_000,
        }
    }
}
