//! Plugin host configuration.

use serde::{Deserialize, Serialize};

/// Plugin host configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginsConfig {
    /// Consecutive auth failures after which a plugin configuration is
    /// disabled (the circuit breaker opens).
    #[serde(default = "default_max_auth_failures")]
    pub max_auth_failures: u32,
    /// Delays between initialization retries, in milliseconds. Total
    /// attempts per request is one more than the number of delays.
    #[serde(default = "default_retry_delays_ms")]
    pub retry_delays_ms: Vec<u64>,
}

impl Default for PluginsConfig {
    fn default() -> Self {
        Self {
            max_auth_failures: default_max_auth_failures(),
            retry_delays_ms: default_retry_delays_ms(),
        }
    }
}

fn default_max_auth_failures() -> u32 {
    // one less than the attempt count to avoid locking
    2
}

fn default_retry_delays_ms() -> Vec<u64> {
    vec![1000, 5000]
}
