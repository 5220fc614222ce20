//! Store configuration.

use serde::{Deserialize, Serialize};

use crate::retry::RetryPolicy;

/// 24 hours in milliseconds.
pub const DEFAULT_SESSION_TTL_MS: u64 = 24 * 60 * 60 * 1000;

/// Climb history entries kept per user.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Complete client store configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Prefix for every storage key.
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Active sessions older than this are discarded on load.
    #[serde(default = "default_session_ttl")]
    pub session_ttl_ms: u64,
    /// Maximum climb history length; oldest entries are evicted.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    /// Error-boundary retry schedule.
    #[serde(default)]
    pub retry: RetryPolicy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            session_ttl_ms: default_session_ttl(),
            history_limit: default_history_limit(),
            retry: RetryPolicy::default(),
        }
    }
}

impl StoreConfig {
    /// Parse a JSON configuration; missing fields take their defaults.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

fn default_namespace() -> String {
    "summit".to_string()
}

fn default_session_ttl() -> u64 {
    DEFAULT_SESSION_TTL_MS
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}
