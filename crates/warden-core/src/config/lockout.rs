//! Account lockout configuration.

use serde::{Deserialize, Serialize};

/// Where lockout counters are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LockoutBackend {
    /// Process-local sharded map. Single instance only.
    #[default]
    Memory,
    /// The configured cache provider (shared across instances with Redis).
    Cache,
}

/// Failed-login lockout configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockoutConfig {
    /// Failed attempts within the window that trigger a lock.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// How long an identifier stays locked, in seconds.
    #[serde(default = "default_lockout_duration")]
    pub lockout_duration_seconds: u64,
    /// Failures older than this window no longer count, in seconds.
    #[serde(default = "default_attempt_window")]
    pub attempt_window_seconds: u64,
    /// Storage backend for counters.
    #[serde(default)]
    pub backend: LockoutBackend,
    /// Upper bound on identifiers tracked by the memory backend.
    #[serde(default = "default_max_tracked")]
    pub max_tracked_identifiers: usize,
}

impl Default for LockoutConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            lockout_duration_seconds: default_lockout_duration(),
            attempt_window_seconds: default_attempt_window(),
            backend: LockoutBackend::default(),
            max_tracked_identifiers: default_max_tracked(),
        }
    }
}

fn default_max_attempts() -> u32 {
    5
}

fn default_lockout_duration() -> u64 {
    900
}

fn default_attempt_window() -> u64 {
    900
}

fn default_max_tracked() -> usize {
    100_000
}
