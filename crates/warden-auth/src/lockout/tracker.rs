//! Account lockout policy and tracker.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use warden_core::config::LockoutConfig;
use warden_core::result::AppResult;
use warden_entity::user::model::normalize_email;

use super::store::LockoutStore;

/// Thresholds and windows applied to failed attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutPolicy {
    /// Failures within one window that trigger a lock.
    pub max_attempts: u32,
    /// How long a triggered lock lasts.
    pub lockout_duration: Duration,
    /// How long failures keep counting towards the threshold.
    pub attempt_window: Duration,
}

impl From<&LockoutConfig> for LockoutPolicy {
    fn from(config: &LockoutConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            lockout_duration: Duration::from_secs(config.lockout_duration_seconds),
            attempt_window: Duration::from_secs(config.attempt_window_seconds),
        }
    }
}

/// Tracks failed authentications per identifier (the submitted email).
///
/// Identifiers are normalised the same way emails are stored, so casing or
/// surrounding whitespace cannot be used to sidestep a lock.
#[derive(Debug, Clone)]
pub struct AccountLockout {
    store: Arc<dyn LockoutStore>,
    policy: LockoutPolicy,
}

impl AccountLockout {
    /// Create a tracker over the given store.
    pub fn new(store: Arc<dyn LockoutStore>, policy: LockoutPolicy) -> Self {
        Self { store, policy }
    }

    /// The policy in force.
    pub fn policy(&self) -> LockoutPolicy {
        self.policy
    }

    /// Whether the identifier is locked, and for how much longer.
    pub async fn is_locked(&self, identifier: &str) -> AppResult<(bool, Duration)> {
        let key = normalize_email(identifier);
        let state = self.store.load(&key).await?;
        match state.and_then(|s| s.remaining_lock(Utc::now())) {
            Some(remaining) => Ok((true, remaining)),
            None => Ok((false, Duration::ZERO)),
        }
    }

    /// Count a failed attempt. Returns the attempt count within the current window.
    pub async fn record_failed_attempt(&self, identifier: &str) -> AppResult<u32> {
        let key = normalize_email(identifier);
        let now = Utc::now();
        let state = self.store.record_failure(&key, &self.policy, now).await?;

        if state.remaining_lock(now).is_some() && state.attempts == self.policy.max_attempts {
            warn!(
                attempts = state.attempts,
                lockout_seconds = self.policy.lockout_duration.as_secs(),
                "Identifier locked after repeated failed logins"
            );
        }
        Ok(state.attempts)
    }

    /// Clear the counter after a successful login.
    pub async fn reset_attempts(&self, identifier: &str) -> AppResult<()> {
        let key = normalize_email(identifier);
        self.store.clear(&key).await?;
        info!("Failed login counter reset");
        Ok(())
    }
}
