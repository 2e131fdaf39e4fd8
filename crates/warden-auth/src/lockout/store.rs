//! Lockout state and the stores that hold it.
//!
//! [`MemoryLockoutStore`] keeps state in a sharded map, so updates to one
//! identifier never serialise behind another. [`CacheLockoutStore`] keeps it
//! in the shared cache for multi-instance deployments.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use warden_cache::CacheManager;
use warden_cache::keys;
use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::traits::cache::CacheProvider;

use super::tracker::LockoutPolicy;

/// Failed-attempt counter for one identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockoutState {
    /// Failures counted in the current window.
    pub attempts: u32,
    /// When the current window started.
    pub window_started_at: DateTime<Utc>,
    /// End of the active lock, if one was triggered.
    pub locked_until: Option<DateTime<Utc>>,
}

impl LockoutState {
    fn fresh(now: DateTime<Utc>) -> Self {
        Self {
            attempts: 0,
            window_started_at: now,
            locked_until: None,
        }
    }

    /// Time left on the lock at `now`, if locked.
    pub fn remaining_lock(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.locked_until
            .filter(|until| *until > now)
            .and_then(|until| (until - now).to_std().ok())
    }

    /// Count one failure at `now`, starting a new window or lock as needed.
    pub fn register_failure(&mut self, policy: &LockoutPolicy, now: DateTime<Utc>) {
        if self.is_stale(policy, now) {
            *self = Self::fresh(now);
        }
        self.attempts = self.attempts.saturating_add(1);
        if self.attempts >= policy.max_attempts && self.locked_until.is_none() {
            self.locked_until = Some(now + to_chrono(policy.lockout_duration));
        }
    }

    /// Whether neither a lock nor an open window remains at `now`.
    pub fn is_stale(&self, policy: &LockoutPolicy, now: DateTime<Utc>) -> bool {
        let window_over = now >= self.window_started_at + to_chrono(policy.attempt_window);
        match self.locked_until {
            Some(until) => now >= until,
            None => window_over,
        }
    }

    /// How long the state stays meaningful after `now`.
    fn time_to_live(&self, policy: &LockoutPolicy, now: DateTime<Utc>) -> Duration {
        let window_end = self.window_started_at + to_chrono(policy.attempt_window);
        let end = self.locked_until.map_or(window_end, |until| until.max(window_end));
        (end - now).to_std().unwrap_or(Duration::ZERO)
    }
}

fn to_chrono(duration: Duration) -> chrono::Duration {
    chrono::Duration::from_std(duration).unwrap_or_else(|_| chrono::Duration::days(36_500))
}

/// Storage for per-identifier lockout state.
#[async_trait]
pub trait LockoutStore: Send + Sync + std::fmt::Debug + 'static {
    /// Current state, or `None` if nothing is tracked.
    async fn load(&self, identifier: &str) -> AppResult<Option<LockoutState>>;

    /// Count a failure and return the updated state.
    async fn record_failure(
        &self,
        identifier: &str,
        policy: &LockoutPolicy,
        now: DateTime<Utc>,
    ) -> AppResult<LockoutState>;

    /// Forget the identifier.
    async fn clear(&self, identifier: &str) -> AppResult<()>;
}

/// Process-local lockout store with a hard cap on tracked identifiers.
///
/// A new identifier must reserve a slot in `tracked` before it is inserted,
/// and every removal gives its slot back, so the map never holds more than
/// `max_entries` identifiers even under concurrent inserts.
#[derive(Debug)]
pub struct MemoryLockoutStore {
    entries: DashMap<String, LockoutState>,
    tracked: AtomicUsize,
    max_entries: usize,
}

impl MemoryLockoutStore {
    /// Create a store tracking at most `max_entries` identifiers.
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            tracked: AtomicUsize::new(0),
            max_entries,
        }
    }

    /// Drop every entry that no longer carries a lock or an open window.
    pub fn sweep(&self, policy: &LockoutPolicy, now: DateTime<Utc>) -> usize {
        let mut removed = 0;
        self.entries.retain(|_, state| {
            let stale = state.is_stale(policy, now);
            if stale {
                removed += 1;
            }
            !stale
        });
        self.tracked.fetch_sub(removed, Ordering::AcqRel);
        removed
    }

    /// Number of tracked identifiers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no identifiers are tracked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn reserve_slot(&self) -> bool {
        self.tracked
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < self.max_entries).then_some(n + 1)
            })
            .is_ok()
    }

    fn release_slot(&self) {
        self.tracked.fetch_sub(1, Ordering::AcqRel);
    }
}

#[async_trait]
impl LockoutStore for MemoryLockoutStore {
    async fn load(&self, identifier: &str) -> AppResult<Option<LockoutState>> {
        Ok(self.entries.get(identifier).map(|entry| entry.value().clone()))
    }

    async fn record_failure(
        &self,
        identifier: &str,
        policy: &LockoutPolicy,
        now: DateTime<Utc>,
    ) -> AppResult<LockoutState> {
        if let Some(mut entry) = self.entries.get_mut(identifier) {
            entry.register_failure(policy, now);
            return Ok(entry.value().clone());
        }

        if !self.reserve_slot() {
            let removed = self.sweep(policy, now);
            if !self.reserve_slot() {
                warn!(
                    tracked = self.entries.len(),
                    "Lockout store is full; not tracking a new identifier"
                );
                return Err(AppError::service_unavailable("Lockout store is at capacity"));
            }
            debug!(removed, "Swept stale lockout entries");
        }

        let state = match self.entries.entry(identifier.to_string()) {
            // Another caller inserted it after our lookup; the reserved slot is not needed.
            Entry::Occupied(mut occupied) => {
                self.release_slot();
                occupied.get_mut().register_failure(policy, now);
                occupied.get().clone()
            }
            Entry::Vacant(vacant) => {
                let mut state = LockoutState::fresh(now);
                state.register_failure(policy, now);
                vacant.insert(state.clone());
                state
            }
        };
        Ok(state)
    }

    async fn clear(&self, identifier: &str) -> AppResult<()> {
        if self.entries.remove(identifier).is_some() {
            self.release_slot();
        }
        Ok(())
    }
}

/// Lockout store kept in the shared cache, one JSON entry per identifier.
///
/// Entries carry a TTL covering the open window or lock, so the cache evicts
/// them on its own. Updates are read-modify-write: concurrent failures for the
/// same identifier on different instances may be counted once.
#[derive(Debug, Clone)]
pub struct CacheLockoutStore {
    cache: CacheManager,
}

impl CacheLockoutStore {
    /// Create a store over the given cache.
    pub fn new(cache: CacheManager) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl LockoutStore for CacheLockoutStore {
    async fn load(&self, identifier: &str) -> AppResult<Option<LockoutState>> {
        self.cache.get_json(&keys::lockout(identifier)).await
    }

    async fn record_failure(
        &self,
        identifier: &str,
        policy: &LockoutPolicy,
        now: DateTime<Utc>,
    ) -> AppResult<LockoutState> {
        let key = keys::lockout(identifier);
        let mut state = self
            .cache
            .get_json::<LockoutState>(&key)
            .await?
            .unwrap_or_else(|| LockoutState::fresh(now));
        state.register_failure(policy, now);

        let ttl = state.time_to_live(policy, now);
        if !ttl.is_zero() {
            self.cache.set_json(&key, &state, ttl).await?;
        }
        Ok(state)
    }

    async fn clear(&self, identifier: &str) -> AppResult<()> {
        self.cache.delete(&keys::lockout(identifier)).await
    }
}
