//! Periodic purge of expired refresh tokens.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tracing::{error, info};

use warden_core::result::AppResult;
use warden_database::repositories::RefreshTokenRepository;

/// Deletes refresh token rows whose expiry has passed.
#[derive(Clone)]
pub struct SessionCleanup {
    repo: Arc<dyn RefreshTokenRepository>,
}

impl std::fmt::Debug for SessionCleanup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCleanup").finish()
    }
}

impl SessionCleanup {
    /// Creates a new session cleanup handler.
    pub fn new(repo: Arc<dyn RefreshTokenRepository>) -> Self {
        Self { repo }
    }

    /// Runs a cleanup cycle.
    ///
    /// Returns the number of rows deleted.
    pub async fn run_cleanup(&self) -> AppResult<u64> {
        let deleted = self
            .repo
            .delete_expired(Utc::now())
            .await
            .map_err(|e| e.context("delete expired refresh tokens"))?;

        if deleted > 0 {
            info!(deleted, "Expired refresh tokens purged");
        }
        Ok(deleted)
    }

    /// Run a cleanup cycle every `interval` until the cancel signal is received.
    pub async fn run(self, interval: Duration, mut cancel: watch::Receiver<bool>) {
        info!(
            interval_seconds = interval.as_secs(),
            "Session cleanup started"
        );
        let mut ticker = tokio::time::interval(interval);

        loop {
            tokio::select! {
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.run_cleanup().await {
                        error!(error = %e, "Session cleanup failed");
                    }
                }
            }
        }

        info!("Session cleanup stopped");
    }
}
