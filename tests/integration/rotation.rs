//! Ordering of repository calls during refresh token rotation.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_database::memory::MemoryRefreshTokenRepository;
use warden_database::repositories::RefreshTokenRepository;
use warden_entity::token::RefreshToken;

use crate::helpers::{TestApp, TestOptions, refresh_cmd, register_cmd};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Create(Uuid),
    Revoke(Uuid, bool),
}

/// Records creates and revokes, optionally failing revokes.
#[derive(Debug, Default)]
struct RecordingRepository {
    inner: MemoryRefreshTokenRepository,
    calls: Mutex<Vec<Call>>,
    fail_revoke: Mutex<bool>,
}

impl RecordingRepository {
    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}

#[async_trait]
impl RefreshTokenRepository for RecordingRepository {
    async fn create(&self, token: &RefreshToken) -> AppResult<()> {
        self.calls.lock().unwrap().push(Call::Create(token.id));
        self.inner.create(token).await
    }

    async fn find_by_token_hash(&self, token_hash: &str) -> AppResult<Option<RefreshToken>> {
        self.inner.find_by_token_hash(token_hash).await
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<RefreshToken>> {
        self.inner.find_by_id(id).await
    }

    async fn revoke(&self, id: Uuid) -> AppResult<bool> {
        if *self.fail_revoke.lock().unwrap() {
            return Err(AppError::database("connection reset"));
        }
        let claimed = self.inner.revoke(id).await?;
        self.calls.lock().unwrap().push(Call::Revoke(id, claimed));
        Ok(claimed)
    }

    async fn revoke_all_by_user_id(&self, user_id: Uuid) -> AppResult<u64> {
        self.inner.revoke_all_by_user_id(user_id).await
    }

    async fn find_active_by_user_id(&self, user_id: Uuid) -> AppResult<Vec<RefreshToken>> {
        self.inner.find_active_by_user_id(user_id).await
    }

    async fn delete_expired(&self, before: DateTime<Utc>) -> AppResult<u64> {
        self.inner.delete_expired(before).await
    }
}

async fn app_with(repo: Arc<RecordingRepository>) -> TestApp {
    TestApp::with_options(TestOptions {
        refresh_tokens: repo,
        ..TestOptions::default()
    })
    .await
}

#[tokio::test]
async fn test_replacement_is_persisted_before_old_token_is_revoked() {
    let repo = Arc::new(RecordingRepository::default());
    let app = app_with(Arc::clone(&repo)).await;
    let registered = app.service.register(register_cmd("order@example.com")).await.unwrap();
    repo.clear();

    let rotated = app
        .service
        .refresh(refresh_cmd(&registered.refresh_token))
        .await
        .unwrap();

    assert_eq!(
        repo.calls(),
        vec![
            Call::Create(rotated.session_id),
            Call::Revoke(registered.session_id, true),
        ]
    );
}

#[tokio::test]
async fn test_failed_revoke_leaves_old_token_usable() {
    let repo = Arc::new(RecordingRepository::default());
    let app = app_with(Arc::clone(&repo)).await;
    let registered = app.service.register(register_cmd("retry@example.com")).await.unwrap();

    *repo.fail_revoke.lock().unwrap() = true;
    let err = app
        .service
        .refresh(refresh_cmd(&registered.refresh_token))
        .await
        .unwrap_err();
    assert!(err.kind.is_infrastructure());

    *repo.fail_revoke.lock().unwrap() = false;
    app.service
        .refresh(refresh_cmd(&registered.refresh_token))
        .await
        .unwrap();
}
