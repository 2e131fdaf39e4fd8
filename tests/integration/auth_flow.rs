//! End-to-end flows through the `AuthService`.

use std::time::Duration;

use futures::future::join_all;

use warden_auth::token::hash_opaque_token;
use warden_core::error::{AppError, ErrorKind};
use warden_database::repositories::RefreshTokenRepository;
use warden_service::{
    ForgotPasswordCommand, LogoutCommand, ResetPasswordCommand, RevokeSessionCommand,
};

use crate::helpers::{
    NEW_PASSWORD, PASSWORD, TestApp, TestOptions, login_cmd, refresh_cmd, register_cmd,
};

#[tokio::test]
async fn test_stored_refresh_token_is_hashed() {
    let app = TestApp::new().await;
    app.service.register(register_cmd("hash@example.com")).await.unwrap();
    let response = app
        .service
        .login(login_cmd("hash@example.com", PASSWORD))
        .await
        .unwrap();

    let generator = app.service.deps().tokens.clone();
    let stored = app
        .refresh_tokens
        .find_by_token_hash(&generator.hash_refresh_token(&response.refresh_token))
        .await
        .unwrap()
        .expect("refresh token row");
    assert_eq!(stored.id, response.session_id);
    assert_ne!(stored.token_hash, response.refresh_token);
    assert!(
        app.refresh_tokens
            .find_by_token_hash(&response.refresh_token)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_register_refresh_logout_all_scenario() {
    let app = TestApp::new().await;
    let registered = app.service.register(register_cmd("flow@example.com")).await.unwrap();

    let rotated = app
        .service
        .refresh(refresh_cmd(&registered.refresh_token))
        .await
        .unwrap();
    let err = app
        .service
        .refresh(refresh_cmd(&registered.refresh_token))
        .await
        .unwrap_err();
    assert_eq!(err, AppError::invalid_refresh_token());

    let second_login = app
        .service
        .login(login_cmd("flow@example.com", PASSWORD))
        .await
        .unwrap();

    let claims = app
        .service
        .deps()
        .tokens
        .parse_access_token(&rotated.access_token)
        .unwrap();
    app.service
        .logout(LogoutCommand {
            user_id: claims.sub,
            token_id: claims.jti.clone(),
            token_expires_at: claims.exp,
            logout_all: true,
            refresh_token: None,
        })
        .await
        .unwrap();

    assert!(app.service.list_sessions(claims.sub).await.unwrap().is_empty());
    for raw in [
        &registered.refresh_token,
        &rotated.refresh_token,
        &second_login.refresh_token,
    ] {
        let err = app.service.refresh(refresh_cmd(raw)).await.unwrap_err();
        assert_eq!(err, AppError::invalid_refresh_token());
    }
}

#[tokio::test]
async fn test_rotated_token_works_exactly_once() {
    let app = TestApp::new().await;
    let registered = app.service.register(register_cmd("once@example.com")).await.unwrap();

    let second = app
        .service
        .refresh(refresh_cmd(&registered.refresh_token))
        .await
        .unwrap();
    let third = app
        .service
        .refresh(refresh_cmd(&second.refresh_token))
        .await
        .unwrap();
    assert!(app.service.refresh(refresh_cmd(&second.refresh_token)).await.is_err());
    app.service
        .refresh(refresh_cmd(&third.refresh_token))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_concurrent_refresh_single_winner() {
    let app = TestApp::new().await;
    let registered = app.service.register(register_cmd("race@example.com")).await.unwrap();

    let attempts = (0..10).map(|_| app.service.refresh(refresh_cmd(&registered.refresh_token)));
    let results = join_all(attempts).await;

    let winners = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1);
    for err in results.into_iter().filter_map(Result::err) {
        assert_eq!(err, AppError::invalid_refresh_token());
    }
    assert_eq!(
        app.service.list_sessions(registered.user.id).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn test_enumeration_resistance() {
    let app = TestApp::new().await;
    app.service.register(register_cmd("known@example.com")).await.unwrap();

    let unknown = app
        .service
        .login(login_cmd("unknown@example.com", PASSWORD))
        .await
        .unwrap_err();
    let wrong = app
        .service
        .login(login_cmd("known@example.com", "Wrong-Passw0rd!"))
        .await
        .unwrap_err();
    assert_eq!(unknown, wrong);

    let forgot_unknown = app
        .service
        .forgot_password(ForgotPasswordCommand {
            email: "unknown@example.com".into(),
        })
        .await
        .unwrap();
    assert!(forgot_unknown.is_none());
}

#[tokio::test]
async fn test_lockout_expires_and_success_resets_counter() {
    let app = TestApp::with_options(TestOptions {
        lockout: warden_auth::LockoutPolicy {
            max_attempts: 3,
            lockout_duration: Duration::from_millis(400),
            attempt_window: Duration::from_millis(400),
        },
        ..TestOptions::default()
    })
    .await;
    app.service.register(register_cmd("lock@example.com")).await.unwrap();

    for _ in 0..3 {
        app.service
            .login(login_cmd("lock@example.com", "Wrong-Passw0rd!"))
            .await
            .unwrap_err();
    }
    let err = app
        .service
        .login(login_cmd("lock@example.com", PASSWORD))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::AccountLocked);

    tokio::time::sleep(Duration::from_millis(500)).await;
    app.service
        .login(login_cmd("lock@example.com", PASSWORD))
        .await
        .unwrap();

    for _ in 0..2 {
        app.service
            .login(login_cmd("lock@example.com", "Wrong-Passw0rd!"))
            .await
            .unwrap_err();
    }
    app.service
        .login(login_cmd("lock@example.com", PASSWORD))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_password_reset_scenario() {
    let app = TestApp::new().await;
    let registered = app.service.register(register_cmd("reset@example.com")).await.unwrap();
    let other = app
        .service
        .login(login_cmd("reset@example.com", PASSWORD))
        .await
        .unwrap();

    let issued = app
        .service
        .forgot_password(ForgotPasswordCommand {
            email: "reset@example.com".into(),
        })
        .await
        .unwrap()
        .expect("reset token for an active account");

    let resets = &app.service.deps().reset_tokens;
    assert_eq!(
        resets.pending_hash("reset@example.com").await.unwrap(),
        Some(hash_opaque_token(&issued.reset_token))
    );

    app.service
        .reset_password(ResetPasswordCommand {
            reset_token: issued.reset_token.clone(),
            new_password: NEW_PASSWORD.into(),
        })
        .await
        .unwrap();

    assert!(resets.pending_hash("reset@example.com").await.unwrap().is_none());
    assert!(
        app.service
            .list_sessions(registered.user.id)
            .await
            .unwrap()
            .is_empty()
    );
    assert!(app.service.refresh(refresh_cmd(&other.refresh_token)).await.is_err());

    let err = app
        .service
        .reset_password(ResetPasswordCommand {
            reset_token: issued.reset_token,
            new_password: NEW_PASSWORD.into(),
        })
        .await
        .unwrap_err();
    assert_eq!(err, AppError::invalid_reset_token());
}

#[tokio::test]
async fn test_repeated_revocation_is_harmless() {
    let app = TestApp::new().await;
    let first = app.service.register(register_cmd("idem@example.com")).await.unwrap();
    let second = app
        .service
        .login(login_cmd("idem@example.com", PASSWORD))
        .await
        .unwrap();
    let user_id = first.user.id;

    let revoke = RevokeSessionCommand {
        user_id,
        session_id: first.session_id,
    };
    app.service.revoke_session(revoke.clone()).await.unwrap();
    app.service.revoke_session(revoke).await.unwrap();

    let claims = app
        .service
        .deps()
        .tokens
        .parse_access_token(&first.access_token)
        .unwrap();
    for _ in 0..2 {
        app.service
            .logout(LogoutCommand {
                user_id,
                token_id: claims.jti.clone(),
                token_expires_at: claims.exp,
                logout_all: false,
                refresh_token: Some(first.refresh_token.clone()),
            })
            .await
            .unwrap();
    }

    let sessions = app.service.list_sessions(user_id).await.unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].id, second.session_id);
}
