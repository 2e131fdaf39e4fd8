//! Auth handlers: register, login, refresh, logout, password reset, me.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use warden_entity::token::AuthResponse;
use warden_service::{
    ForgotPasswordCommand, LoginCommand, LogoutCommand, RefreshTokenCommand, RegisterCommand,
    ResetPasswordCommand,
};

use crate::dto::request::{
    ForgotPasswordRequest, LoginRequest, LogoutRequest, RefreshRequest, RegisterRequest,
    ResetPasswordRequest,
};
use crate::dto::response::{ApiResponse, MeResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, ClientInfo, ValidatedJson};
use crate::state::AppState;

/// Answer to every forgot-password request, whether or not a token was issued.
const RESET_REQUESTED: &str = "If the account exists, a reset link has been sent";

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    client: ClientInfo,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse>>), ApiError> {
    let response = state
        .auth
        .register(RegisterCommand {
            email: req.email,
            password: req.password,
            full_name: req.full_name,
            ip_address: client.ip_address,
            user_agent: client.user_agent,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(response))))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    client: ClientInfo,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, ApiError> {
    let response = state
        .auth
        .login(LoginCommand {
            email: req.email,
            password: req.password,
            ip_address: client.ip_address,
            user_agent: client.user_agent,
        })
        .await?;
    Ok(Json(ApiResponse::ok(response)))
}

/// POST /api/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    client: ClientInfo,
    ValidatedJson(req): ValidatedJson<RefreshRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, ApiError> {
    let response = state
        .auth
        .refresh(RefreshTokenCommand {
            refresh_token: req.refresh_token,
            ip_address: client.ip_address,
            user_agent: client.user_agent,
        })
        .await?;
    Ok(Json(ApiResponse::ok(response)))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<LogoutRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .auth
        .logout(LogoutCommand {
            user_id: auth.sub,
            token_id: auth.jti.clone(),
            token_expires_at: auth.exp,
            logout_all: req.logout_all,
            refresh_token: req.refresh_token,
        })
        .await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Logged out successfully",
    ))))
}

/// POST /api/auth/forgot-password
///
/// The reset token is for out-of-band delivery and never appears in the
/// response.
pub async fn forgot_password(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ForgotPasswordRequest>,
) -> Result<(StatusCode, Json<ApiResponse<MessageResponse>>), ApiError> {
    state
        .auth
        .forgot_password(ForgotPasswordCommand { email: req.email })
        .await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse::ok(MessageResponse::new(RESET_REQUESTED))),
    ))
}

/// POST /api/auth/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ResetPasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .auth
        .reset_password(ResetPasswordCommand {
            reset_token: req.reset_token,
            new_password: req.new_password,
        })
        .await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Password has been reset",
    ))))
}

/// GET /api/auth/me
pub async fn me(auth: AuthUser) -> Json<ApiResponse<MeResponse>> {
    Json(ApiResponse::ok(MeResponse::from(auth.claims())))
}
