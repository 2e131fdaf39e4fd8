//! Session management handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use uuid::Uuid;

use warden_entity::token::SessionInfo;
use warden_service::RevokeSessionCommand;

use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/auth/sessions
pub async fn list_sessions(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<SessionInfo>>>, ApiError> {
    let sessions = state.auth.list_sessions(auth.sub).await?;
    Ok(Json(ApiResponse::ok(sessions)))
}

/// DELETE /api/auth/sessions/{id}
pub async fn revoke_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state
        .auth
        .revoke_session(RevokeSessionCommand {
            user_id: auth.sub,
            session_id,
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
