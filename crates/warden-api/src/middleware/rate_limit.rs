//! Token bucket admission control for the public routes.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use warden_core::error::AppError;

use crate::error::ApiError;
use crate::extractors::client_ip;
use crate::state::AppState;

/// Bucket key for requests whose client address is unknown.
const UNKNOWN_CLIENT: &str = "unknown";

/// Rejects requests over the per-client rate with 429 and `Retry-After`.
pub async fn rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if !state.rate_limit_enabled {
        return next.run(request).await;
    }

    let key = client_ip(request.headers(), request.extensions())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string());

    if !state.rate_limiter.allow(&key) {
        let retry_after = state.rate_limiter.retry_after(&key);
        warn!(client = %key, path = %request.uri().path(), "Rate limit exceeded");
        return ApiError(AppError::rate_limited(retry_after)).into_response();
    }

    next.run(request).await
}
