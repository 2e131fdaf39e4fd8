//! `AuthUser` extractor: pulls the bearer token, validates it, and checks the blacklist.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use tracing::debug;

use warden_auth::{AccessClaims, TokenError};
use warden_core::error::AppError;

use crate::error::ApiError;
use crate::state::AppState;

/// Claims of a validated, non-revoked access token.
#[derive(Debug, Clone)]
pub struct AuthUser(pub AccessClaims);

impl AuthUser {
    /// Returns the inner claims.
    pub fn claims(&self) -> &AccessClaims {
        &self.0
    }
}

impl std::ops::Deref for AuthUser {
    type Target = AccessClaims;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::unauthorized("Missing bearer token"))?;

        let claims = state.tokens.parse_access_token(bearer.token())?;

        if state.blacklist.is_blacklisted(&claims.jti).await? {
            debug!(jti = %claims.jti, "Blacklisted access token presented");
            return Err(TokenError::Revoked.into());
        }

        Ok(Self(claims))
    }
}
