use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tracing::debug;
use uuid::Uuid;

use super::services::authenticate;
use crate::error::AppError;
use crate::state::AppState;

/// Extracts the bearer token and runs it through the token gate, returning the user ID.
pub struct AuthUser(pub Uuid);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(auth) = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
        else {
            debug!("missing Authorization header");
            return Err(AppError::Unauthorized);
        };

        let Some(token) = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
        else {
            debug!("invalid auth scheme");
            return Err(AppError::Unauthorized);
        };

        let user_id = authenticate(state, token.trim()).await?;
        Ok(AuthUser(user_id))
    }
}
