use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use tracing::{instrument, warn};

use super::dto::{ChangePasswordRequest, LoginRequest, LoginResponse, RefreshRequest, RefreshResponse};
use super::extractors::AuthUser;
use super::password::MIN_PASSWORD_LEN;
use super::{services, AuthError};
use crate::error::AppError;
use crate::state::AppState;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/refresh-token", post(refresh))
        .route("/change-password", post(change_password))
}

#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let username = payload.username.trim();
    if username.is_empty() || payload.password.is_empty() {
        return Err(AppError::BadRequest("username and password are required".into()));
    }

    let pair = services::login(&state, username, &payload.password).await?;
    Ok(Json(LoginResponse {
        token: pair.access_token,
        refresh_token: pair.refresh_token,
    }))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>, AppError> {
    let token = services::refresh(&state, payload.refresh_token.trim()).await?;
    Ok(Json(RefreshResponse { token }))
}

#[instrument(skip(state, payload))]
pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<StatusCode, AppError> {
    if payload.new_password.len() < MIN_PASSWORD_LEN {
        warn!(%user_id, "new password too short");
        return Err(AppError::BadRequest(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    match services::change_password(&state, user_id, &payload.old_password, &payload.new_password)
        .await
    {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        // The caller is already authenticated; a wrong old password is a bad request.
        Err(AuthError::InvalidCredentials) => {
            Err(AppError::BadRequest("old password does not match".into()))
        }
        Err(e) => Err(e.into()),
    }
}
