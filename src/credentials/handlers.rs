use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{CreateCredentialRequest, UpdateCredentialRequest};
use super::repo_types::Credential;
use crate::auth::extractors::AuthUser;
use crate::auth::password::{hash_password, is_valid_email, MIN_PASSWORD_LEN};
use crate::error::AppError;
use crate::state::AppState;

pub fn credential_routes() -> Router<AppState> {
    Router::new().route(
        "/usercredential/:id",
        get(get_credential).post(create_credential).put(update_credential),
    )
}

fn normalize_email(raw: &str) -> Result<String, AppError> {
    let email = raw.trim().to_lowercase();
    if !is_valid_email(&email) {
        warn!(%email, "invalid email");
        return Err(AppError::BadRequest("invalid email".into()));
    }
    Ok(email)
}

fn check_password(password: &str) -> Result<(), AppError> {
    if password.len() < MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err(AppError::BadRequest(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

#[instrument(skip(state))]
pub async fn get_credential(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Credential>, AppError> {
    let credential = state.credentials.get(id).await?.ok_or(AppError::NotFound)?;
    Ok(Json(credential))
}

#[instrument(skip(state, payload))]
pub async fn create_credential(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateCredentialRequest>,
) -> Result<(StatusCode, Json<Credential>), AppError> {
    let email = normalize_email(&payload.email)?;
    check_password(&payload.password)?;

    if state.users.find_by_id(id).await?.is_none() {
        return Err(AppError::NotFound);
    }
    if state.credentials.get(id).await?.is_some() {
        return Err(AppError::Conflict(format!("credential for {id} already exists")));
    }

    let hash = hash_password(&payload.password)?;
    let credential = Credential::new(id, email, hash, OffsetDateTime::now_utc());
    let stored = state.credentials.upsert(&credential).await?;
    info!(%caller, user_id = %id, "credential created");
    Ok((StatusCode::CREATED, Json(stored)))
}

#[instrument(skip(state, payload))]
pub async fn update_credential(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCredentialRequest>,
) -> Result<Json<Credential>, AppError> {
    let email = normalize_email(&payload.email)?;
    let password = payload.password.as_deref().filter(|p| !p.is_empty());
    if let Some(password) = password {
        check_password(password)?;
    }

    let mut credential = state.credentials.get(id).await?.ok_or(AppError::NotFound)?;
    credential.email = email;
    if let Some(password) = password {
        credential.set_password_hash(hash_password(password)?, OffsetDateTime::now_utc());
        info!(%caller, user_id = %id, "password replaced; earlier tokens invalidated");
    }
    let stored = state.credentials.upsert(&credential).await?;
    Ok(Json(stored))
}
