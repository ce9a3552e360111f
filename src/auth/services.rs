use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use super::gate::validate;
use super::jwt::{ExpiryCheck, TokenPair};
use super::password::{hash_password, verify_password};
use super::AuthError;
use crate::state::AppState;

/// Resolves a bearer token to its subject, applying the full gate.
pub async fn authenticate(state: &AppState, token: &str) -> Result<Uuid, AuthError> {
    let claims = validate(&state.keys, state.credentials.as_ref(), token, ExpiryCheck::Enforce).await?;
    Ok(claims.sub)
}

pub async fn login(state: &AppState, username: &str, password: &str) -> Result<TokenPair, AuthError> {
    let Some(user) = state.users.find_by_username(username).await? else {
        warn!(%username, "login unknown username");
        return Err(AuthError::InvalidCredentials);
    };
    let Some(credential) = state.credentials.get(user.id).await? else {
        warn!(user_id = %user.id, "login user has no credential");
        return Err(AuthError::InvalidCredentials);
    };
    if !verify_password(password, &credential.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AuthError::InvalidCredentials);
    }

    let pair = state.keys.issue(&user)?;
    info!(user_id = %user.id, "user logged in");
    Ok(pair)
}

/// Exchanges a refresh token for a new access token. The refresh token itself
/// is returned to the caller unchanged, so it is not rotated.
pub async fn refresh(state: &AppState, refresh_token: &str) -> Result<String, AuthError> {
    let claims = validate(
        &state.keys,
        state.credentials.as_ref(),
        refresh_token,
        ExpiryCheck::SkipForRefresh,
    )
    .await?;

    let Some(user) = state.users.find_by_id(claims.sub).await? else {
        warn!(user_id = %claims.sub, "refresh for deleted user");
        return Err(AuthError::UnknownSubject);
    };

    let token = state.keys.issue_access_at(&user, OffsetDateTime::now_utc())?;
    info!(user_id = %user.id, "access token refreshed");
    Ok(token)
}

/// Replaces the password after checking the old one. Bumping `last_changed_at`
/// in the same write invalidates every token issued before now.
pub async fn change_password(
    state: &AppState,
    user_id: Uuid,
    old_password: &str,
    new_password: &str,
) -> Result<(), AuthError> {
    let Some(mut credential) = state.credentials.get(user_id).await? else {
        return Err(AuthError::InvalidCredentials);
    };
    if !verify_password(old_password, &credential.password_hash)? {
        warn!(%user_id, "change_password wrong old password");
        return Err(AuthError::InvalidCredentials);
    }

    credential.set_password_hash(hash_password(new_password)?, OffsetDateTime::now_utc());
    state.credentials.upsert(&credential).await?;
    info!(%user_id, "password changed; earlier tokens invalidated");
    Ok(())
}
