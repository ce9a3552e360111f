use crate::error::StoreError;
use crate::state::AppState;
use axum::Router;

mod claims;
mod dto;
pub(crate) mod extractors;
pub mod gate;
pub mod handlers;
pub mod jwt;
pub mod password;
pub mod services;

pub use jwt::{JwtKeys, TokenError};

/// Why a login, refresh or authenticated request was refused. Callers only
/// ever see a generic rejection; the variant is for logs and tests.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("token rejected: {0}")]
    Token(#[from] TokenError),

    #[error("token subject has no credential")]
    UnknownSubject,

    #[error("token issued before the last credential change")]
    Stale,

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("internal: {0}")]
    Internal(String),
}

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
