//! Token validation with password-change invalidation.
//!
//! A token passes when its signature and (unless relaxed) expiry check out,
//! its subject still has a credential, and that credential has not changed
//! since the token's `iat`. Nothing about individual tokens is stored; the
//! credential's `last_changed_at` is the only state consulted.

use tracing::{debug, warn};

use super::claims::Claims;
use super::jwt::{ExpiryCheck, JwtKeys};
use super::AuthError;
use crate::credentials::repo::CredentialStore;

pub async fn validate(
    keys: &JwtKeys,
    credentials: &dyn CredentialStore,
    token: &str,
    expiry: ExpiryCheck,
) -> Result<Claims, AuthError> {
    let claims = match keys.verify(token, expiry) {
        Ok(claims) => claims,
        Err(e) => {
            debug!(error = %e, "token failed verification");
            return Err(e.into());
        }
    };
    let issued_at = claims.issued_at()?;

    let Some(credential) = credentials.get(claims.sub).await? else {
        warn!(user_id = %claims.sub, "token subject has no credential");
        return Err(AuthError::UnknownSubject);
    };

    if credential.invalidates(issued_at) {
        warn!(
            user_id = %claims.sub,
            jti = %claims.jti,
            iat = claims.iat,
            "token predates last credential change"
        );
        return Err(AuthError::Stale);
    }

    Ok(claims)
}
