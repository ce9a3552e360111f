use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::TokenError;

/// JWT payload shared by access and refresh tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,    // user ID
    pub name: String, // username at issue time
    pub jti: Uuid,    // random per token, not tracked anywhere
    pub iat: i64,     // issued at (unix seconds)
    pub exp: i64,     // expires at (unix seconds)
    pub iss: String,  // issuer
    pub aud: String,  // audience
}

impl Claims {
    pub fn issued_at(&self) -> Result<OffsetDateTime, TokenError> {
        OffsetDateTime::from_unix_timestamp(self.iat)
            .map_err(|e| TokenError::Claims(format!("iat out of range: {e}")))
    }
}
