use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Login credential of a user, one row per user.
///
/// `last_changed_at` is the invalidate-before watermark: every token whose
/// `iat` precedes it is rejected by the token gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Credential {
    pub user_id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 hash, not exposed in JSON
    #[serde(with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_changed_at: Option<OffsetDateTime>,
    pub email_confirmed: bool,
}

impl Credential {
    pub fn new(user_id: Uuid, email: String, password_hash: String, now: OffsetDateTime) -> Self {
        Self {
            user_id,
            email,
            password_hash,
            created_at: Some(now),
            last_changed_at: Some(now),
            email_confirmed: false,
        }
    }

    /// Replaces the hash and moves the watermark forward. The watermark never
    /// moves back, even if `now` lags behind the stored value.
    pub fn set_password_hash(&mut self, password_hash: String, now: OffsetDateTime) {
        self.password_hash = password_hash;
        self.last_changed_at = Some(match self.last_changed_at {
            Some(prev) if prev > now => prev,
            _ => now,
        });
    }

    /// True when a token issued at `issued_at` predates the last credential change.
    pub fn invalidates(&self, issued_at: OffsetDateTime) -> bool {
        matches!(self.last_changed_at, Some(changed) if changed > issued_at)
    }
}
