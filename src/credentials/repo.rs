use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::credentials::repo_types::Credential;
use crate::error::StoreError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get(&self, user_id: Uuid) -> Result<Option<Credential>, StoreError>;

    /// Inserts the credential or overwrites the mutable fields of the existing
    /// row in one statement. `last_changed_at` never decreases.
    async fn upsert(&self, credential: &Credential) -> Result<Credential, StoreError>;
}

#[derive(Clone)]
pub struct PgCredentials {
    db: PgPool,
}

impl PgCredentials {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CredentialStore for PgCredentials {
    async fn get(&self, user_id: Uuid) -> Result<Option<Credential>, StoreError> {
        let credential = sqlx::query_as::<_, Credential>(
            r#"
            SELECT user_id, email, password_hash, created_at, last_changed_at, email_confirmed
            FROM user_credentials
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(credential)
    }

    async fn upsert(&self, credential: &Credential) -> Result<Credential, StoreError> {
        let stored = sqlx::query_as::<_, Credential>(
            r#"
            INSERT INTO user_credentials
                (user_id, email, password_hash, created_at, last_changed_at, email_confirmed)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id) DO UPDATE SET
                email = EXCLUDED.email,
                password_hash = EXCLUDED.password_hash,
                last_changed_at = GREATEST(user_credentials.last_changed_at, EXCLUDED.last_changed_at),
                email_confirmed = EXCLUDED.email_confirmed
            RETURNING user_id, email, password_hash, created_at, last_changed_at, email_confirmed
            "#,
        )
        .bind(credential.user_id)
        .bind(&credential.email)
        .bind(&credential.password_hash)
        .bind(credential.created_at)
        .bind(credential.last_changed_at)
        .bind(credential.email_confirmed)
        .fetch_one(&self.db)
        .await?;
        Ok(stored)
    }
}
