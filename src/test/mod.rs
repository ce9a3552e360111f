//! Shared fixtures for unit and router tests.

pub mod memory;

use std::sync::Arc;

use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::auth::password::hash_password;
use crate::config::{AppConfig, JwtConfig, PageConfig};
use crate::credentials::repo_types::Credential;
use crate::state::AppState;
use crate::users::repo_types::User;
use memory::MemoryStore;

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://unused".into(),
        database_max_connections: 1,
        jwt: JwtConfig {
            secret: "test-secret".into(),
            issuer: "test-issuer".into(),
            audience: "test-aud".into(),
            ttl_minutes: 30,
            refresh_ttl_minutes: 60 * 24 * 7,
        },
        page: PageConfig::default(),
    }
}

/// State backed by one in-memory store; the store is returned for direct seeding.
pub fn test_state() -> (AppState, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::default());
    let state = AppState::from_parts(
        Arc::new(test_config()),
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
    );
    (state, store)
}

/// Creates a user with a credential whose watermark sits well in the past
/// (whole seconds), so tokens minted during a test are never stale by accident.
pub async fn seed_user(state: &AppState, username: &str, password: &str) -> User {
    let user = state
        .users
        .upsert(&User {
            id: Uuid::new_v4(),
            username: username.into(),
        })
        .await
        .expect("seed user");
    let since = OffsetDateTime::from_unix_timestamp(
        (OffsetDateTime::now_utc() - Duration::days(60)).unix_timestamp(),
    )
    .expect("timestamp");
    let credential = Credential::new(
        user.id,
        format!("{username}@example.com"),
        hash_password(password).expect("hash"),
        since,
    );
    state.credentials.upsert(&credential).await.expect("seed credential");
    user
}
