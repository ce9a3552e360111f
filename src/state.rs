use std::sync::Arc;

use sqlx::PgPool;

use crate::articles::repo::{ArticleStore, PgArticles};
use crate::auth::JwtKeys;
use crate::config::AppConfig;
use crate::credentials::repo::{CredentialStore, PgCredentials};
use crate::tags::repo::{PgTags, TagStore};
use crate::users::repo::{PgUsers, UserStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub keys: JwtKeys,
    pub users: Arc<dyn UserStore>,
    pub credentials: Arc<dyn CredentialStore>,
    pub articles: Arc<dyn ArticleStore>,
    pub tags: Arc<dyn TagStore>,
}

impl AppState {
    /// Postgres-backed state sharing one pool across all stores.
    pub fn with_pool(config: Arc<AppConfig>, db: PgPool) -> Self {
        Self::from_parts(
            config,
            Arc::new(PgUsers::new(db.clone())),
            Arc::new(PgCredentials::new(db.clone())),
            Arc::new(PgArticles::new(db.clone())),
            Arc::new(PgTags::new(db)),
        )
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserStore>,
        credentials: Arc<dyn CredentialStore>,
        articles: Arc<dyn ArticleStore>,
        tags: Arc<dyn TagStore>,
    ) -> Self {
        let keys = JwtKeys::from_config(&config.jwt);
        Self {
            config,
            keys,
            users,
            credentials,
            articles,
            tags,
        }
    }
}
