use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;
use uuid::Uuid;

use crate::error::StoreError;
use crate::pagination::{push_keyset, Page, PageRequest};
use crate::tags::repo_types::Tag;

#[async_trait]
pub trait TagStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Tag>, StoreError>;
    /// Inserts the tag or renames the existing one; `created_at` is kept as first stored.
    async fn upsert(&self, tag: &Tag) -> Result<Tag, StoreError>;
    async fn list_page(&self, request: &PageRequest) -> Result<Page<Tag>, StoreError>;
}

#[derive(Clone)]
pub struct PgTags {
    db: PgPool,
}

impl PgTags {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TagStore for PgTags {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Tag>, StoreError> {
        let tag = sqlx::query_as::<_, Tag>(r#"SELECT id, name, created_at FROM tags WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(tag)
    }

    async fn upsert(&self, tag: &Tag) -> Result<Tag, StoreError> {
        let tag = sqlx::query_as::<_, Tag>(
            r#"
            INSERT INTO tags (id, name, created_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name
            RETURNING id, name, created_at
            "#,
        )
        .bind(tag.id)
        .bind(&tag.name)
        .bind(tag.created_at)
        .fetch_one(&self.db)
        .await?;
        Ok(tag)
    }

    async fn list_page(&self, request: &PageRequest) -> Result<Page<Tag>, StoreError> {
        let Some(fetch) = request.fetch_limit() else {
            return Ok(Page::empty());
        };
        let mut qb = QueryBuilder::<Postgres>::new("SELECT t.id, t.name, t.created_at FROM tags t WHERE TRUE");
        push_keyset(&mut qb, "t", request, fetch);
        let rows = qb.build_query_as::<Tag>().fetch_all(&self.db).await?;
        debug!(fetched = rows.len(), limit = request.limit, "tags page");
        Ok(Page::from_overfetch(rows, request.limit))
    }
}
