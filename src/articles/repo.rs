use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;
use uuid::Uuid;

use crate::articles::repo_types::{Article, ArticleFilter, ArticleStatus};
use crate::error::StoreError;
use crate::pagination::{push_keyset, Page, PageRequest};

const ARTICLE_COLUMNS: &str =
    "a.id, a.author_id, a.title, a.content, a.created_at, a.updated_at, a.status";

#[async_trait]
pub trait ArticleStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Article>, StoreError>;

    /// Inserts or overwrites the article, then links it to those of `tag_ids`
    /// that exist. Existing links are never removed.
    async fn upsert(&self, article: &Article, tag_ids: &[Uuid]) -> Result<Article, StoreError>;

    /// Sets the status and returns the previous one, or `None` if the article is absent.
    async fn change_status(
        &self,
        id: Uuid,
        status: ArticleStatus,
    ) -> Result<Option<ArticleStatus>, StoreError>;

    async fn list_page(
        &self,
        filter: ArticleFilter,
        request: &PageRequest,
    ) -> Result<Page<Article>, StoreError>;
}

#[derive(Clone)]
pub struct PgArticles {
    db: PgPool,
}

impl PgArticles {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ArticleStore for PgArticles {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Article>, StoreError> {
        let article = sqlx::query_as::<_, Article>(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles a WHERE a.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(article)
    }

    async fn upsert(&self, article: &Article, tag_ids: &[Uuid]) -> Result<Article, StoreError> {
        let mut tx = self.db.begin().await?;

        let stored = sqlx::query_as::<_, Article>(
            r#"
            INSERT INTO articles AS a (id, author_id, title, content, created_at, updated_at, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
                author_id = EXCLUDED.author_id,
                title = EXCLUDED.title,
                content = EXCLUDED.content,
                updated_at = EXCLUDED.updated_at,
                status = EXCLUDED.status
            RETURNING a.id, a.author_id, a.title, a.content, a.created_at, a.updated_at, a.status
            "#,
        )
        .bind(article.id)
        .bind(article.author_id)
        .bind(&article.title)
        .bind(&article.content)
        .bind(article.created_at)
        .bind(article.updated_at)
        .bind(article.status)
        .fetch_one(&mut *tx)
        .await?;

        if !tag_ids.is_empty() {
            // Unknown tag ids fall out of the SELECT.
            sqlx::query(
                r#"
                INSERT INTO article_tags (article_id, tag_id)
                SELECT $1, t.id FROM tags t WHERE t.id = ANY($2)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(stored.id)
            .bind(tag_ids)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(stored)
    }

    async fn change_status(
        &self,
        id: Uuid,
        status: ArticleStatus,
    ) -> Result<Option<ArticleStatus>, StoreError> {
        // The FROM-self join exposes the pre-update row to RETURNING.
        let old = sqlx::query_scalar::<_, ArticleStatus>(
            r#"
            UPDATE articles a SET status = $2
            FROM articles prev
            WHERE a.id = $1 AND prev.id = a.id
            RETURNING prev.status
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.db)
        .await?;
        Ok(old)
    }

    async fn list_page(
        &self,
        filter: ArticleFilter,
        request: &PageRequest,
    ) -> Result<Page<Article>, StoreError> {
        let Some(fetch) = request.fetch_limit() else {
            return Ok(Page::empty());
        };

        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {ARTICLE_COLUMNS} FROM articles a"));
        match filter {
            ArticleFilter::All => {
                qb.push(" WHERE TRUE");
            }
            ArticleFilter::ByAuthor(author_id) => {
                qb.push(" WHERE a.author_id = ").push_bind(author_id);
            }
            ArticleFilter::ByTag(tag_id) => {
                qb.push(" JOIN article_tags art ON art.article_id = a.id WHERE art.tag_id = ")
                    .push_bind(tag_id);
            }
        }
        push_keyset(&mut qb, "a", request, fetch);

        let rows = qb.build_query_as::<Article>().fetch_all(&self.db).await?;
        debug!(?filter, fetched = rows.len(), limit = request.limit, "articles page");
        Ok(Page::from_overfetch(rows, request.limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::repo::TagStore;
    use crate::tags::repo_types::Tag;
    use crate::test::memory::MemoryStore;
    use std::collections::HashSet;
    use time::{macros::datetime, Duration, OffsetDateTime};

    fn article(author_id: Uuid, at: Option<OffsetDateTime>) -> Article {
        Article {
            id: Uuid::new_v4(),
            author_id,
            title: "t".into(),
            content: None,
            created_at: at,
            updated_at: at,
            status: ArticleStatus::Draft,
        }
    }

    async fn walk(store: &dyn ArticleStore, filter: ArticleFilter, limit: u32) -> Vec<Uuid> {
        let mut out = Vec::new();
        let mut request = PageRequest::first(limit);
        loop {
            let page = store.list_page(filter, &request).await.expect("page");
            out.extend(page.items.iter().map(|a| a.id));
            match page.next_cursor() {
                Some(cursor) => request = PageRequest::after(limit, cursor),
                None => return out,
            }
        }
    }

    #[tokio::test]
    async fn upsert_is_idempotent_and_keeps_created_at() {
        let store = MemoryStore::default();
        let t0 = datetime!(2024-01-01 0:00 UTC);
        let mut a = article(Uuid::new_v4(), Some(t0));
        let first = ArticleStore::upsert(&store, &a, &[]).await.expect("insert");
        let again = ArticleStore::upsert(&store, &a, &[]).await.expect("repeat");
        assert_eq!(first, again);

        a.title = "renamed".into();
        a.created_at = Some(t0 + Duration::days(1));
        let updated = ArticleStore::upsert(&store, &a, &[]).await.expect("update");
        assert_eq!(updated.title, "renamed");
        assert_eq!(updated.created_at, Some(t0));
    }

    #[tokio::test]
    async fn unknown_tags_are_ignored_on_link() {
        let store = MemoryStore::default();
        let tag = Tag {
            id: Uuid::new_v4(),
            name: "rust".into(),
            created_at: Some(OffsetDateTime::now_utc()),
        };
        TagStore::upsert(&store, &tag).await.expect("tag");
        let a = article(Uuid::new_v4(), Some(OffsetDateTime::now_utc()));
        ArticleStore::upsert(&store, &a, &[tag.id, Uuid::new_v4()])
            .await
            .expect("insert");

        let ids = walk(&store, ArticleFilter::ByTag(tag.id), 10).await;
        assert_eq!(ids, vec![a.id]);
    }

    #[tokio::test]
    async fn change_status_reports_previous() {
        let store = MemoryStore::default();
        let a = article(Uuid::new_v4(), None);
        ArticleStore::upsert(&store, &a, &[]).await.expect("insert");

        let prev = store.change_status(a.id, ArticleStatus::Published).await.expect("change");
        assert_eq!(prev, Some(ArticleStatus::Draft));
        let prev = store.change_status(a.id, ArticleStatus::Hidden).await.expect("change");
        assert_eq!(prev, Some(ArticleStatus::Published));
        assert_eq!(
            store.change_status(Uuid::new_v4(), ArticleStatus::Hidden).await.expect("change"),
            None
        );
    }

    #[tokio::test]
    async fn author_walk_survives_concurrent_inserts() {
        let store = MemoryStore::default();
        let author = Uuid::new_v4();
        let other = Uuid::new_v4();
        let base = datetime!(2024-03-01 0:00 UTC);

        let mut expected = HashSet::new();
        for i in 0..7 {
            let a = article(author, Some(base + Duration::minutes(i)));
            expected.insert(a.id);
            ArticleStore::upsert(&store, &a, &[]).await.expect("seed");
        }
        // Same timestamp as an existing row: only the id breaks the tie.
        let twin = article(author, Some(base + Duration::minutes(3)));
        expected.insert(twin.id);
        ArticleStore::upsert(&store, &twin, &[]).await.expect("seed");
        // Missing timestamp sorts last.
        let undated = article(author, None);
        expected.insert(undated.id);
        ArticleStore::upsert(&store, &undated, &[]).await.expect("seed");

        let mut seen = Vec::new();
        let mut request = PageRequest::first(3);
        loop {
            let page = ArticleStore::list_page(&store, ArticleFilter::ByAuthor(author), &request)
                .await
                .expect("page");
            seen.extend(page.items.iter().map(|a| a.id));
            // Newer rows for both authors land between page fetches.
            let now = OffsetDateTime::now_utc();
            ArticleStore::upsert(&store, &article(author, Some(now)), &[]).await.expect("insert");
            ArticleStore::upsert(&store, &article(other, Some(now)), &[]).await.expect("insert");
            match page.next_cursor() {
                Some(cursor) => request = PageRequest::after(3, cursor),
                None => break,
            }
        }

        assert_eq!(seen.len(), expected.len(), "no duplicates and no gaps");
        assert_eq!(seen.iter().copied().collect::<HashSet<_>>(), expected);
        assert_eq!(seen.last(), Some(&undated.id));
    }

    #[tokio::test]
    async fn zero_limit_is_empty_without_touching_the_store() {
        let store = MemoryStore::default();
        ArticleStore::upsert(&store, &article(Uuid::new_v4(), None), &[]).await.expect("seed");
        store.set_unavailable(true);
        let page = ArticleStore::list_page(&store, ArticleFilter::All, &PageRequest::first(0))
            .await
            .expect("empty page");
        assert!(page.items.is_empty());
        assert!(!page.has_more);
    }
}
