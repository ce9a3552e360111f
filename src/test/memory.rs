use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::articles::repo::ArticleStore;
use crate::articles::repo_types::{Article, ArticleFilter, ArticleStatus};
use crate::credentials::repo::CredentialStore;
use crate::credentials::repo_types::Credential;
use crate::error::StoreError;
use crate::pagination::{paginate, Page, PageRequest};
use crate::tags::repo::TagStore;
use crate::tags::repo_types::Tag;
use crate::users::repo::UserStore;
use crate::users::repo_types::User;

/// In-memory stand-in for every store, with the same upsert rules as Postgres.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    credentials: RwLock<HashMap<Uuid, Credential>>,
    articles: RwLock<HashMap<Uuid, Article>>,
    tags: RwLock<HashMap<Uuid, Tag>>,
    article_tags: RwLock<HashSet<(Uuid, Uuid)>>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn set_unavailable(&self, down: bool) {
        self.unavailable.store(down, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store switched off".into()));
        }
        Ok(())
    }

    /// Drops the user row only, leaving the credential orphaned.
    pub async fn remove_user(&self, id: Uuid) {
        self.users.write().await.remove(&id);
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        self.check()?;
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        self.check()?;
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn upsert(&self, user: &User) -> Result<User, StoreError> {
        self.check()?;
        let mut users = self.users.write().await;
        if users
            .values()
            .any(|u| u.id != user.id && u.username == user.username)
        {
            return Err(StoreError::Conflict("users_username_key".into()));
        }
        users.insert(user.id, user.clone());
        Ok(user.clone())
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn get(&self, user_id: Uuid) -> Result<Option<Credential>, StoreError> {
        self.check()?;
        Ok(self.credentials.read().await.get(&user_id).cloned())
    }

    async fn upsert(&self, credential: &Credential) -> Result<Credential, StoreError> {
        self.check()?;
        let mut credentials = self.credentials.write().await;
        if credentials
            .values()
            .any(|c| c.user_id != credential.user_id && c.email == credential.email)
        {
            return Err(StoreError::Conflict("user_credentials_email_key".into()));
        }
        let mut stored = credential.clone();
        if let Some(existing) = credentials.get(&credential.user_id) {
            stored.created_at = existing.created_at;
            stored.last_changed_at = existing.last_changed_at.max(credential.last_changed_at);
        }
        credentials.insert(stored.user_id, stored.clone());
        Ok(stored)
    }
}

#[async_trait]
impl TagStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Tag>, StoreError> {
        self.check()?;
        Ok(self.tags.read().await.get(&id).cloned())
    }

    async fn upsert(&self, tag: &Tag) -> Result<Tag, StoreError> {
        self.check()?;
        let mut tags = self.tags.write().await;
        if tags.values().any(|t| t.id != tag.id && t.name == tag.name) {
            return Err(StoreError::Conflict("tags_name_key".into()));
        }
        let mut stored = tag.clone();
        if let Some(existing) = tags.get(&tag.id) {
            stored.created_at = existing.created_at;
        }
        tags.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn list_page(&self, request: &PageRequest) -> Result<Page<Tag>, StoreError> {
        if request.fetch_limit().is_none() {
            return Ok(Page::empty());
        }
        self.check()?;
        let tags = self.tags.read().await;
        Ok(paginate(tags.values().cloned(), request))
    }
}

#[async_trait]
impl ArticleStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Article>, StoreError> {
        self.check()?;
        Ok(self.articles.read().await.get(&id).cloned())
    }

    async fn upsert(&self, article: &Article, tag_ids: &[Uuid]) -> Result<Article, StoreError> {
        self.check()?;
        let mut articles = self.articles.write().await;
        let mut stored = article.clone();
        if let Some(existing) = articles.get(&article.id) {
            stored.created_at = existing.created_at;
        }
        articles.insert(stored.id, stored.clone());

        let tags = self.tags.read().await;
        let mut links = self.article_tags.write().await;
        for tag_id in tag_ids.iter().filter(|id| tags.contains_key(id)) {
            links.insert((stored.id, *tag_id));
        }
        Ok(stored)
    }

    async fn change_status(
        &self,
        id: Uuid,
        status: ArticleStatus,
    ) -> Result<Option<ArticleStatus>, StoreError> {
        self.check()?;
        let mut articles = self.articles.write().await;
        Ok(articles
            .get_mut(&id)
            .map(|a| std::mem::replace(&mut a.status, status)))
    }

    async fn list_page(
        &self,
        filter: ArticleFilter,
        request: &PageRequest,
    ) -> Result<Page<Article>, StoreError> {
        if request.fetch_limit().is_none() {
            return Ok(Page::empty());
        }
        self.check()?;
        let articles = self.articles.read().await;
        let links = self.article_tags.read().await;
        let rows = articles.values().filter(|a| match filter {
            ArticleFilter::All => true,
            ArticleFilter::ByAuthor(author_id) => a.author_id == author_id,
            ArticleFilter::ByTag(tag_id) => links.contains(&(a.id, tag_id)),
        });
        Ok(paginate(rows.cloned(), request))
    }
}
