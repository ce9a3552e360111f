use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::pagination::{SeekCursor, Seekable};

/// Publication state, stored as SMALLINT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[repr(i16)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    Draft = 0,
    Published = 1,
    Hidden = 2,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Article {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub content: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
    pub status: ArticleStatus,
}

impl Seekable for Article {
    fn seek_key(&self) -> SeekCursor {
        SeekCursor::of(self.created_at, self.id)
    }
}

/// Base predicate of an article listing. A cursor from one filter must not be
/// reused with another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleFilter {
    All,
    ByAuthor(Uuid),
    ByTag(Uuid),
}
