use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo_types::ArticleStatus;
use crate::pagination::PageQuery;

#[derive(Debug, Deserialize)]
pub struct CreateArticleRequest {
    pub title: String,
    pub content: Option<String>,
    #[serde(default)]
    pub tag_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateArticleRequest {
    pub title: String,
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub status: ArticleStatus,
}

#[derive(Debug, Serialize)]
pub struct StatusChangeResponse {
    pub previous_status: ArticleStatus,
}

/// `?tag_id=<uuid>&start=<cursor>&limit=<n>`
#[derive(Debug, Deserialize)]
pub struct TagArticlesQuery {
    pub tag_id: Uuid,
    pub start: Option<String>,
    #[serde(default, deserialize_with = "crate::pagination::lenient_limit")]
    pub limit: Option<u32>,
}

impl TagArticlesQuery {
    pub fn page(&self) -> PageQuery {
        PageQuery {
            start: self.start.clone(),
            limit: self.limit,
        }
    }
}
