use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{
    CreateArticleRequest, StatusChangeResponse, StatusQuery, TagArticlesQuery,
    UpdateArticleRequest,
};
use super::repo_types::{Article, ArticleFilter, ArticleStatus};
use crate::auth::extractors::AuthUser;
use crate::error::AppError;
use crate::pagination::{PageQuery, PageResponse};
use crate::state::AppState;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/articles", get(list_articles))
        .route("/article/:id", get(get_article))
        .route("/tag/articles", get(list_tag_articles))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/article", post(create_article))
        .route(
            "/article/:id",
            axum::routing::put(update_article).patch(change_status),
        )
}

fn title(raw: &str) -> Result<String, AppError> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(AppError::BadRequest("title is required".into()));
    }
    Ok(title.to_string())
}

#[instrument(skip(state, page))]
pub async fn list_articles(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> Result<Json<PageResponse<Article>>, AppError> {
    let request = page.into_request(state.config.page);
    let page = state.articles.list_page(ArticleFilter::All, &request).await?;
    Ok(Json(page.into()))
}

#[instrument(skip(state, query))]
pub async fn list_tag_articles(
    State(state): State<AppState>,
    Query(query): Query<TagArticlesQuery>,
) -> Result<Json<PageResponse<Article>>, AppError> {
    let request = query.page().into_request(state.config.page);
    let page = state
        .articles
        .list_page(ArticleFilter::ByTag(query.tag_id), &request)
        .await?;
    Ok(Json(page.into()))
}

#[instrument(skip(state))]
pub async fn get_article(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Article>, AppError> {
    let article = state.articles.find_by_id(id).await?.ok_or(AppError::NotFound)?;
    Ok(Json(article))
}

/// POST /article: a new draft owned by the caller.
#[instrument(skip(state, payload))]
pub async fn create_article(
    State(state): State<AppState>,
    AuthUser(author_id): AuthUser,
    Json(payload): Json<CreateArticleRequest>,
) -> Result<(StatusCode, Json<Article>), AppError> {
    let now = OffsetDateTime::now_utc();
    let article = Article {
        id: Uuid::new_v4(),
        author_id,
        title: title(&payload.title)?,
        content: payload.content,
        created_at: Some(now),
        updated_at: Some(now),
        status: ArticleStatus::Draft,
    };
    let stored = state.articles.upsert(&article, &payload.tag_ids).await?;
    info!(%author_id, article_id = %stored.id, tags = payload.tag_ids.len(), "article created");
    Ok((StatusCode::CREATED, Json(stored)))
}

#[instrument(skip(state, payload))]
pub async fn update_article(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateArticleRequest>,
) -> Result<Json<Article>, AppError> {
    let title = title(&payload.title)?;
    let mut article = state.articles.find_by_id(id).await?.ok_or(AppError::NotFound)?;
    article.title = title;
    article.content = payload.content;
    article.updated_at = Some(OffsetDateTime::now_utc());
    let stored = state.articles.upsert(&article, &[]).await?;
    info!(%caller, article_id = %id, "article updated");
    Ok(Json(stored))
}

/// PATCH /article/:id?status=published|hidden
#[instrument(skip(state))]
pub async fn change_status(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<Uuid>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<StatusChangeResponse>, AppError> {
    if query.status == ArticleStatus::Draft {
        warn!(article_id = %id, "refusing to move article back to draft");
        return Err(AppError::BadRequest("status must be published or hidden".into()));
    }
    let previous_status = state
        .articles
        .change_status(id, query.status)
        .await?
        .ok_or(AppError::NotFound)?;
    info!(%caller, article_id = %id, ?previous_status, status = ?query.status, "article status changed");
    Ok(Json(StatusChangeResponse { previous_status }))
}
