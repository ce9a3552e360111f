use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use super::dto::TagRequest;
use super::repo_types::Tag;
use crate::auth::extractors::AuthUser;
use crate::error::AppError;
use crate::pagination::{PageQuery, PageResponse};
use crate::state::AppState;

pub fn tag_routes() -> Router<AppState> {
    Router::new()
        .route("/tags", get(list_tags))
        .route("/tag", post(create_tag))
        .route("/tag/:id", put(rename_tag))
}

fn tag_name(payload: &TagRequest) -> Result<String, AppError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("tag name is required".into()));
    }
    Ok(name.to_string())
}

#[instrument(skip(state, page))]
pub async fn list_tags(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> Result<Json<PageResponse<Tag>>, AppError> {
    let request = page.into_request(state.config.page);
    let page = state.tags.list_page(&request).await?;
    Ok(Json(page.into()))
}

#[instrument(skip(state, payload))]
pub async fn create_tag(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Json(payload): Json<TagRequest>,
) -> Result<(StatusCode, Json<Tag>), AppError> {
    let tag = Tag {
        id: Uuid::new_v4(),
        name: tag_name(&payload)?,
        created_at: Some(OffsetDateTime::now_utc()),
    };
    let stored = state.tags.upsert(&tag).await?;
    info!(%caller, tag_id = %stored.id, name = %stored.name, "tag created");
    Ok((StatusCode::CREATED, Json(stored)))
}

#[instrument(skip(state, payload))]
pub async fn rename_tag(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<TagRequest>,
) -> Result<Json<Tag>, AppError> {
    let name = tag_name(&payload)?;
    let mut tag = state.tags.find_by_id(id).await?.ok_or(AppError::NotFound)?;
    tag.name = name;
    let stored = state.tags.upsert(&tag).await?;
    info!(%caller, tag_id = %id, "tag renamed");
    Ok(Json(stored))
}
