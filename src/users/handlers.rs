use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::dto::UserRequest;
use super::repo_types::User;
use crate::articles::repo_types::{Article, ArticleFilter};
use crate::auth::extractors::AuthUser;
use crate::error::AppError;
use crate::pagination::{PageQuery, PageResponse};
use crate::state::AppState;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/user/:id", get(get_user))
        .route("/user/:id/articles", get(list_user_articles))
}

pub fn write_routes() -> Router<AppState> {
    Router::new().route("/user/:id", axum::routing::post(create_user).put(update_user))
}

fn username(payload: &UserRequest) -> Result<String, AppError> {
    let name = payload.username.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("username is required".into()));
    }
    Ok(name.to_string())
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, AppError> {
    let user = state.users.find_by_id(id).await?.ok_or(AppError::NotFound)?;
    Ok(Json(user))
}

#[instrument(skip(state, page))]
pub async fn list_user_articles(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(page): Query<PageQuery>,
) -> Result<Json<PageResponse<Article>>, AppError> {
    let request = page.into_request(state.config.page);
    let page = state
        .articles
        .list_page(ArticleFilter::ByAuthor(id), &request)
        .await?;
    Ok(Json(page.into()))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UserRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let username = username(&payload)?;
    if state.users.find_by_id(id).await?.is_some() {
        return Err(AppError::Conflict(format!("user {id} already exists")));
    }
    let user = state.users.upsert(&User { id, username }).await?;
    info!(%caller, user_id = %user.id, "user created");
    Ok((StatusCode::CREATED, Json(user)))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UserRequest>,
) -> Result<Json<User>, AppError> {
    let username = username(&payload)?;
    let mut user = state.users.find_by_id(id).await?.ok_or(AppError::NotFound)?;
    user.username = username;
    let user = state.users.upsert(&user).await?;
    info!(%caller, user_id = %user.id, "user renamed");
    Ok(Json(user))
}
