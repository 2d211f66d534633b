//! Blog API endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use super::{created, message, ApiJson, ApiResult, Created, MessageResponse};
use crate::db::Filter;
use crate::models::{
    optional, BlogPost, BlogStatus, CreateBlogPostRequest, UpdateBlogPostRequest,
};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct BlogQuery {
    #[serde(default)]
    pub status: Option<String>,
}

/// GET /api/blog - List posts, newest first.
pub async fn list_blog_posts(
    State(state): State<AppState>,
    Query(query): Query<BlogQuery>,
) -> ApiResult<Vec<BlogPost>> {
    let filter = match optional(query.status) {
        Some(raw) => Some(Filter::eq("status", BlogStatus::parse(&raw)?.as_str())),
        None => None,
    };
    Ok(Json(state.store.list(filter.as_ref()).await?))
}

/// GET /api/blog/published - List published posts.
pub async fn list_published_posts(State(state): State<AppState>) -> ApiResult<Vec<BlogPost>> {
    let filter = Filter::eq("status", BlogStatus::Published.as_str());
    Ok(Json(state.store.list(Some(&filter)).await?))
}

/// GET /api/blog/:id
pub async fn get_blog_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<BlogPost> {
    Ok(Json(state.store.get(&id).await?))
}

/// POST /api/blog - Create a draft post.
pub async fn create_blog_post(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateBlogPostRequest>,
) -> Created<BlogPost> {
    let post = request.into_post()?;
    state.store.insert(&post).await?;
    tracing::info!(id = %post.id, "Blog post created");
    Ok(created(post))
}

/// PUT /api/blog/:id
pub async fn update_blog_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateBlogPostRequest>,
) -> ApiResult<BlogPost> {
    let mut post: BlogPost = state.store.get(&id).await?;
    request.apply(&mut post)?;
    state.store.replace(&post).await?;
    Ok(Json(post))
}

/// DELETE /api/blog/:id
pub async fn delete_blog_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<MessageResponse> {
    state.store.delete::<BlogPost>(&id, None).await?;
    tracing::info!(%id, "Blog post deleted");
    Ok(message("Blog post deleted successfully"))
}
