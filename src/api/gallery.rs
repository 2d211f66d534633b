//! Gallery API endpoints.
//!
//! Besides the generic routes, each item type has its own list, create and
//! type-scoped delete routes.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use super::{created, ApiJson, ApiResult, Created, MessageResponse};
use crate::db::Filter;
use crate::errors::AppError;
use crate::models::{
    optional, CreateGalleryItemRequest, GalleryItem, GalleryKind, UpdateGalleryItemRequest,
};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct GalleryQuery {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

async fn list_of_kind(state: &AppState, kind: Option<GalleryKind>) -> ApiResult<Vec<GalleryItem>> {
    let filter = kind.map(|kind| Filter::eq("type", kind.as_str()));
    Ok(Json(state.store.list(filter.as_ref()).await?))
}

async fn create_of_kind(
    state: &AppState,
    request: CreateGalleryItemRequest,
    kind: Option<GalleryKind>,
) -> Created<GalleryItem> {
    let item = request.into_item(kind)?;
    state.store.insert(&item).await?;
    tracing::info!(id = %item.id, kind = item.media.kind().as_str(), "Gallery item created");
    Ok(created(item))
}

async fn delete_of_kind(state: &AppState, id: &str, kind: GalleryKind) -> ApiResult<MessageResponse> {
    let filter = Filter::eq("type", kind.as_str());
    state
        .store
        .delete::<GalleryItem>(id, Some(&filter))
        .await
        .map_err(|e| match e {
            AppError::NotFound(_) | AppError::InvalidId(_) => {
                AppError::NotFound(format!("{} not found", kind.label()))
            }
            other => other,
        })?;
    tracing::info!(%id, kind = kind.as_str(), "Gallery item deleted");
    Ok(Json(MessageResponse {
        message: format!("{} deleted", kind.label()),
    }))
}

/// GET /api/gallery - List all items, optionally by `?type=`.
pub async fn list_gallery(
    State(state): State<AppState>,
    Query(query): Query<GalleryQuery>,
) -> ApiResult<Vec<GalleryItem>> {
    let kind = match optional(query.kind) {
        Some(raw) => Some(GalleryKind::parse(&raw)?),
        None => None,
    };
    list_of_kind(&state, kind).await
}

/// GET /api/gallery/type/:type
pub async fn list_gallery_by_type(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> ApiResult<Vec<GalleryItem>> {
    list_of_kind(&state, Some(GalleryKind::parse(&kind)?)).await
}

/// GET /api/gallery/images
pub async fn list_images(State(state): State<AppState>) -> ApiResult<Vec<GalleryItem>> {
    list_of_kind(&state, Some(GalleryKind::Image)).await
}

/// GET /api/gallery/videos
pub async fn list_videos(State(state): State<AppState>) -> ApiResult<Vec<GalleryItem>> {
    list_of_kind(&state, Some(GalleryKind::Video)).await
}

/// GET /api/gallery/events
pub async fn list_events(State(state): State<AppState>) -> ApiResult<Vec<GalleryItem>> {
    list_of_kind(&state, Some(GalleryKind::Event)).await
}

/// GET /api/gallery/:id
pub async fn get_gallery_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<GalleryItem> {
    Ok(Json(state.store.get(&id).await?))
}

/// POST /api/gallery - Create an item of the body's `type`.
pub async fn create_gallery_item(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateGalleryItemRequest>,
) -> Created<GalleryItem> {
    create_of_kind(&state, request, None).await
}

/// POST /api/gallery/images
pub async fn create_image(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateGalleryItemRequest>,
) -> Created<GalleryItem> {
    create_of_kind(&state, request, Some(GalleryKind::Image)).await
}

/// POST /api/gallery/videos
pub async fn create_video(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateGalleryItemRequest>,
) -> Created<GalleryItem> {
    create_of_kind(&state, request, Some(GalleryKind::Video)).await
}

/// POST /api/gallery/events
pub async fn create_event(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateGalleryItemRequest>,
) -> Created<GalleryItem> {
    create_of_kind(&state, request, Some(GalleryKind::Event)).await
}

/// PUT /api/gallery/:id
pub async fn update_gallery_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateGalleryItemRequest>,
) -> ApiResult<GalleryItem> {
    let mut item: GalleryItem = state.store.get(&id).await?;
    request.apply(&mut item)?;
    state.store.replace(&item).await?;
    Ok(Json(item))
}

/// DELETE /api/gallery/:id
pub async fn delete_gallery_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<MessageResponse> {
    state.store.delete::<GalleryItem>(&id, None).await?;
    tracing::info!(%id, "Gallery item deleted");
    Ok(Json(MessageResponse {
        message: "Gallery item deleted".to_string(),
    }))
}

/// DELETE /api/gallery/images/:id
pub async fn delete_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<MessageResponse> {
    delete_of_kind(&state, &id, GalleryKind::Image).await
}

/// DELETE /api/gallery/videos/:id
pub async fn delete_video(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<MessageResponse> {
    delete_of_kind(&state, &id, GalleryKind::Video).await
}

/// DELETE /api/gallery/events/:id
pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<MessageResponse> {
    delete_of_kind(&state, &id, GalleryKind::Event).await
}
