//! Service API endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use super::{created, message, ApiJson, ApiResult, Created, MessageResponse};
use crate::db::Filter;
use crate::models::{optional, CreateServiceRequest, ServiceItem, UpdateServiceRequest};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CategoryQuery {
    #[serde(default)]
    pub category: Option<String>,
}

impl CategoryQuery {
    pub fn filter(self) -> Option<Filter> {
        optional(self.category).map(|category| Filter::eq("category", category))
    }

    /// Filter from a `/category/{category}` path segment, normalized like the query.
    pub fn from_path(category: String) -> Option<Filter> {
        Self {
            category: Some(category),
        }
        .filter()
    }
}

/// GET /api/service - List services, newest first.
pub async fn list_services(
    State(state): State<AppState>,
    Query(query): Query<CategoryQuery>,
) -> ApiResult<Vec<ServiceItem>> {
    Ok(Json(state.store.list(query.filter().as_ref()).await?))
}

/// GET /api/service/category/:category
pub async fn list_services_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> ApiResult<Vec<ServiceItem>> {
    let filter = CategoryQuery::from_path(category);
    Ok(Json(state.store.list(filter.as_ref()).await?))
}

/// GET /api/service/:id
pub async fn get_service(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ServiceItem> {
    Ok(Json(state.store.get(&id).await?))
}

/// POST /api/service
pub async fn create_service(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateServiceRequest>,
) -> Created<ServiceItem> {
    let service = request.into_service()?;
    state.store.insert(&service).await?;
    tracing::info!(id = %service.id, "Service created");
    Ok(created(service))
}

/// PUT /api/service/:id
pub async fn update_service(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateServiceRequest>,
) -> ApiResult<ServiceItem> {
    let mut service: ServiceItem = state.store.get(&id).await?;
    request.apply(&mut service);
    state.store.replace(&service).await?;
    Ok(Json(service))
}

/// DELETE /api/service/:id
pub async fn delete_service(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<MessageResponse> {
    state.store.delete::<ServiceItem>(&id, None).await?;
    tracing::info!(%id, "Service deleted");
    Ok(message("Service deleted successfully"))
}
