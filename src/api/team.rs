//! Team member API endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use super::{created, message, ApiJson, ApiResult, Created, MessageResponse};
use crate::db::Filter;
use crate::models::{
    optional, CreateTeamMemberRequest, MemberType, TeamMember, UpdateTeamMemberRequest,
};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct TeamQuery {
    #[serde(default, rename = "type")]
    pub member_type: Option<String>,
}

/// GET /api/team - List team members, newest first.
pub async fn list_team(
    State(state): State<AppState>,
    Query(query): Query<TeamQuery>,
) -> ApiResult<Vec<TeamMember>> {
    let filter = match optional(query.member_type) {
        Some(raw) => Some(Filter::eq("type", MemberType::parse(&raw)?.as_str())),
        None => None,
    };
    Ok(Json(state.store.list(filter.as_ref()).await?))
}

/// GET /api/team/:id - Get a single team member.
pub async fn get_team_member(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<TeamMember> {
    Ok(Json(state.store.get(&id).await?))
}

/// POST /api/team - Create a team member.
pub async fn create_team_member(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateTeamMemberRequest>,
) -> Created<TeamMember> {
    let member = request.into_member()?;
    state.store.insert(&member).await?;
    tracing::info!(id = %member.id, "Team member created");
    Ok(created(member))
}

/// PUT /api/team/:id - Update a team member.
pub async fn update_team_member(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateTeamMemberRequest>,
) -> ApiResult<TeamMember> {
    let mut member: TeamMember = state.store.get(&id).await?;
    request.apply(&mut member)?;
    state.store.replace(&member).await?;
    Ok(Json(member))
}

/// DELETE /api/team/:id - Delete a team member.
pub async fn delete_team_member(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<MessageResponse> {
    state.store.delete::<TeamMember>(&id, None).await?;
    tracing::info!(%id, "Team member removed");
    Ok(message("Team member removed"))
}
