use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::{validate_id, validate_name};
use super::{ApiError, ApiResponse, AppState, MessageResponse, TeamDto, TeamMemberDto};
use crate::db::User;

#[derive(Deserialize)]
pub struct WorkspaceQuery {
    pub workspace_id: i32,
}

#[derive(Deserialize)]
pub struct CreateTeamRequest {
    pub workspace_id: i32,
    pub name: String,
    pub description: Option<String>,
}

/// GET /teams?workspace_id=
pub async fn list_teams(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Query(query): Query<WorkspaceQuery>,
) -> Result<Json<ApiResponse<Vec<TeamDto>>>, ApiError> {
    validate_id("workspace", query.workspace_id)?;
    let teams = state.team_service().list(&user, query.workspace_id).await?;
    Ok(Json(ApiResponse::success(
        teams.into_iter().map(TeamDto::from).collect(),
    )))
}

/// POST /teams
pub async fn create_team(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(payload): Json<CreateTeamRequest>,
) -> Result<Json<ApiResponse<TeamDto>>, ApiError> {
    validate_id("workspace", payload.workspace_id)?;
    let name = validate_name("Team name", &payload.name)?.to_string();

    let team = state
        .team_service()
        .create(&user, payload.workspace_id, name, payload.description)
        .await?;

    Ok(Json(ApiResponse::success(team.into())))
}

/// GET /teams/{id}/members
pub async fn list_members(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<TeamMemberDto>>>, ApiError> {
    validate_id("team", id)?;
    let members = state.team_service().members(&user, id).await?;
    Ok(Json(ApiResponse::success(
        members.into_iter().map(TeamMemberDto::from).collect(),
    )))
}

/// DELETE /teams/{id}/members/{user_id}
pub async fn remove_member(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path((id, user_id)): Path<(i32, i32)>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    validate_id("team", id)?;
    validate_id("user", user_id)?;
    state.team_service().remove_member(&user, id, user_id).await?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Member removed".to_string(),
    })))
}
