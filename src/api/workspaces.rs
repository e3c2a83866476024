use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::{validate_color, validate_id, validate_name, validate_pagination};
use super::{
    ActivityResponse, ApiError, ApiResponse, AppState, CreatedWorkspaceDto, MessageResponse,
    WorkspaceDto,
};
use crate::db::User;
use crate::db::repositories::workspace::WorkspaceChanges;
use crate::services::workspace_service::CreateWorkspace;

const DEFAULT_COLOR: &str = "#3b82f6";

#[derive(Deserialize)]
pub struct CreateWorkspaceRequest {
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateWorkspaceRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
}

#[derive(Deserialize)]
pub struct ActivityQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

/// GET /workspaces
pub async fn list_workspaces(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<Json<ApiResponse<Vec<WorkspaceDto>>>, ApiError> {
    let workspaces = state.workspace_service().list(&user).await?;
    Ok(Json(ApiResponse::success(
        workspaces.into_iter().map(WorkspaceDto::from).collect(),
    )))
}

/// POST /workspaces
pub async fn create_workspace(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(payload): Json<CreateWorkspaceRequest>,
) -> Result<Json<ApiResponse<CreatedWorkspaceDto>>, ApiError> {
    let name = validate_name("Workspace name", &payload.name)?.to_string();
    let color = match payload.color.as_deref() {
        Some(color) => validate_color(color)?.to_string(),
        None => DEFAULT_COLOR.to_string(),
    };

    let (workspace, team) = state
        .workspace_service()
        .create(
            &user,
            CreateWorkspace {
                name,
                description: payload.description,
                color,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(CreatedWorkspaceDto {
        workspace: workspace.into(),
        default_team: team.into(),
    })))
}

/// GET /workspaces/{id}
pub async fn get_workspace(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<WorkspaceDto>>, ApiError> {
    validate_id("workspace", id)?;
    let workspace = state.workspace_service().get(&user, id).await?;
    Ok(Json(ApiResponse::success(workspace.into())))
}

/// PUT /workspaces/{id}
pub async fn update_workspace(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateWorkspaceRequest>,
) -> Result<Json<ApiResponse<WorkspaceDto>>, ApiError> {
    validate_id("workspace", id)?;

    let name = payload
        .name
        .as_deref()
        .map(|name| validate_name("Workspace name", name).map(str::to_string))
        .transpose()?;
    let color = payload
        .color
        .as_deref()
        .map(|color| validate_color(color).map(str::to_string))
        .transpose()?;

    let workspace = state
        .workspace_service()
        .update(
            &user,
            id,
            WorkspaceChanges {
                name,
                description: payload.description,
                color,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(workspace.into())))
}

/// DELETE /workspaces/{id}
pub async fn delete_workspace(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    validate_id("workspace", id)?;
    state.workspace_service().delete(&user, id).await?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Workspace deleted".to_string(),
    })))
}

/// GET /workspaces/{id}/activity
pub async fn get_activity(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<i32>,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<ApiResponse<ActivityResponse>>, ApiError> {
    validate_id("workspace", id)?;
    let (page, page_size) = validate_pagination(query.page, query.page_size)?;

    let activity = state
        .workspace_service()
        .activity(&user, id, page, page_size)
        .await?;

    Ok(Json(ApiResponse::success(ActivityResponse {
        items: activity.items.into_iter().map(Into::into).collect(),
        page: activity.page,
        total_pages: activity.total_pages,
    })))
}
