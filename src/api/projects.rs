use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::{validate_id, validate_name, validate_progress};
use super::{ApiError, ApiResponse, AppState, MessageResponse, ProjectDto};
use crate::db::User;
use crate::db::repositories::project::ProjectChanges;
use crate::domain::ProjectStatus;
use crate::services::project_service::CreateProject;

#[derive(Deserialize)]
pub struct WorkspaceQuery {
    pub workspace_id: i32,
}

#[derive(Deserialize)]
pub struct CreateProjectRequest {
    pub workspace_id: i32,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub status: ProjectStatus,
}

#[derive(Deserialize)]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub progress: Option<i32>,
}

/// GET /projects?workspace_id=
pub async fn list_projects(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Query(query): Query<WorkspaceQuery>,
) -> Result<Json<ApiResponse<Vec<ProjectDto>>>, ApiError> {
    validate_id("workspace", query.workspace_id)?;
    let projects = state
        .project_service()
        .list(&user, query.workspace_id)
        .await?;
    Ok(Json(ApiResponse::success(
        projects.into_iter().map(ProjectDto::from).collect(),
    )))
}

/// POST /projects
pub async fn create_project(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(payload): Json<CreateProjectRequest>,
) -> Result<Json<ApiResponse<ProjectDto>>, ApiError> {
    validate_id("workspace", payload.workspace_id)?;
    let name = validate_name("Project name", &payload.name)?.to_string();

    let project = state
        .project_service()
        .create(
            &user,
            CreateProject {
                workspace_id: payload.workspace_id,
                name,
                description: payload.description,
                status: payload.status,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(project.into())))
}

/// GET /projects/{id}
pub async fn get_project(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<ProjectDto>>, ApiError> {
    validate_id("project", id)?;
    let project = state.project_service().get(&user, id).await?;
    Ok(Json(ApiResponse::success(project.into())))
}

/// PUT /projects/{id}
///
/// Status and progress are open to every member; name and description
/// changes need the project creator or an admin.
pub async fn update_project(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateProjectRequest>,
) -> Result<Json<ApiResponse<ProjectDto>>, ApiError> {
    validate_id("project", id)?;

    let name = payload
        .name
        .as_deref()
        .map(|name| validate_name("Project name", name).map(str::to_string))
        .transpose()?;
    let progress = payload.progress.map(validate_progress).transpose()?;

    let project = state
        .project_service()
        .update(
            &user,
            id,
            ProjectChanges {
                name,
                description: payload.description,
                status: payload.status,
                progress,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(project.into())))
}

/// DELETE /projects/{id}
pub async fn delete_project(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    validate_id("project", id)?;
    state.project_service().delete(&user, id).await?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Project deleted".to_string(),
    })))
}
