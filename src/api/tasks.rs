use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use std::sync::Arc;

use super::validation::{validate_id, validate_name};
use super::{
    ApiError, ApiResponse, AppState, MessageResponse, SubtaskDto, TagDto, TaskDetailsDto, TaskDto,
};
use crate::db::User;
use crate::domain::{Assignee, TaskPriority, TaskStatus};
use crate::services::task_service::{CreateSubtask, CreateTask, UpdateTask};

/// Keeps `"due_date": null` (clear) apart from an absent field (untouched).
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Deserialize)]
pub struct ProjectQuery {
    pub project_id: i32,
}

#[derive(Deserialize)]
pub struct CreateTaskRequest {
    pub project_id: i32,
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: TaskPriority,
    pub assignee: Option<Assignee>,
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub assignee: Option<Assignee>,
    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<DateTime<Utc>>>,
}

#[derive(Deserialize)]
pub struct CreateSubtaskRequest {
    pub title: String,
    pub parent_subtask_id: Option<i32>,
}

#[derive(Deserialize)]
pub struct UpdateSubtaskRequest {
    pub title: Option<String>,
    pub is_completed: Option<bool>,
}

#[derive(Deserialize)]
pub struct AttachTagRequest {
    pub name: String,
}

/// GET /tasks?project_id=
pub async fn list_tasks(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Query(query): Query<ProjectQuery>,
) -> Result<Json<ApiResponse<Vec<TaskDto>>>, ApiError> {
    validate_id("project", query.project_id)?;
    let tasks = state.task_service().list(&user, query.project_id).await?;
    Ok(Json(ApiResponse::success(
        tasks.into_iter().map(TaskDto::from).collect(),
    )))
}

/// POST /tasks
pub async fn create_task(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(payload): Json<CreateTaskRequest>,
) -> Result<Json<ApiResponse<TaskDto>>, ApiError> {
    validate_id("project", payload.project_id)?;
    let title = validate_name("Task title", &payload.title)?.to_string();

    let task = state
        .task_service()
        .create(
            &user,
            CreateTask {
                project_id: payload.project_id,
                title,
                description: payload.description,
                status: payload.status,
                priority: payload.priority,
                assignee: payload.assignee,
                due_date: payload.due_date,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(task.into())))
}

/// GET /tasks/{id}
pub async fn get_task(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<TaskDetailsDto>>, ApiError> {
    validate_id("task", id)?;
    let details = state.task_service().get(&user, id).await?;
    Ok(Json(ApiResponse::success(details.into())))
}

/// PUT /tasks/{id}
pub async fn update_task(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateTaskRequest>,
) -> Result<Json<ApiResponse<TaskDto>>, ApiError> {
    validate_id("task", id)?;

    let title = payload
        .title
        .as_deref()
        .map(|title| validate_name("Task title", title).map(str::to_string))
        .transpose()?;

    let task = state
        .task_service()
        .update(
            &user,
            id,
            UpdateTask {
                title,
                description: payload.description,
                status: payload.status,
                priority: payload.priority,
                assignee: payload.assignee,
                due_date: payload.due_date,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(task.into())))
}

/// DELETE /tasks/{id}
pub async fn delete_task(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    validate_id("task", id)?;
    state.task_service().delete(&user, id).await?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Task deleted".to_string(),
    })))
}

/// POST /tasks/{id}/subtasks
pub async fn add_subtask(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<i32>,
    Json(payload): Json<CreateSubtaskRequest>,
) -> Result<Json<ApiResponse<SubtaskDto>>, ApiError> {
    validate_id("task", id)?;
    let title = validate_name("Subtask title", &payload.title)?.to_string();

    let subtask = state
        .task_service()
        .add_subtask(
            &user,
            id,
            CreateSubtask {
                title,
                parent_subtask_id: payload.parent_subtask_id,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(subtask.into())))
}

/// PUT /subtasks/{id}
pub async fn update_subtask(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateSubtaskRequest>,
) -> Result<Json<ApiResponse<SubtaskDto>>, ApiError> {
    validate_id("subtask", id)?;
    let title = payload
        .title
        .as_deref()
        .map(|title| validate_name("Subtask title", title).map(str::to_string))
        .transpose()?;

    let subtask = state
        .task_service()
        .update_subtask(&user, id, title, payload.is_completed)
        .await?;

    Ok(Json(ApiResponse::success(subtask.into())))
}

/// DELETE /subtasks/{id}
pub async fn delete_subtask(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    validate_id("subtask", id)?;
    state.task_service().delete_subtask(&user, id).await?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Subtask deleted".to_string(),
    })))
}

/// POST /tasks/{id}/tags
pub async fn attach_tag(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<i32>,
    Json(payload): Json<AttachTagRequest>,
) -> Result<Json<ApiResponse<TagDto>>, ApiError> {
    validate_id("task", id)?;
    let name = validate_name("Tag name", &payload.name)?.to_lowercase();

    let tag = state.task_service().attach_tag(&user, id, &name).await?;
    Ok(Json(ApiResponse::success(tag.into())))
}

/// DELETE /tasks/{id}/tags/{tag_id}
pub async fn detach_tag(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path((id, tag_id)): Path<(i32, i32)>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    validate_id("task", id)?;
    validate_id("tag", tag_id)?;
    state.task_service().detach_tag(&user, id, tag_id).await?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Tag removed".to_string(),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_due_date_states() {
        let untouched: UpdateTaskRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(untouched.due_date, None);

        let cleared: UpdateTaskRequest = serde_json::from_str(r#"{"due_date":null}"#).unwrap();
        assert_eq!(cleared.due_date, Some(None));

        let set: UpdateTaskRequest =
            serde_json::from_str(r#"{"due_date":"2026-01-02T03:04:05Z"}"#).unwrap();
        assert!(matches!(set.due_date, Some(Some(_))));
    }

    #[test]
    fn test_assignee_payloads() {
        let body: UpdateTaskRequest =
            serde_json::from_str(r#"{"assignee":{"kind":"user","id":7}}"#).unwrap();
        assert_eq!(body.assignee, Some(Assignee::User { id: 7 }));

        let body: UpdateTaskRequest =
            serde_json::from_str(r#"{"assignee":{"kind":"me"}}"#).unwrap();
        assert_eq!(body.assignee, Some(Assignee::Me));

        assert!(serde_json::from_str::<UpdateTaskRequest>(r#"{"assignee":"Me"}"#).is_err());
    }
}
