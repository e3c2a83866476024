use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::User;
use crate::domain::{ProjectStatus, TaskPriority, TaskStatus, TeamRole};
use crate::entities::{activity_logs, projects, subtasks, tags, tasks, team_members, teams, workspaces};
use crate::services::task_service::TaskDetails;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct WorkspaceDto {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    pub created_by: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<workspaces::Model> for WorkspaceDto {
    fn from(model: workspaces::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            color: model.color,
            created_by: model.created_by,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedWorkspaceDto {
    pub workspace: WorkspaceDto,
    pub default_team: TeamDto,
}

#[derive(Debug, Serialize)]
pub struct TeamDto {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub workspace_id: i32,
    pub creator_id: i32,
    pub created_at: DateTime<Utc>,
}

impl From<teams::Model> for TeamDto {
    fn from(model: teams::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            workspace_id: model.workspace_id,
            creator_id: model.creator_id,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TeamMemberDto {
    pub team_id: i32,
    pub role: TeamRole,
    pub joined_at: DateTime<Utc>,
    pub user: User,
}

impl From<(team_members::Model, User)> for TeamMemberDto {
    fn from((member, user): (team_members::Model, User)) -> Self {
        Self {
            team_id: member.team_id,
            role: member.role,
            joined_at: member.joined_at,
            user,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProjectDto {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub progress: i32,
    pub workspace_id: i32,
    pub created_by: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<projects::Model> for ProjectDto {
    fn from(model: projects::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            status: model.status,
            progress: model.progress,
            workspace_id: model.workspace_id,
            created_by: model.created_by,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TaskDto {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub assigned_to: Option<i32>,
    pub due_date: Option<DateTime<Utc>>,
    pub project_id: i32,
    pub created_by: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<tasks::Model> for TaskDto {
    fn from(model: tasks::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            status: model.status,
            priority: model.priority,
            assigned_to: model.assigned_to,
            due_date: model.due_date,
            project_id: model.project_id,
            created_by: model.created_by,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SubtaskDto {
    pub id: i32,
    pub title: String,
    pub is_completed: bool,
    pub task_id: i32,
    pub parent_subtask_id: Option<i32>,
    pub created_by: i32,
    pub created_at: DateTime<Utc>,
}

impl From<subtasks::Model> for SubtaskDto {
    fn from(model: subtasks::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            is_completed: model.is_completed,
            task_id: model.task_id,
            parent_subtask_id: model.parent_subtask_id,
            created_by: model.created_by,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TagDto {
    pub id: i32,
    pub name: String,
}

impl From<tags::Model> for TagDto {
    fn from(model: tags::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TaskDetailsDto {
    #[serde(flatten)]
    pub task: TaskDto,
    pub subtasks: Vec<SubtaskDto>,
    pub tags: Vec<TagDto>,
}

impl From<TaskDetails> for TaskDetailsDto {
    fn from(details: TaskDetails) -> Self {
        Self {
            task: details.task.into(),
            subtasks: details.subtasks.into_iter().map(Into::into).collect(),
            tags: details.tags.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ActivityDto {
    pub id: i32,
    pub event_type: String,
    pub actor_id: Option<i32>,
    pub message: String,
    pub details: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl From<activity_logs::Model> for ActivityDto {
    fn from(model: activity_logs::Model) -> Self {
        Self {
            id: model.id,
            event_type: model.event_type,
            actor_id: model.actor_id,
            message: model.message,
            details: model
                .details
                .and_then(|details| serde_json::from_str(&details).ok()),
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ActivityResponse {
    pub items: Vec<ActivityDto>,
    pub page: u64,
    pub total_pages: u64,
}
