//! Domain service for tasks, their subtasks and tags.

use chrono::{DateTime, Utc};

use crate::db::User;
use crate::domain::{Assignee, TaskPriority, TaskStatus};
use crate::entities::{subtasks, tags, tasks};
use crate::services::access::ResourceError;

pub struct CreateTask {
    pub project_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub assignee: Option<Assignee>,
    pub due_date: Option<DateTime<Utc>>,
}

/// Partial task update. `due_date: Some(None)` clears the date; an
/// `Assignee::Unassigned` clears the assignee.
#[derive(Debug, Default)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub assignee: Option<Assignee>,
    pub due_date: Option<Option<DateTime<Utc>>>,
}

#[derive(Debug)]
pub struct TaskDetails {
    pub task: tasks::Model,
    pub subtasks: Vec<subtasks::Model>,
    pub tags: Vec<tags::Model>,
}

pub struct CreateSubtask {
    pub title: String,
    pub parent_subtask_id: Option<i32>,
}

#[async_trait::async_trait]
pub trait TaskService: Send + Sync {
    async fn list(&self, requester: &User, project_id: i32)
    -> Result<Vec<tasks::Model>, ResourceError>;

    /// # Errors
    ///
    /// Returns [`ResourceError::Validation`] when the assignee is not a
    /// member of the project's workspace.
    async fn create(&self, requester: &User, task: CreateTask)
    -> Result<tasks::Model, ResourceError>;

    async fn get(&self, requester: &User, id: i32) -> Result<TaskDetails, ResourceError>;

    async fn update(
        &self,
        requester: &User,
        id: i32,
        changes: UpdateTask,
    ) -> Result<tasks::Model, ResourceError>;

    async fn delete(&self, requester: &User, id: i32) -> Result<(), ResourceError>;

    /// The optional parent must belong to the same task.
    async fn add_subtask(
        &self,
        requester: &User,
        task_id: i32,
        subtask: CreateSubtask,
    ) -> Result<subtasks::Model, ResourceError>;

    async fn update_subtask(
        &self,
        requester: &User,
        subtask_id: i32,
        title: Option<String>,
        is_completed: Option<bool>,
    ) -> Result<subtasks::Model, ResourceError>;

    async fn delete_subtask(&self, requester: &User, subtask_id: i32) -> Result<(), ResourceError>;

    async fn attach_tag(
        &self,
        requester: &User,
        task_id: i32,
        name: &str,
    ) -> Result<tags::Model, ResourceError>;

    async fn detach_tag(
        &self,
        requester: &User,
        task_id: i32,
        tag_id: i32,
    ) -> Result<(), ResourceError>;
}
