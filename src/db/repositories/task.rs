use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

use crate::domain::{TaskPriority, TaskStatus};
use crate::entities::{subtasks, tags, task_tags, tasks};

pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub assigned_to: Option<i32>,
    pub due_date: Option<DateTime<Utc>>,
    pub project_id: i32,
    pub created_by: i32,
}

/// Partial update. The nested options on `assigned_to` and `due_date`
/// distinguish "leave alone" (`None`) from "clear" (`Some(None)`).
#[derive(Debug, Default, Clone)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub assigned_to: Option<Option<i32>>,
    pub due_date: Option<Option<DateTime<Utc>>>,
}

pub struct NewSubtask {
    pub title: String,
    pub task_id: i32,
    pub parent_subtask_id: Option<i32>,
    pub created_by: i32,
}

pub struct TaskRepository {
    conn: DatabaseConnection,
}

impl TaskRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, id: i32) -> Result<Option<tasks::Model>> {
        tasks::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query task")
    }

    pub async fn list_for_project(&self, project_id: i32) -> Result<Vec<tasks::Model>> {
        tasks::Entity::find()
            .filter(tasks::Column::ProjectId.eq(project_id))
            .order_by_asc(tasks::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list tasks")
    }

    pub async fn create(&self, task: NewTask) -> Result<tasks::Model> {
        let now = Utc::now();
        tasks::ActiveModel {
            title: Set(task.title),
            description: Set(task.description),
            status: Set(task.status),
            priority: Set(task.priority),
            assigned_to: Set(task.assigned_to),
            due_date: Set(task.due_date),
            project_id: Set(task.project_id),
            created_by: Set(task.created_by),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert task")
    }

    pub async fn update(&self, existing: tasks::Model, changes: TaskChanges) -> Result<tasks::Model> {
        let mut active: tasks::ActiveModel = existing.into();
        if let Some(title) = changes.title {
            active.title = Set(title);
        }
        if let Some(description) = changes.description {
            active.description = Set(Some(description));
        }
        if let Some(status) = changes.status {
            active.status = Set(status);
        }
        if let Some(priority) = changes.priority {
            active.priority = Set(priority);
        }
        if let Some(assigned_to) = changes.assigned_to {
            active.assigned_to = Set(assigned_to);
        }
        if let Some(due_date) = changes.due_date {
            active.due_date = Set(due_date);
        }
        active.updated_at = Set(Utc::now());

        active
            .update(&self.conn)
            .await
            .context("Failed to update task")
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = tasks::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete task")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn subtasks(&self, task_id: i32) -> Result<Vec<subtasks::Model>> {
        subtasks::Entity::find()
            .filter(subtasks::Column::TaskId.eq(task_id))
            .order_by_asc(subtasks::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list subtasks")
    }

    pub async fn get_subtask(&self, id: i32) -> Result<Option<subtasks::Model>> {
        subtasks::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query subtask")
    }

    pub async fn create_subtask(&self, subtask: NewSubtask) -> Result<subtasks::Model> {
        subtasks::ActiveModel {
            title: Set(subtask.title),
            is_completed: Set(false),
            task_id: Set(subtask.task_id),
            parent_subtask_id: Set(subtask.parent_subtask_id),
            created_by: Set(subtask.created_by),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert subtask")
    }

    pub async fn update_subtask(
        &self,
        existing: subtasks::Model,
        title: Option<String>,
        is_completed: Option<bool>,
    ) -> Result<subtasks::Model> {
        let mut active: subtasks::ActiveModel = existing.into();
        if let Some(title) = title {
            active.title = Set(title);
        }
        if let Some(is_completed) = is_completed {
            active.is_completed = Set(is_completed);
        }

        active
            .update(&self.conn)
            .await
            .context("Failed to update subtask")
    }

    /// Nested subtasks go with it through the cascading parent key.
    pub async fn delete_subtask(&self, id: i32) -> Result<bool> {
        let result = subtasks::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete subtask")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn tags(&self, task: &tasks::Model) -> Result<Vec<tags::Model>> {
        task.find_related(tags::Entity)
            .order_by_asc(tags::Column::Name)
            .all(&self.conn)
            .await
            .context("Failed to list task tags")
    }

    /// Links a tag to the task, creating the tag by name if needed. Linking
    /// an already linked tag is a no-op.
    pub async fn attach_tag(&self, task_id: i32, name: &str) -> Result<tags::Model> {
        let txn = self.conn.begin().await?;

        let tag = match tags::Entity::find()
            .filter(tags::Column::Name.eq(name))
            .one(&txn)
            .await?
        {
            Some(tag) => tag,
            None => {
                tags::ActiveModel {
                    name: Set(name.to_string()),
                    ..Default::default()
                }
                .insert(&txn)
                .await?
            }
        };

        let linked = task_tags::Entity::find_by_id((task_id, tag.id))
            .one(&txn)
            .await?
            .is_some();

        if !linked {
            task_tags::ActiveModel {
                task_id: Set(task_id),
                tag_id: Set(tag.id),
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;
        Ok(tag)
    }

    pub async fn detach_tag(&self, task_id: i32, tag_id: i32) -> Result<bool> {
        let result = task_tags::Entity::delete_by_id((task_id, tag_id))
            .exec(&self.conn)
            .await
            .context("Failed to detach tag")?;

        Ok(result.rows_affected > 0)
    }
}
