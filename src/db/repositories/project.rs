use anyhow::{Context, Result};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::info;

use crate::domain::ProjectStatus;
use crate::entities::projects;

pub struct NewProject {
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub workspace_id: i32,
    pub created_by: i32,
}

#[derive(Debug, Default, Clone)]
pub struct ProjectChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub progress: Option<i32>,
}

impl ProjectChanges {
    /// Name or description changes need more than contributor rights.
    #[must_use]
    pub const fn touches_details(&self) -> bool {
        self.name.is_some() || self.description.is_some()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        !self.touches_details() && self.status.is_none() && self.progress.is_none()
    }
}

pub struct ProjectRepository {
    conn: DatabaseConnection,
}

impl ProjectRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, id: i32) -> Result<Option<projects::Model>> {
        projects::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query project")
    }

    pub async fn list_for_workspace(&self, workspace_id: i32) -> Result<Vec<projects::Model>> {
        projects::Entity::find()
            .filter(projects::Column::WorkspaceId.eq(workspace_id))
            .order_by_asc(projects::Column::Name)
            .all(&self.conn)
            .await
            .context("Failed to list projects")
    }

    pub async fn create(&self, project: NewProject) -> Result<projects::Model> {
        let now = Utc::now();
        let created = projects::ActiveModel {
            name: Set(project.name),
            description: Set(project.description),
            status: Set(project.status),
            progress: Set(0),
            workspace_id: Set(project.workspace_id),
            created_by: Set(project.created_by),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert project")?;

        info!(project_id = created.id, "Created project {}", created.name);
        Ok(created)
    }

    pub async fn update(
        &self,
        existing: projects::Model,
        changes: ProjectChanges,
    ) -> Result<projects::Model> {
        let mut active: projects::ActiveModel = existing.into();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(description) = changes.description {
            active.description = Set(Some(description));
        }
        if let Some(status) = changes.status {
            active.status = Set(status);
        }
        if let Some(progress) = changes.progress {
            active.progress = Set(progress);
        }
        active.updated_at = Set(Utc::now());

        active
            .update(&self.conn)
            .await
            .context("Failed to update project")
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = projects::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete project")?;

        Ok(result.rows_affected > 0)
    }
}
