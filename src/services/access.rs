//! Loads a resource and runs the permission policy against it.
//!
//! Every resource service goes through here before mutating anything.

use thiserror::Error;
use tracing::debug;

use crate::db::{Store, User};
use crate::domain::policy::{Action, Requester, ResourceDescriptor, evaluate};
use crate::entities::{projects, tasks, workspaces};

/// Errors shared by the workspace, team, project and task services.
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for ResourceError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for ResourceError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

#[derive(Clone)]
pub struct Access {
    store: Store,
}

impl Access {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn descriptor(
        &self,
        user: &User,
        workspace_id: i32,
        created_by: i32,
    ) -> Result<ResourceDescriptor, ResourceError> {
        let is_member = self
            .store
            .teams()
            .is_workspace_member(user.id, workspace_id)
            .await?;
        Ok(ResourceDescriptor::new(workspace_id, created_by, is_member))
    }

    fn enforce(
        user: &User,
        resource: &ResourceDescriptor,
        action: Action,
    ) -> Result<(), ResourceError> {
        let requester = Requester::new(user.id, user.role);
        if evaluate(&requester, resource, action).is_allowed() {
            Ok(())
        } else {
            debug!(
                user_id = user.id,
                workspace_id = resource.workspace_id,
                ?action,
                "Permission denied"
            );
            Err(ResourceError::Forbidden)
        }
    }

    pub async fn workspace(
        &self,
        user: &User,
        workspace_id: i32,
        action: Action,
    ) -> Result<workspaces::Model, ResourceError> {
        let workspace = self
            .store
            .workspaces()
            .get(workspace_id)
            .await?
            .ok_or_else(|| ResourceError::NotFound(format!("Workspace {workspace_id}")))?;

        self.check_workspace(user, &workspace, action).await?;
        Ok(workspace)
    }

    pub async fn check_workspace(
        &self,
        user: &User,
        workspace: &workspaces::Model,
        action: Action,
    ) -> Result<(), ResourceError> {
        let resource = self
            .descriptor(user, workspace.id, workspace.created_by)
            .await?;
        Self::enforce(user, &resource, action)
    }

    pub async fn project(
        &self,
        user: &User,
        project_id: i32,
        action: Action,
    ) -> Result<projects::Model, ResourceError> {
        let project = self
            .store
            .projects()
            .get(project_id)
            .await?
            .ok_or_else(|| ResourceError::NotFound(format!("Project {project_id}")))?;

        self.check_project(user, &project, action).await?;
        Ok(project)
    }

    pub async fn check_project(
        &self,
        user: &User,
        project: &projects::Model,
        action: Action,
    ) -> Result<(), ResourceError> {
        let resource = self
            .descriptor(user, project.workspace_id, project.created_by)
            .await?;
        Self::enforce(user, &resource, action)
    }

    /// A task's creators are the task creator and the creator of its
    /// project; its workspace is the project's.
    pub async fn task(
        &self,
        user: &User,
        task_id: i32,
        action: Action,
    ) -> Result<(tasks::Model, projects::Model), ResourceError> {
        let task = self
            .store
            .tasks()
            .get(task_id)
            .await?
            .ok_or_else(|| ResourceError::NotFound(format!("Task {task_id}")))?;

        let project = self
            .store
            .projects()
            .get(task.project_id)
            .await?
            .ok_or_else(|| ResourceError::NotFound(format!("Project {}", task.project_id)))?;

        let resource = self
            .descriptor(user, project.workspace_id, task.created_by)
            .await?
            .with_creator(project.created_by);
        Self::enforce(user, &resource, action)?;

        Ok((task, project))
    }
}
