use async_trait::async_trait;
use tracing::info;

use crate::db::repositories::project::{NewProject, ProjectChanges};
use crate::db::{Store, User};
use crate::domain::policy::Action;
use crate::entities::projects;
use crate::services::access::{Access, ResourceError};
use crate::services::project_service::{CreateProject, ProjectService};

pub struct SeaOrmProjectService {
    store: Store,
    access: Access,
}

impl SeaOrmProjectService {
    #[must_use]
    pub fn new(store: Store) -> Self {
        Self {
            access: Access::new(store.clone()),
            store,
        }
    }
}

#[async_trait]
impl ProjectService for SeaOrmProjectService {
    async fn list(
        &self,
        requester: &User,
        workspace_id: i32,
    ) -> Result<Vec<projects::Model>, ResourceError> {
        self.access
            .workspace(requester, workspace_id, Action::Read)
            .await?;
        Ok(self.store.projects().list_for_workspace(workspace_id).await?)
    }

    async fn create(
        &self,
        requester: &User,
        project: CreateProject,
    ) -> Result<projects::Model, ResourceError> {
        self.access
            .workspace(requester, project.workspace_id, Action::Contribute)
            .await?;

        Ok(self
            .store
            .projects()
            .create(NewProject {
                name: project.name,
                description: project.description,
                status: project.status,
                workspace_id: project.workspace_id,
                created_by: requester.id,
            })
            .await?)
    }

    async fn get(&self, requester: &User, id: i32) -> Result<projects::Model, ResourceError> {
        self.access.project(requester, id, Action::Read).await
    }

    async fn update(
        &self,
        requester: &User,
        id: i32,
        changes: ProjectChanges,
    ) -> Result<projects::Model, ResourceError> {
        if changes.is_empty() {
            return Err(ResourceError::Validation("No changes supplied".to_string()));
        }

        let action = if changes.touches_details() {
            Action::Administer
        } else {
            Action::Contribute
        };
        let project = self.access.project(requester, id, action).await?;

        Ok(self.store.projects().update(project, changes).await?)
    }

    async fn delete(&self, requester: &User, id: i32) -> Result<(), ResourceError> {
        let project = self.access.project(requester, id, Action::Delete).await?;
        self.store.projects().delete(project.id).await?;

        info!(project_id = id, actor_id = requester.id, "Project deleted");
        Ok(())
    }
}
