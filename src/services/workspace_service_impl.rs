//! `SeaORM` implementation of the `WorkspaceService` trait.

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::info;

use crate::db::repositories::workspace::{NewWorkspace, WorkspaceChanges};
use crate::db::{Store, User};
use crate::domain::UserRole;
use crate::domain::events::ActivityEvent;
use crate::domain::policy::Action;
use crate::entities::{teams, workspaces};
use crate::services::access::{Access, ResourceError};
use crate::services::auth_service::authorize;
use crate::services::workspace_service::{ActivityPage, CreateWorkspace, WorkspaceService};

pub struct SeaOrmWorkspaceService {
    store: Store,
    access: Access,
    event_bus: broadcast::Sender<ActivityEvent>,
}

impl SeaOrmWorkspaceService {
    #[must_use]
    pub fn new(store: Store, event_bus: broadcast::Sender<ActivityEvent>) -> Self {
        Self {
            access: Access::new(store.clone()),
            store,
            event_bus,
        }
    }
}

#[async_trait]
impl WorkspaceService for SeaOrmWorkspaceService {
    async fn list(&self, requester: &User) -> Result<Vec<workspaces::Model>, ResourceError> {
        let workspaces = if requester.role == UserRole::Admin {
            self.store.workspaces().list_all().await?
        } else {
            self.store.workspaces().list_for_user(requester.id).await?
        };
        Ok(workspaces)
    }

    async fn create(
        &self,
        requester: &User,
        workspace: CreateWorkspace,
    ) -> Result<(workspaces::Model, teams::Model), ResourceError> {
        authorize(requester, &[UserRole::Admin, UserRole::TeamLead])
            .map_err(|_| ResourceError::Forbidden)?;

        let (created, team) = self
            .store
            .workspaces()
            .create_with_default_team(NewWorkspace {
                name: workspace.name,
                description: workspace.description,
                color: workspace.color,
                created_by: requester.id,
            })
            .await?;

        let _ = self.event_bus.send(ActivityEvent::WorkspaceCreated {
            workspace_id: created.id,
            name: created.name.clone(),
            actor_id: requester.id,
        });

        Ok((created, team))
    }

    async fn get(&self, requester: &User, id: i32) -> Result<workspaces::Model, ResourceError> {
        self.access.workspace(requester, id, Action::Read).await
    }

    async fn update(
        &self,
        requester: &User,
        id: i32,
        changes: WorkspaceChanges,
    ) -> Result<workspaces::Model, ResourceError> {
        self.access
            .workspace(requester, id, Action::Administer)
            .await?;

        self.store
            .workspaces()
            .update(id, changes)
            .await?
            .ok_or_else(|| ResourceError::NotFound(format!("Workspace {id}")))
    }

    async fn delete(&self, requester: &User, id: i32) -> Result<(), ResourceError> {
        let workspace = self.access.workspace(requester, id, Action::Delete).await?;

        if !self.store.workspaces().delete(workspace.id).await? {
            return Err(ResourceError::NotFound(format!("Workspace {id}")));
        }

        info!(workspace_id = id, actor_id = requester.id, "Workspace deleted");
        let _ = self.event_bus.send(ActivityEvent::WorkspaceDeleted {
            workspace_id: workspace.id,
            name: workspace.name,
            actor_id: requester.id,
        });

        Ok(())
    }

    async fn activity(
        &self,
        requester: &User,
        id: i32,
        page: u64,
        page_size: u64,
    ) -> Result<ActivityPage, ResourceError> {
        self.access.workspace(requester, id, Action::Read).await?;

        let (items, total_pages) = self
            .store
            .activity()
            .list_for_workspace(id, page, page_size)
            .await?;

        Ok(ActivityPage {
            items,
            page,
            total_pages,
        })
    }
}
