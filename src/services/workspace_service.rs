//! Domain service for workspaces and their activity feed.

use crate::db::User;
use crate::db::repositories::workspace::WorkspaceChanges;
use crate::entities::{activity_logs, teams, workspaces};
use crate::services::access::ResourceError;

pub struct CreateWorkspace {
    pub name: String,
    pub description: Option<String>,
    pub color: String,
}

/// One page of activity, newest first.
#[derive(Debug)]
pub struct ActivityPage {
    pub items: Vec<activity_logs::Model>,
    pub page: u64,
    pub total_pages: u64,
}

#[async_trait::async_trait]
pub trait WorkspaceService: Send + Sync {
    /// All workspaces for admins; owned or joined ones for everyone else.
    async fn list(&self, requester: &User) -> Result<Vec<workspaces::Model>, ResourceError>;

    /// Creates the workspace and its default team. Admins and team leads only.
    async fn create(
        &self,
        requester: &User,
        workspace: CreateWorkspace,
    ) -> Result<(workspaces::Model, teams::Model), ResourceError>;

    async fn get(&self, requester: &User, id: i32) -> Result<workspaces::Model, ResourceError>;

    async fn update(
        &self,
        requester: &User,
        id: i32,
        changes: WorkspaceChanges,
    ) -> Result<workspaces::Model, ResourceError>;

    /// Deletes the workspace with its teams, projects and invitations.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Forbidden`] unless the requester created the
    /// workspace or is an admin. Nothing is deleted in that case.
    async fn delete(&self, requester: &User, id: i32) -> Result<(), ResourceError>;

    async fn activity(
        &self,
        requester: &User,
        id: i32,
        page: u64,
        page_size: u64,
    ) -> Result<ActivityPage, ResourceError>;
}
