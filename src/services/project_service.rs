use crate::db::User;
use crate::db::repositories::project::ProjectChanges;
use crate::domain::ProjectStatus;
use crate::entities::projects;
use crate::services::access::ResourceError;

pub struct CreateProject {
    pub workspace_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
}

#[async_trait::async_trait]
pub trait ProjectService: Send + Sync {
    async fn list(
        &self,
        requester: &User,
        workspace_id: i32,
    ) -> Result<Vec<projects::Model>, ResourceError>;

    /// Any workspace member may create projects.
    async fn create(
        &self,
        requester: &User,
        project: CreateProject,
    ) -> Result<projects::Model, ResourceError>;

    async fn get(&self, requester: &User, id: i32) -> Result<projects::Model, ResourceError>;

    /// Applies a partial update. Members may move status and progress;
    /// renaming or redescribing needs the creator or an admin.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Forbidden`] before anything is written when
    /// the requester lacks the right for one of the changed fields.
    async fn update(
        &self,
        requester: &User,
        id: i32,
        changes: ProjectChanges,
    ) -> Result<projects::Model, ResourceError>;

    async fn delete(&self, requester: &User, id: i32) -> Result<(), ResourceError>;
}
