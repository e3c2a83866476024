use crate::db::User;
use crate::entities::{team_members, teams};
use crate::services::access::ResourceError;

#[async_trait::async_trait]
pub trait TeamService: Send + Sync {
    async fn list(&self, requester: &User, workspace_id: i32)
    -> Result<Vec<teams::Model>, ResourceError>;

    /// Creates a team in the workspace with the requester as its lead.
    async fn create(
        &self,
        requester: &User,
        workspace_id: i32,
        name: String,
        description: Option<String>,
    ) -> Result<teams::Model, ResourceError>;

    async fn members(
        &self,
        requester: &User,
        team_id: i32,
    ) -> Result<Vec<(team_members::Model, User)>, ResourceError>;

    /// # Errors
    ///
    /// Returns [`ResourceError::Conflict`] when asked to remove the workspace
    /// owner.
    async fn remove_member(
        &self,
        requester: &User,
        team_id: i32,
        user_id: i32,
    ) -> Result<(), ResourceError>;
}
