use async_trait::async_trait;
use tracing::info;

use crate::db::repositories::team::NewTeam;
use crate::db::{Store, User};
use crate::domain::policy::Action;
use crate::entities::{team_members, teams};
use crate::services::access::{Access, ResourceError};
use crate::services::team_service::TeamService;

pub struct SeaOrmTeamService {
    store: Store,
    access: Access,
}

impl SeaOrmTeamService {
    #[must_use]
    pub fn new(store: Store) -> Self {
        Self {
            access: Access::new(store.clone()),
            store,
        }
    }

    async fn team(&self, team_id: i32) -> Result<teams::Model, ResourceError> {
        self.store
            .teams()
            .get(team_id)
            .await?
            .ok_or_else(|| ResourceError::NotFound(format!("Team {team_id}")))
    }
}

#[async_trait]
impl TeamService for SeaOrmTeamService {
    async fn list(
        &self,
        requester: &User,
        workspace_id: i32,
    ) -> Result<Vec<teams::Model>, ResourceError> {
        self.access
            .workspace(requester, workspace_id, Action::Read)
            .await?;
        Ok(self.store.teams().list_for_workspace(workspace_id).await?)
    }

    async fn create(
        &self,
        requester: &User,
        workspace_id: i32,
        name: String,
        description: Option<String>,
    ) -> Result<teams::Model, ResourceError> {
        self.access
            .workspace(requester, workspace_id, Action::Administer)
            .await?;

        let team = self
            .store
            .teams()
            .create_with_lead(NewTeam {
                name,
                description,
                workspace_id,
                creator_id: requester.id,
            })
            .await?;

        info!(team_id = team.id, workspace_id, "Created team {}", team.name);
        Ok(team)
    }

    async fn members(
        &self,
        requester: &User,
        team_id: i32,
    ) -> Result<Vec<(team_members::Model, User)>, ResourceError> {
        let team = self.team(team_id).await?;
        self.access
            .workspace(requester, team.workspace_id, Action::Read)
            .await?;
        Ok(self.store.teams().members(team.id).await?)
    }

    async fn remove_member(
        &self,
        requester: &User,
        team_id: i32,
        user_id: i32,
    ) -> Result<(), ResourceError> {
        let team = self.team(team_id).await?;
        let workspace = self
            .access
            .workspace(requester, team.workspace_id, Action::Administer)
            .await?;

        if workspace.created_by == user_id {
            return Err(ResourceError::Conflict(
                "The workspace owner cannot be removed".to_string(),
            ));
        }

        if !self.store.teams().remove_member(team.id, user_id).await? {
            return Err(ResourceError::NotFound(format!(
                "Member {user_id} of team {team_id}"
            )));
        }

        info!(team_id, user_id, actor_id = requester.id, "Removed team member");
        Ok(())
    }
}
