use anyhow::{Context, Result};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::db::User;
use crate::domain::TeamRole;
use crate::entities::{team_members, teams, users};

pub struct NewTeam {
    pub name: String,
    pub description: Option<String>,
    pub workspace_id: i32,
    pub creator_id: i32,
}

pub struct TeamRepository {
    conn: DatabaseConnection,
}

impl TeamRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, id: i32) -> Result<Option<teams::Model>> {
        teams::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query team")
    }

    pub async fn list_for_workspace(&self, workspace_id: i32) -> Result<Vec<teams::Model>> {
        teams_for_workspace(&self.conn, workspace_id).await
    }

    /// Creates the team and makes its creator the lead.
    pub async fn create_with_lead(&self, team: NewTeam) -> Result<teams::Model> {
        let txn = self.conn.begin().await?;
        let now = Utc::now();

        let created = teams::ActiveModel {
            name: Set(team.name),
            description: Set(team.description),
            workspace_id: Set(team.workspace_id),
            creator_id: Set(team.creator_id),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .context("Failed to insert team")?;

        find_or_create_member(&txn, created.id, team.creator_id, TeamRole::Lead).await?;

        txn.commit().await?;
        Ok(created)
    }

    pub async fn members(&self, team_id: i32) -> Result<Vec<(team_members::Model, User)>> {
        let rows = team_members::Entity::find()
            .filter(team_members::Column::TeamId.eq(team_id))
            .order_by_asc(team_members::Column::JoinedAt)
            .find_also_related(users::Entity)
            .all(&self.conn)
            .await
            .context("Failed to list team members")?;

        Ok(rows
            .into_iter()
            .filter_map(|(member, user)| user.map(|u| (member, User::from(u))))
            .collect())
    }

    pub async fn is_workspace_member(&self, user_id: i32, workspace_id: i32) -> Result<bool> {
        is_workspace_member(&self.conn, user_id, workspace_id).await
    }

    pub async fn find_or_create_member(
        &self,
        team_id: i32,
        user_id: i32,
        role: TeamRole,
    ) -> Result<(team_members::Model, bool)> {
        find_or_create_member(&self.conn, team_id, user_id, role).await
    }

    pub async fn remove_member(&self, team_id: i32, user_id: i32) -> Result<bool> {
        let result = team_members::Entity::delete_by_id((team_id, user_id))
            .exec(&self.conn)
            .await
            .context("Failed to remove team member")?;

        Ok(result.rows_affected > 0)
    }
}

/// Teams of a workspace, oldest first.
pub async fn teams_for_workspace<C: ConnectionTrait>(
    db: &C,
    workspace_id: i32,
) -> Result<Vec<teams::Model>> {
    teams::Entity::find()
        .filter(teams::Column::WorkspaceId.eq(workspace_id))
        .order_by_asc(teams::Column::Id)
        .all(db)
        .await
        .context("Failed to list teams for workspace")
}

pub async fn is_workspace_member<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    workspace_id: i32,
) -> Result<bool> {
    let count = team_members::Entity::find()
        .inner_join(teams::Entity)
        .filter(team_members::Column::UserId.eq(user_id))
        .filter(teams::Column::WorkspaceId.eq(workspace_id))
        .count(db)
        .await
        .context("Failed to check workspace membership")?;

    Ok(count > 0)
}

/// Returns the membership row for (team, user), inserting it with `role` if
/// it does not exist yet. The boolean is true when a row was inserted. An
/// existing membership keeps its role.
pub async fn find_or_create_member<C: ConnectionTrait>(
    db: &C,
    team_id: i32,
    user_id: i32,
    role: TeamRole,
) -> Result<(team_members::Model, bool)> {
    if let Some(existing) = team_members::Entity::find_by_id((team_id, user_id))
        .one(db)
        .await
        .context("Failed to query team member")?
    {
        return Ok((existing, false));
    }

    let created = team_members::ActiveModel {
        team_id: Set(team_id),
        user_id: Set(user_id),
        role: Set(role),
        joined_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .context("Failed to insert team member")?;

    Ok((created, true))
}
