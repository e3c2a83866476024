use anyhow::{Context, Result};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::info;

use crate::domain::TeamRole;
use crate::entities::{team_members, teams, workspaces};

pub struct NewWorkspace {
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    pub created_by: i32,
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Default, Clone)]
pub struct WorkspaceChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
}

pub struct WorkspaceRepository {
    conn: DatabaseConnection,
}

impl WorkspaceRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, id: i32) -> Result<Option<workspaces::Model>> {
        workspaces::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query workspace")
    }

    pub async fn list_all(&self) -> Result<Vec<workspaces::Model>> {
        workspaces::Entity::find()
            .order_by_asc(workspaces::Column::Name)
            .all(&self.conn)
            .await
            .context("Failed to list workspaces")
    }

    /// Workspaces the user owns or belongs to through a team.
    pub async fn list_for_user(&self, user_id: i32) -> Result<Vec<workspaces::Model>> {
        let member_workspace_ids: Vec<i32> = teams::Entity::find()
            .select_only()
            .column(teams::Column::WorkspaceId)
            .inner_join(team_members::Entity)
            .filter(team_members::Column::UserId.eq(user_id))
            .distinct()
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to query workspace memberships")?;

        workspaces::Entity::find()
            .filter(
                Condition::any()
                    .add(workspaces::Column::CreatedBy.eq(user_id))
                    .add(workspaces::Column::Id.is_in(member_workspace_ids)),
            )
            .order_by_asc(workspaces::Column::Name)
            .all(&self.conn)
            .await
            .context("Failed to list workspaces for user")
    }

    /// Creates the workspace together with its default team, led by the
    /// creator.
    pub async fn create_with_default_team(
        &self,
        workspace: NewWorkspace,
    ) -> Result<(workspaces::Model, teams::Model)> {
        let txn = self.conn.begin().await?;
        let now = Utc::now();

        let created = workspaces::ActiveModel {
            name: Set(workspace.name.clone()),
            description: Set(workspace.description),
            color: Set(workspace.color),
            created_by: Set(workspace.created_by),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .context("Failed to insert workspace")?;

        let team = teams::ActiveModel {
            name: Set(format!("{} Team", workspace.name)),
            description: Set(None),
            workspace_id: Set(created.id),
            creator_id: Set(workspace.created_by),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .context("Failed to insert default team")?;

        team_members::ActiveModel {
            team_id: Set(team.id),
            user_id: Set(workspace.created_by),
            role: Set(TeamRole::Lead),
            joined_at: Set(now),
        }
        .insert(&txn)
        .await
        .context("Failed to add workspace owner to default team")?;

        txn.commit().await?;

        info!(workspace_id = created.id, "Created workspace {}", created.name);
        Ok((created, team))
    }

    pub async fn update(
        &self,
        id: i32,
        changes: WorkspaceChanges,
    ) -> Result<Option<workspaces::Model>> {
        let Some(existing) = self.get(id).await? else {
            return Ok(None);
        };

        let mut active: workspaces::ActiveModel = existing.into();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(description) = changes.description {
            active.description = Set(Some(description));
        }
        if let Some(color) = changes.color {
            active.color = Set(color);
        }
        active.updated_at = Set(Utc::now());

        Ok(Some(active.update(&self.conn).await?))
    }

    /// Teams, projects and invitations go with it through cascading keys.
    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = workspaces::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete workspace")?;

        let removed = result.rows_affected > 0;
        if removed {
            info!("Removed workspace with ID: {}", id);
        }
        Ok(removed)
    }
}
