use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

use crate::domain::{InvitationStatus, UserRole};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "invitations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Stored lowercase.
    pub email: String,

    /// Opaque 64-char hex token sent in the invitation link.
    #[sea_orm(unique)]
    pub token: String,

    pub role: UserRole,

    pub workspace_id: i32,

    pub invited_by: i32,

    pub status: InvitationStatus,

    pub expires_at: DateTimeUtc,

    pub accepted_at: Option<DateTimeUtc>,

    pub created_at: DateTimeUtc,
}

impl Model {
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Pending and not yet expired.
    #[must_use]
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.status == InvitationStatus::Pending && !self.is_expired(now)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::workspaces::Entity",
        from = "Column::WorkspaceId",
        to = "super::workspaces::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Workspace,
}

impl Related<super::workspaces::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Workspace.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
