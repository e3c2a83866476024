use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::domain::{InvitationStatus, UserRole};
use crate::entities::invitations;

pub struct NewInvitation {
    pub email: String,
    pub role: UserRole,
    pub workspace_id: i32,
    pub invited_by: i32,
    pub expires_at: DateTime<Utc>,
}

pub struct InvitationRepository {
    conn: DatabaseConnection,
}

impl InvitationRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, id: i32) -> Result<Option<invitations::Model>> {
        invitations::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query invitation")
    }

    pub async fn get_by_token(&self, token: &str) -> Result<Option<invitations::Model>> {
        find_by_token(&self.conn, token).await
    }

    pub async fn create(&self, invitation: NewInvitation) -> Result<invitations::Model> {
        let now = Utc::now();
        invitations::ActiveModel {
            email: Set(invitation.email.to_lowercase()),
            token: Set(generate_invitation_token()),
            role: Set(invitation.role),
            workspace_id: Set(invitation.workspace_id),
            invited_by: Set(invitation.invited_by),
            status: Set(InvitationStatus::Pending),
            expires_at: Set(invitation.expires_at),
            accepted_at: Set(None),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert invitation")
    }

    /// Issues a fresh token and expiry for a pending invitation (resend).
    pub async fn rotate(
        &self,
        existing: invitations::Model,
        role: UserRole,
        invited_by: i32,
        expires_at: DateTime<Utc>,
    ) -> Result<invitations::Model> {
        let mut active: invitations::ActiveModel = existing.into();
        active.token = Set(generate_invitation_token());
        active.role = Set(role);
        active.invited_by = Set(invited_by);
        active.expires_at = Set(expires_at);

        active
            .update(&self.conn)
            .await
            .context("Failed to rotate invitation")
    }

    pub async fn list_for_workspace(&self, workspace_id: i32) -> Result<Vec<invitations::Model>> {
        invitations::Entity::find()
            .filter(invitations::Column::WorkspaceId.eq(workspace_id))
            .order_by_desc(invitations::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list invitations")
    }

    pub async fn pending_for_email(&self, email: &str) -> Result<Vec<invitations::Model>> {
        pending_for_email(&self.conn, email).await
    }

    pub async fn pending_for_email_and_workspace(
        &self,
        email: &str,
        workspace_id: i32,
    ) -> Result<Option<invitations::Model>> {
        invitations::Entity::find()
            .filter(invitations::Column::Email.eq(email.to_lowercase()))
            .filter(invitations::Column::WorkspaceId.eq(workspace_id))
            .filter(invitations::Column::Status.eq(InvitationStatus::Pending))
            .one(&self.conn)
            .await
            .context("Failed to query pending invitation")
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = invitations::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete invitation")?;

        Ok(result.rows_affected > 0)
    }

    /// Deletes pending invitations that expired before `cutoff`.
    pub async fn prune_expired(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = invitations::Entity::delete_many()
            .filter(invitations::Column::Status.eq(InvitationStatus::Pending))
            .filter(invitations::Column::ExpiresAt.lt(cutoff))
            .exec(&self.conn)
            .await
            .context("Failed to prune expired invitations")?;

        Ok(result.rows_affected)
    }
}

pub async fn find_by_token<C: ConnectionTrait>(
    db: &C,
    token: &str,
) -> Result<Option<invitations::Model>> {
    invitations::Entity::find()
        .filter(invitations::Column::Token.eq(token))
        .one(db)
        .await
        .context("Failed to query invitation by token")
}

/// Pending invitations for an email, newest first. Expiry is not applied.
pub async fn pending_for_email<C: ConnectionTrait>(
    db: &C,
    email: &str,
) -> Result<Vec<invitations::Model>> {
    invitations::Entity::find()
        .filter(invitations::Column::Email.eq(email.to_lowercase()))
        .filter(invitations::Column::Status.eq(InvitationStatus::Pending))
        .order_by_desc(invitations::Column::CreatedAt)
        .all(db)
        .await
        .context("Failed to query pending invitations")
}

pub async fn mark_accepted<C: ConnectionTrait>(
    db: &C,
    invitation: invitations::Model,
) -> Result<invitations::Model> {
    let mut active: invitations::ActiveModel = invitation.into();
    active.status = Set(InvitationStatus::Accepted);
    active.accepted_at = Set(Some(Utc::now()));

    active
        .update(db)
        .await
        .context("Failed to mark invitation accepted")
}

/// Generate a random invitation token (64 character hex string)
#[must_use]
pub fn generate_invitation_token() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();

    bytes.iter().fold(String::with_capacity(64), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_invitation_token() {
        let a = generate_invitation_token();
        let b = generate_invitation_token();

        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }
}
