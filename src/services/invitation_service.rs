//! Domain service for the invitation workflow.
//!
//! An invitation lets an email address join a workspace. Owners and admins
//! create, resend and revoke them; the invitee looks one up by token and
//! accepts it, which creates the account and the team membership in one
//! transaction.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::db::User;
use crate::domain::{InvitationStatus, UserRole};
use crate::entities::invitations;
use crate::services::access::ResourceError;
use crate::services::membership::MembershipError;

#[derive(Debug, Error)]
pub enum InvitationError {
    #[error("Invitation not found")]
    InvitationNotFound,

    #[error("Invitation has expired")]
    Expired,

    #[error("No valid invitation for this email")]
    NotInvited,

    #[error("A user with this email already exists")]
    UserAlreadyExists,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is inactive")]
    AccountInactive,

    #[error("Workspace {0} has no team to join")]
    NoTeamForWorkspace(i32),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for InvitationError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for InvitationError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

impl From<MembershipError> for InvitationError {
    fn from(err: MembershipError) -> Self {
        match err {
            MembershipError::NoTeam(workspace_id) => Self::NoTeamForWorkspace(workspace_id),
            e @ MembershipError::AmbiguousTeam { .. } => Self::Conflict(e.to_string()),
            MembershipError::Database(e) => Self::from(e),
        }
    }
}

impl From<ResourceError> for InvitationError {
    fn from(err: ResourceError) -> Self {
        match err {
            ResourceError::NotFound(what) => Self::NotFound(what),
            ResourceError::Forbidden => Self::Forbidden,
            ResourceError::Validation(msg) => Self::Validation(msg),
            ResourceError::Conflict(msg) => Self::Conflict(msg),
            ResourceError::Database(msg) => Self::Database(msg),
            ResourceError::Internal(msg) => Self::Internal(msg),
        }
    }
}

/// Invitation as shown to workspace owners. The token is never listed.
#[derive(Debug, Clone, Serialize)]
pub struct InvitationSummary {
    pub id: i32,
    pub email: String,
    pub role: UserRole,
    pub workspace_id: i32,
    pub invited_by: i32,
    pub status: InvitationStatus,
    pub expires_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<invitations::Model> for InvitationSummary {
    fn from(model: invitations::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            role: model.role,
            workspace_id: model.workspace_id,
            invited_by: model.invited_by,
            status: model.status,
            expires_at: model.expires_at,
            accepted_at: model.accepted_at,
            created_at: model.created_at,
        }
    }
}

/// What the signup form needs to continue with an invitation.
#[derive(Debug, Clone, Serialize)]
pub struct SignupInvitation {
    pub token: String,
    pub role: UserRole,
    pub email: String,
    pub workspace_id: i32,
}

/// Public view of an invitation for the accept page.
#[derive(Debug, Clone, Serialize)]
pub struct InvitationDetails {
    pub email: String,
    pub role: UserRole,
    pub workspace_id: i32,
    pub workspace_name: String,
    pub status: InvitationStatus,
    pub expires_at: DateTime<Utc>,
    pub expired: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AcceptResult {
    pub token: String,
    pub user: User,
    pub workspace_id: i32,
    pub team_id: i32,
    /// False when the user already was on the team.
    pub joined: bool,
}

#[async_trait::async_trait]
pub trait InvitationService: Send + Sync {
    /// Invites `email` to a workspace, or resends the pending invitation with
    /// a fresh token.
    ///
    /// # Errors
    ///
    /// Returns [`InvitationError::Forbidden`] unless the requester owns the
    /// workspace or is an admin, and [`InvitationError::Conflict`] when the
    /// email already belongs to a member.
    async fn create_invitation(
        &self,
        requester: &User,
        workspace_id: i32,
        email: &str,
        role: UserRole,
    ) -> Result<InvitationSummary, InvitationError>;

    async fn initiate_signup(&self, email: &str) -> Result<SignupInvitation, InvitationError>;

    async fn get_invitation(&self, token: &str) -> Result<InvitationDetails, InvitationError>;

    /// Creates the account if needed and joins the workspace. All or nothing.
    ///
    /// When the email already has an account, `password` must match it and
    /// the account must be active.
    async fn accept_invitation(
        &self,
        token: &str,
        name: &str,
        password: &str,
    ) -> Result<AcceptResult, InvitationError>;

    async fn list_invitations(
        &self,
        requester: &User,
        workspace_id: i32,
    ) -> Result<Vec<InvitationSummary>, InvitationError>;

    async fn revoke_invitation(&self, requester: &User, id: i32) -> Result<(), InvitationError>;
}
