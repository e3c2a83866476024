//! `SeaORM` implementation of the `InvitationService` trait.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use sea_orm::TransactionTrait;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::config::{InvitationConfig, SecurityConfig};
use crate::db::repositories::invitation::{NewInvitation, find_by_token, mark_accepted};
use crate::db::repositories::user::{
    NewUser, create_user, find_by_email, hash_password_blocking, verify_password_blocking,
};
use crate::db::{Store, User};
use crate::domain::events::ActivityEvent;
use crate::domain::policy::Action;
use crate::domain::{InvitationStatus, UserRole};
use crate::services::access::Access;
use crate::services::invitation_service::{
    AcceptResult, InvitationDetails, InvitationError, InvitationService, InvitationSummary,
    SignupInvitation,
};
use crate::services::membership::join_workspace;
use crate::services::tokens::TokenService;

pub struct SeaOrmInvitationService {
    store: Store,
    access: Access,
    tokens: Arc<TokenService>,
    security: SecurityConfig,
    config: InvitationConfig,
    event_bus: broadcast::Sender<ActivityEvent>,
}

impl SeaOrmInvitationService {
    #[must_use]
    pub fn new(
        store: Store,
        tokens: Arc<TokenService>,
        security: SecurityConfig,
        config: InvitationConfig,
        event_bus: broadcast::Sender<ActivityEvent>,
    ) -> Self {
        Self {
            access: Access::new(store.clone()),
            store,
            tokens,
            security,
            config,
            event_bus,
        }
    }
}

#[async_trait]
impl InvitationService for SeaOrmInvitationService {
    async fn create_invitation(
        &self,
        requester: &User,
        workspace_id: i32,
        email: &str,
        role: UserRole,
    ) -> Result<InvitationSummary, InvitationError> {
        if role == UserRole::Admin {
            return Err(InvitationError::Validation(
                "Invitation role must be team_lead or member".to_string(),
            ));
        }

        let email = email.trim().to_lowercase();
        let workspace = self
            .access
            .workspace(requester, workspace_id, Action::Administer)
            .await?;

        if let Some(existing) = self.store.users().get_by_email(&email).await?
            && self
                .store
                .teams()
                .is_workspace_member(existing.id, workspace.id)
                .await?
        {
            return Err(InvitationError::Conflict(format!(
                "{email} is already a member of this workspace"
            )));
        }

        let expires_at = Utc::now() + Duration::hours(i64::from(self.config.expiry_hours));
        let repo = self.store.invitations();

        let invitation = match repo
            .pending_for_email_and_workspace(&email, workspace.id)
            .await?
        {
            Some(pending) => {
                info!(invitation_id = pending.id, "Resending pending invitation");
                repo.rotate(pending, role, requester.id, expires_at).await?
            }
            None => {
                repo.create(NewInvitation {
                    email: email.clone(),
                    role,
                    workspace_id: workspace.id,
                    invited_by: requester.id,
                    expires_at,
                })
                .await?
            }
        };

        let _ = self.event_bus.send(ActivityEvent::InvitationSent {
            invitation_id: invitation.id,
            workspace_id: workspace.id,
            workspace_name: workspace.name,
            email,
            role,
            token: invitation.token.clone(),
            actor_id: requester.id,
        });

        Ok(InvitationSummary::from(invitation))
    }

    async fn initiate_signup(&self, email: &str) -> Result<SignupInvitation, InvitationError> {
        let email = email.trim().to_lowercase();

        if self.store.users().get_by_email(&email).await?.is_some() {
            return Err(InvitationError::UserAlreadyExists);
        }

        let now = Utc::now();
        let invitation = self
            .store
            .invitations()
            .pending_for_email(&email)
            .await?
            .into_iter()
            .find(|invitation| invitation.is_valid(now))
            .ok_or(InvitationError::NotInvited)?;

        Ok(SignupInvitation {
            token: invitation.token,
            role: invitation.role,
            email: invitation.email,
            workspace_id: invitation.workspace_id,
        })
    }

    async fn get_invitation(&self, token: &str) -> Result<InvitationDetails, InvitationError> {
        let invitation = self
            .store
            .invitations()
            .get_by_token(token)
            .await?
            .ok_or(InvitationError::InvitationNotFound)?;

        let workspace_name = self
            .store
            .workspaces()
            .get(invitation.workspace_id)
            .await?
            .map(|workspace| workspace.name)
            .unwrap_or_default();

        Ok(InvitationDetails {
            expired: invitation.is_expired(Utc::now()),
            email: invitation.email,
            role: invitation.role,
            workspace_id: invitation.workspace_id,
            workspace_name,
            status: invitation.status,
            expires_at: invitation.expires_at,
        })
    }

    async fn accept_invitation(
        &self,
        token: &str,
        name: &str,
        password: &str,
    ) -> Result<AcceptResult, InvitationError> {
        let txn = self.store.conn.begin().await?;

        let invitation = find_by_token(&txn, token)
            .await?
            .filter(|invitation| invitation.status == InvitationStatus::Pending)
            .ok_or(InvitationError::InvitationNotFound)?;

        if invitation.is_expired(Utc::now()) {
            if self.config.enforce_expiry_on_accept {
                return Err(InvitationError::Expired);
            }
            warn!(invitation_id = invitation.id, "Accepting expired invitation");
        }

        let user = match find_by_email(&txn, &invitation.email).await? {
            // An existing account signs in with its own password.
            Some(existing) => {
                if !existing.is_active {
                    return Err(InvitationError::AccountInactive);
                }
                if !verify_password_blocking(existing.password_hash.clone(), password).await? {
                    return Err(InvitationError::InvalidCredentials);
                }
                User::from(existing)
            }
            None => {
                if name.trim().is_empty() {
                    return Err(InvitationError::Validation("Name is required".to_string()));
                }
                if password.len() < 8 {
                    return Err(InvitationError::Validation(
                        "Password must be at least 8 characters".to_string(),
                    ));
                }
                let password_hash = hash_password_blocking(password, &self.security).await?;
                create_user(
                    &txn,
                    NewUser {
                        email: invitation.email.clone(),
                        name: name.trim().to_string(),
                        password_hash,
                        role: invitation.role,
                    },
                )
                .await?
            }
        };

        let (membership, joined) =
            join_workspace(&txn, user.id, &invitation, self.config.team_resolution).await?;

        let accepted = mark_accepted(&txn, invitation).await?;

        txn.commit().await?;

        info!(
            invitation_id = accepted.id,
            user_id = user.id,
            team_id = membership.team_id,
            "Invitation accepted"
        );

        let _ = self.event_bus.send(ActivityEvent::InvitationAccepted {
            invitation_id: accepted.id,
            workspace_id: accepted.workspace_id,
            user_id: user.id,
        });

        let token = self.tokens.issue(user.id).map_err(|e| InvitationError::Internal(e.to_string()))?;

        Ok(AcceptResult {
            token,
            user,
            workspace_id: accepted.workspace_id,
            team_id: membership.team_id,
            joined,
        })
    }

    async fn list_invitations(
        &self,
        requester: &User,
        workspace_id: i32,
    ) -> Result<Vec<InvitationSummary>, InvitationError> {
        let workspace = self
            .access
            .workspace(requester, workspace_id, Action::Administer)
            .await?;

        let invitations = self
            .store
            .invitations()
            .list_for_workspace(workspace.id)
            .await?;

        Ok(invitations.into_iter().map(InvitationSummary::from).collect())
    }

    async fn revoke_invitation(&self, requester: &User, id: i32) -> Result<(), InvitationError> {
        let invitation = self
            .store
            .invitations()
            .get(id)
            .await?
            .ok_or(InvitationError::InvitationNotFound)?;

        self.access
            .workspace(requester, invitation.workspace_id, Action::Administer)
            .await?;

        if invitation.status != InvitationStatus::Pending {
            return Err(InvitationError::Conflict(
                "Only pending invitations can be revoked".to_string(),
            ));
        }

        self.store.invitations().delete(invitation.id).await?;
        info!(invitation_id = id, actor_id = requester.id, "Invitation revoked");
        Ok(())
    }
}
