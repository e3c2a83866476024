//! Turning invitations into team memberships.
//!
//! Both invitation acceptance and the login-time sync go through
//! [`join_workspace`], always on a caller-owned transaction.

use chrono::Utc;
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{InvitationConfig, TeamResolution};
use crate::db::repositories::{invitation, team};
use crate::entities::{invitations, team_members, teams};

#[derive(Debug, Error)]
pub enum MembershipError {
    #[error("Workspace {0} has no team to join")]
    NoTeam(i32),

    #[error("Workspace {workspace_id} has {count} teams and no single team can be chosen")]
    AmbiguousTeam { workspace_id: i32, count: usize },

    #[error(transparent)]
    Database(#[from] anyhow::Error),
}

/// Picks the team an invited user joins.
pub async fn resolve_team<C: ConnectionTrait>(
    db: &C,
    workspace_id: i32,
    resolution: TeamResolution,
) -> Result<teams::Model, MembershipError> {
    let mut candidates = team::teams_for_workspace(db, workspace_id).await?;

    match (resolution, candidates.len()) {
        (_, 0) => Err(MembershipError::NoTeam(workspace_id)),
        (TeamResolution::Single, count) if count > 1 => Err(MembershipError::AmbiguousTeam {
            workspace_id,
            count,
        }),
        _ => Ok(candidates.swap_remove(0)),
    }
}

/// Adds the user to the invitation's workspace. Idempotent per (team, user).
pub async fn join_workspace<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    invitation: &invitations::Model,
    resolution: TeamResolution,
) -> Result<(team_members::Model, bool), MembershipError> {
    let team = resolve_team(db, invitation.workspace_id, resolution).await?;
    let membership =
        team::find_or_create_member(db, team.id, user_id, invitation.role.team_role()).await?;
    Ok(membership)
}

#[derive(Debug, Default)]
pub struct SyncReport {
    pub promoted: Vec<invitations::Model>,
    pub skipped: usize,
}

/// Promotes every pending invitation for `email` into a membership of
/// `user_id`, in a single transaction.
///
/// Invitations whose team cannot be resolved stay pending. Any database
/// error aborts and rolls back the whole sync.
pub async fn sync_pending_invitations(
    conn: &DatabaseConnection,
    user_id: i32,
    email: &str,
    config: &InvitationConfig,
) -> anyhow::Result<SyncReport> {
    let txn = conn.begin().await?;
    let now = Utc::now();
    let mut report = SyncReport::default();

    for pending in invitation::pending_for_email(&txn, email).await? {
        if pending.is_expired(now) {
            if config.enforce_expiry_on_accept {
                report.skipped += 1;
                continue;
            }
            warn!(
                invitation_id = pending.id,
                "Promoting expired invitation during login sync"
            );
        }

        match join_workspace(&txn, user_id, &pending, config.team_resolution).await {
            Ok(_) => {
                let accepted = invitation::mark_accepted(&txn, pending).await?;
                report.promoted.push(accepted);
            }
            Err(MembershipError::Database(e)) => return Err(e),
            Err(e) => {
                warn!(invitation_id = pending.id, error = %e, "Skipping invitation during login sync");
                report.skipped += 1;
            }
        }
    }

    txn.commit().await?;

    if !report.promoted.is_empty() {
        info!(
            user_id,
            promoted = report.promoted.len(),
            "Promoted pending invitations at login"
        );
    }

    Ok(report)
}
