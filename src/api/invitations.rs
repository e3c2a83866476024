use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::{validate_email, validate_id};
use super::{ApiError, ApiResponse, AppState, MessageResponse};
use crate::db::User;
use crate::domain::UserRole;
use crate::services::invitation_service::{AcceptResult, InvitationDetails, InvitationSummary};

#[derive(Deserialize)]
pub struct CreateInvitationRequest {
    pub workspace_id: i32,
    pub email: String,
    #[serde(default = "default_invitation_role")]
    pub role: UserRole,
}

const fn default_invitation_role() -> UserRole {
    UserRole::Member
}

/// Existing accounts send their current password; a new account also needs
/// a name.
#[derive(Deserialize, Default)]
#[serde(default)]
pub struct AcceptInvitationRequest {
    pub name: String,
    pub password: String,
}

/// GET /invitations/{token}
///
/// Shares its path template with the revoke route, so the segment is named
/// `id` in the router.
pub async fn get_invitation(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<Json<ApiResponse<InvitationDetails>>, ApiError> {
    let details = state.invitation_service().get_invitation(&token).await?;
    Ok(Json(ApiResponse::success(details)))
}

/// POST /invitations/accept/{token}
pub async fn accept_invitation(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
    payload: Option<Json<AcceptInvitationRequest>>,
) -> Result<Json<ApiResponse<AcceptResult>>, ApiError> {
    let payload = payload.map(|Json(payload)| payload).unwrap_or_default();

    let result = state
        .invitation_service()
        .accept_invitation(&token, &payload.name, &payload.password)
        .await?;

    Ok(Json(ApiResponse::success(result)))
}

/// POST /invitations
pub async fn create_invitation(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(payload): Json<CreateInvitationRequest>,
) -> Result<Json<ApiResponse<InvitationSummary>>, ApiError> {
    validate_id("workspace", payload.workspace_id)?;
    let email = validate_email(&payload.email)?;

    let invitation = state
        .invitation_service()
        .create_invitation(&user, payload.workspace_id, &email, payload.role)
        .await?;

    Ok(Json(ApiResponse::success(invitation)))
}

/// GET /workspaces/{id}/invitations
pub async fn list_for_workspace(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(workspace_id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<InvitationSummary>>>, ApiError> {
    validate_id("workspace", workspace_id)?;
    let invitations = state
        .invitation_service()
        .list_invitations(&user, workspace_id)
        .await?;
    Ok(Json(ApiResponse::success(invitations)))
}

/// DELETE /invitations/{id}
pub async fn revoke_invitation(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    validate_id("invitation", id)?;
    state.invitation_service().revoke_invitation(&user, id).await?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Invitation revoked".to_string(),
    })))
}
