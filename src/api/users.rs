use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::validate_id;
use super::{ApiError, ApiResponse, AppState};
use crate::db::User;
use crate::domain::UserRole;

#[derive(Deserialize)]
pub struct SetRoleRequest {
    pub role: UserRole,
}

#[derive(Deserialize)]
pub struct SetActiveRequest {
    pub is_active: bool,
}

/// GET /users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<Json<ApiResponse<Vec<User>>>, ApiError> {
    let users = state.auth_service().list_users(&user).await?;
    Ok(Json(ApiResponse::success(users)))
}

/// PUT /users/{id}/role
pub async fn set_role(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<i32>,
    Json(payload): Json<SetRoleRequest>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    validate_id("user", id)?;
    let updated = state.auth_service().set_role(&user, id, payload.role).await?;
    Ok(Json(ApiResponse::success(updated)))
}

/// PUT /users/{id}/active
pub async fn set_active(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<i32>,
    Json(payload): Json<SetActiveRequest>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    validate_id("user", id)?;
    let updated = state
        .auth_service()
        .set_active(&user, id, payload.is_active)
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}
