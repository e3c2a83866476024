use axum::{
    Extension, Json,
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::validation::{validate_email, validate_name, validate_password};
use super::{ApiError, ApiResponse, AppState, MessageResponse};
use crate::db::User;
use crate::services::AuthError;
use crate::services::invitation_service::SignupInvitation;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Deserialize)]
pub struct InitiateSignupRequest {
    pub email: String,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub name: String,
}

/// Resolves `Authorization: Bearer <jwt>` to an active [`User`] and stores it
/// in the request extensions for the handlers behind it.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(&headers).ok_or(AuthError::Unauthorized)?;

    let user = state.auth_service().verify_token(&token).await?;
    tracing::Span::current().record("user_id", user.id);

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(axum::http::header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    if payload.email.trim().is_empty() {
        return Err(ApiError::validation("Email is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let result = state
        .auth_service()
        .login(&payload.email, &payload.password)
        .await?;

    Ok(Json(ApiResponse::success(LoginResponse {
        token: result.token,
        user: result.user,
    })))
}

/// POST /auth/initiate-signup
///
/// Only invited addresses may sign up; the response carries the token the
/// client completes the signup with.
pub async fn initiate_signup(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<InitiateSignupRequest>,
) -> Result<Json<ApiResponse<SignupInvitation>>, ApiError> {
    let email = validate_email(&payload.email)?;
    let invitation = state.invitation_service().initiate_signup(&email).await?;
    Ok(Json(ApiResponse::success(invitation)))
}

/// GET /auth/me
pub async fn me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = state.auth_service().me(user.id).await?;
    Ok(Json(ApiResponse::success(user)))
}

/// PUT /auth/password
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    validate_password(&payload.new_password)?;

    state
        .auth_service()
        .change_password(user.id, &payload.current_password, &payload.new_password)
        .await?;

    tracing::info!(user_id = user.id, "Password changed");

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Password updated successfully".to_string(),
    })))
}

/// PUT /auth/profile
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let name = validate_name("Name", &payload.name)?;
    let user = state.auth_service().update_profile(user.id, name).await?;
    Ok(Json(ApiResponse::success(user)))
}
