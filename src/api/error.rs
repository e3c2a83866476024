use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use super::ApiResponse;
use crate::services::{AuthError, InvitationError, ResourceError};

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    DatabaseError(String),

    ValidationError(String),

    Conflict(String),

    InternalError(String),

    Unauthorized(String),

    Forbidden(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            ApiError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
            ApiError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
        };

        let body = ApiResponse::<()>::error(message);
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::InternalError(format!("{err:#}"))
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials
            | AuthError::InvalidToken
            | AuthError::TokenExpired
            | AuthError::Unauthorized => ApiError::Unauthorized(err.to_string()),
            AuthError::AccountInactive => ApiError::Forbidden(err.to_string()),
            AuthError::Forbidden => ApiError::forbidden(),
            AuthError::UserAlreadyExists => ApiError::Conflict(err.to_string()),
            AuthError::NotFound(what) => ApiError::NotFound(format!("{what} not found")),
            AuthError::Validation(msg) => ApiError::ValidationError(msg),
            AuthError::Database(msg) => ApiError::DatabaseError(msg),
            AuthError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

impl From<InvitationError> for ApiError {
    fn from(err: InvitationError) -> Self {
        match err {
            InvitationError::InvitationNotFound => ApiError::NotFound(err.to_string()),
            InvitationError::Expired | InvitationError::NotInvited => {
                ApiError::Forbidden(err.to_string())
            }
            InvitationError::InvalidCredentials => ApiError::Unauthorized(err.to_string()),
            InvitationError::AccountInactive => ApiError::Forbidden(err.to_string()),
            InvitationError::Forbidden => ApiError::forbidden(),
            InvitationError::UserAlreadyExists | InvitationError::NoTeamForWorkspace(_) => {
                ApiError::Conflict(err.to_string())
            }
            InvitationError::NotFound(what) => ApiError::NotFound(format!("{what} not found")),
            InvitationError::Conflict(msg) => ApiError::Conflict(msg),
            InvitationError::Validation(msg) => ApiError::ValidationError(msg),
            InvitationError::Database(msg) => ApiError::DatabaseError(msg),
            InvitationError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

impl From<ResourceError> for ApiError {
    fn from(err: ResourceError) -> Self {
        match err {
            ResourceError::NotFound(what) => ApiError::NotFound(format!("{what} not found")),
            ResourceError::Forbidden => ApiError::forbidden(),
            ResourceError::Validation(msg) => ApiError::ValidationError(msg),
            ResourceError::Conflict(msg) => ApiError::Conflict(msg),
            ResourceError::Database(msg) => ApiError::DatabaseError(msg),
            ResourceError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

impl ApiError {
    pub fn not_found(resource: &str, id: impl fmt::Display) -> Self {
        ApiError::NotFound(format!("{} {} not found", resource, id))
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::ValidationError(msg.into())
    }

    pub fn forbidden() -> Self {
        ApiError::Forbidden("You do not have permission to perform this action".to_string())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ApiError::InternalError(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: impl Into<ApiError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_of(AuthError::InvalidCredentials), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(AuthError::TokenExpired), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(AuthError::AccountInactive), StatusCode::FORBIDDEN);
        assert_eq!(status_of(InvitationError::NotInvited), StatusCode::FORBIDDEN);
        assert_eq!(
            status_of(InvitationError::InvitationNotFound),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(InvitationError::NoTeamForWorkspace(1)),
            StatusCode::CONFLICT
        );
        assert_eq!(status_of(ResourceError::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(
            status_of(ResourceError::Database("boom".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_invalid_credentials_message() {
        let err = ApiError::from(AuthError::InvalidCredentials);
        assert!(matches!(err, ApiError::Unauthorized(ref msg) if msg == "Invalid credentials"));
    }
}
