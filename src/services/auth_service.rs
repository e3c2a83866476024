//! Domain service for authentication and user management.
//!
//! Handles login, token verification, role gates and the admin-side user
//! operations.

use serde::Serialize;
use thiserror::Error;

use crate::db::User;
use crate::domain::UserRole;
use crate::services::tokens::TokenError;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is inactive")]
    AccountInactive,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("User already exists")]
    UserAlreadyExists,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => Self::TokenExpired,
            TokenError::Invalid => Self::InvalidToken,
            TokenError::Encoding(e) => Self::Internal(e.to_string()),
        }
    }
}

/// Login result containing the session token and the user.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub token: String,
    pub user: User,
}

/// Coarse global-role gate. Ownership checks are layered on top by the
/// resource policy.
pub fn authorize(user: &User, allowed_roles: &[UserRole]) -> Result<(), AuthError> {
    if allowed_roles.contains(&user.role) {
        Ok(())
    } else {
        Err(AuthError::Forbidden)
    }
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Verifies credentials, promotes pending invitations and issues a token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for an unknown email or a
    /// wrong password and [`AuthError::AccountInactive`] for a deactivated
    /// account.
    async fn login(&self, email: &str, password: &str) -> Result<LoginResult, AuthError>;

    /// Resolves a bearer token to an active user.
    async fn verify_token(&self, token: &str) -> Result<User, AuthError>;

    /// Issues a session token for a user that was just created.
    fn issue_token(&self, user_id: i32) -> Result<String, AuthError>;

    async fn me(&self, user_id: i32) -> Result<User, AuthError>;

    async fn update_profile(&self, user_id: i32, name: &str) -> Result<User, AuthError>;

    /// Changes a user's password.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] if the current password is incorrect
    /// or the new one is invalid.
    async fn change_password(
        &self,
        user_id: i32,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError>;

    async fn list_users(&self, requester: &User) -> Result<Vec<User>, AuthError>;

    async fn set_role(
        &self,
        requester: &User,
        user_id: i32,
        role: UserRole,
    ) -> Result<User, AuthError>;

    async fn set_active(
        &self,
        requester: &User,
        user_id: i32,
        is_active: bool,
    ) -> Result<User, AuthError>;

    /// Creates an admin account (CLI bootstrap).
    async fn create_admin(&self, email: &str, name: &str, password: &str)
    -> Result<User, AuthError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(role: UserRole) -> User {
        User {
            id: 1,
            email: "a@b.c".to_string(),
            name: "A".to_string(),
            role,
            is_active: true,
            last_login: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_authorize() {
        let gate = [UserRole::Admin, UserRole::TeamLead];

        assert!(authorize(&user(UserRole::Admin), &gate).is_ok());
        assert!(authorize(&user(UserRole::TeamLead), &gate).is_ok());
        assert!(matches!(
            authorize(&user(UserRole::Member), &gate),
            Err(AuthError::Forbidden)
        ));
    }
}
