//! `SeaORM` implementation of the `AuthService` trait.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::broadcast;
use tracing::{error, info};

use crate::config::{InvitationConfig, SecurityConfig};
use crate::db::repositories::user::{NewUser, hash_password_blocking, verify_password_blocking};
use crate::db::{Store, User};
use crate::domain::UserRole;
use crate::domain::events::ActivityEvent;
use crate::services::auth_service::{AuthError, AuthService, LoginResult, authorize};
use crate::services::membership::sync_pending_invitations;
use crate::services::tokens::TokenService;

pub struct SeaOrmAuthService {
    store: Store,
    tokens: Arc<TokenService>,
    security: SecurityConfig,
    invitations: InvitationConfig,
    event_bus: broadcast::Sender<ActivityEvent>,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(
        store: Store,
        tokens: Arc<TokenService>,
        security: SecurityConfig,
        invitations: InvitationConfig,
        event_bus: broadcast::Sender<ActivityEvent>,
    ) -> Self {
        Self {
            store,
            tokens,
            security,
            invitations,
            event_bus,
        }
    }

    async fn check_password(&self, password_hash: String, password: &str) -> Result<bool, AuthError> {
        verify_password_blocking(password_hash, password)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))
    }

    /// Login must not fail because of the sync; its errors are only logged.
    async fn sync_invitations(&self, user: &User) {
        match sync_pending_invitations(&self.store.conn, user.id, &user.email, &self.invitations)
            .await
        {
            Ok(report) => {
                for accepted in report.promoted {
                    let _ = self.event_bus.send(ActivityEvent::InvitationAccepted {
                        invitation_id: accepted.id,
                        workspace_id: accepted.workspace_id,
                        user_id: user.id,
                    });
                }
            }
            Err(e) => {
                error!(user_id = user.id, error = %e, "Invitation sync failed and was rolled back");
            }
        }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResult, AuthError> {
        let email = email.trim().to_lowercase();

        let Some((mut user, password_hash)) =
            self.store.users().get_by_email_with_password(&email).await?
        else {
            return Err(AuthError::InvalidCredentials);
        };

        if !self.check_password(password_hash, password).await? {
            return Err(AuthError::InvalidCredentials);
        }

        if !user.is_active {
            return Err(AuthError::AccountInactive);
        }

        self.sync_invitations(&user).await;

        self.store.users().touch_last_login(user.id).await?;
        user.last_login = Some(Utc::now());

        let token = self.tokens.issue(user.id)?;

        let _ = self
            .event_bus
            .send(ActivityEvent::UserLoggedIn { user_id: user.id });

        info!(user_id = user.id, "User logged in");
        Ok(LoginResult { token, user })
    }

    async fn verify_token(&self, token: &str) -> Result<User, AuthError> {
        let claims = self.tokens.verify(token)?;
        let user_id = claims.user_id().ok_or(AuthError::InvalidToken)?;

        let user = self
            .store
            .users()
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        if !user.is_active {
            return Err(AuthError::Unauthorized);
        }

        Ok(user)
    }

    fn issue_token(&self, user_id: i32) -> Result<String, AuthError> {
        Ok(self.tokens.issue(user_id)?)
    }

    async fn me(&self, user_id: i32) -> Result<User, AuthError> {
        self.store
            .users()
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| AuthError::NotFound(format!("User {user_id}")))
    }

    async fn update_profile(&self, user_id: i32, name: &str) -> Result<User, AuthError> {
        self.store
            .users()
            .update_name(user_id, name)
            .await?
            .ok_or_else(|| AuthError::NotFound(format!("User {user_id}")))
    }

    async fn change_password(
        &self,
        user_id: i32,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        if new_password.len() < 8 {
            return Err(AuthError::Validation(
                "New password must be at least 8 characters".to_string(),
            ));
        }

        if current_password == new_password {
            return Err(AuthError::Validation(
                "New password must be different from current password".to_string(),
            ));
        }

        let password_hash = self
            .store
            .users()
            .get_password_hash(user_id)
            .await?
            .ok_or_else(|| AuthError::NotFound(format!("User {user_id}")))?;

        if !self.check_password(password_hash, current_password).await? {
            return Err(AuthError::Validation(
                "Current password is incorrect".to_string(),
            ));
        }

        self.store
            .users()
            .update_password(user_id, new_password, &self.security)
            .await?;

        info!(user_id, "Password changed");
        Ok(())
    }

    async fn list_users(&self, requester: &User) -> Result<Vec<User>, AuthError> {
        authorize(requester, &[UserRole::Admin])?;
        Ok(self.store.users().list_all().await?)
    }

    async fn set_role(
        &self,
        requester: &User,
        user_id: i32,
        role: UserRole,
    ) -> Result<User, AuthError> {
        authorize(requester, &[UserRole::Admin])?;

        if requester.id == user_id && role != UserRole::Admin {
            return Err(AuthError::Validation(
                "Admins cannot demote themselves".to_string(),
            ));
        }

        let user = self
            .store
            .users()
            .set_role(user_id, role)
            .await?
            .ok_or_else(|| AuthError::NotFound(format!("User {user_id}")))?;

        info!(user_id, role = %role, actor_id = requester.id, "User role changed");
        Ok(user)
    }

    async fn set_active(
        &self,
        requester: &User,
        user_id: i32,
        is_active: bool,
    ) -> Result<User, AuthError> {
        authorize(requester, &[UserRole::Admin])?;

        if requester.id == user_id && !is_active {
            return Err(AuthError::Validation(
                "Admins cannot deactivate themselves".to_string(),
            ));
        }

        let user = self
            .store
            .users()
            .set_active(user_id, is_active)
            .await?
            .ok_or_else(|| AuthError::NotFound(format!("User {user_id}")))?;

        info!(user_id, is_active, actor_id = requester.id, "User activation changed");
        Ok(user)
    }

    async fn create_admin(
        &self,
        email: &str,
        name: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let email = email.trim().to_lowercase();

        if !email.contains('@') {
            return Err(AuthError::Validation("Invalid email address".to_string()));
        }
        if password.len() < 8 {
            return Err(AuthError::Validation(
                "Password must be at least 8 characters".to_string(),
            ));
        }

        if self.store.users().get_by_email(&email).await?.is_some() {
            return Err(AuthError::UserAlreadyExists);
        }

        let password_hash = hash_password_blocking(password, &self.security).await?;
        let user = self
            .store
            .users()
            .create(NewUser {
                email,
                name: name.trim().to_string(),
                password_hash,
                role: UserRole::Admin,
            })
            .await?;

        info!(user_id = user.id, "Created admin account");
        Ok(user)
    }
}
