#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{DateTime, Duration, Utc};
use http_body_util::BodyExt;
use planyty::config::Config;
use planyty::db::repositories::invitation::NewInvitation;
use planyty::db::repositories::team::NewTeam;
use planyty::db::repositories::user::{NewUser, hash_password};
use planyty::db::repositories::workspace::NewWorkspace;
use planyty::db::{Store, User};
use planyty::domain::{TeamRole, UserRole};
use planyty::entities::{invitations, team_members, teams, workspaces};
use planyty::services::LogMailer;
use planyty::state::SharedState;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

pub const PASSWORD: &str = "correct-horse-battery";

pub struct TestApp {
    pub router: Router,
    pub shared: Arc<SharedState>,
    pub store: Store,
    pub config: Config,
    db_path: PathBuf,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_path);
    }
}

pub fn test_config(db_path: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.general.database_url = format!("sqlite://{}?mode=rwc", db_path.display());
    config.general.max_db_connections = 1;
    config.auth.jwt_secret = "integration-test-secret-0123456789".to_string();
    config.security.argon2_memory_cost_kib = 64;
    config.security.argon2_time_cost = 1;
    config.security.argon2_parallelism = 1;
    config.mail.enabled = false;
    config.maintenance.enabled = false;
    config.observability.metrics_enabled = false;
    config
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

pub async fn spawn_app_with(customize: impl FnOnce(&mut Config)) -> TestApp {
    let db_path = std::env::temp_dir().join(format!("planyty-test-{}.db", Uuid::new_v4()));
    let mut config = test_config(&db_path);
    customize(&mut config);

    let store = Store::with_pool_options(&config.general.database_url, 1, 1)
        .await
        .expect("Failed to open test database");

    let shared = Arc::new(SharedState::from_store(
        config.clone(),
        store.clone(),
        Arc::new(LogMailer),
    ));
    let state = planyty::api::create_app_state(shared.clone(), None);
    let router = planyty::api::router(state);

    TestApp {
        router,
        shared,
        store,
        config,
        db_path,
    }
}

impl TestApp {
    pub async fn seed_user(&self, email: &str, role: UserRole) -> User {
        let password_hash =
            hash_password(PASSWORD, Some(&self.config.security)).expect("Failed to hash password");
        self.store
            .users()
            .create(NewUser {
                email: email.to_string(),
                name: email.split('@').next().unwrap_or(email).to_string(),
                password_hash,
                role,
            })
            .await
            .expect("Failed to seed user")
    }

    pub async fn seed_workspace(&self, owner: &User, name: &str) -> (workspaces::Model, teams::Model) {
        self.store
            .workspaces()
            .create_with_default_team(NewWorkspace {
                name: name.to_string(),
                description: None,
                color: "#3b82f6".to_string(),
                created_by: owner.id,
            })
            .await
            .expect("Failed to seed workspace")
    }

    pub async fn add_member(&self, team: &teams::Model, user: &User) {
        self.store
            .teams()
            .find_or_create_member(team.id, user.id, TeamRole::Member)
            .await
            .expect("Failed to add team member");
    }

    /// Extra team in an existing workspace, led by `creator`.
    pub async fn seed_team(&self, workspace: &workspaces::Model, creator: &User, name: &str) -> teams::Model {
        self.store
            .teams()
            .create_with_lead(NewTeam {
                name: name.to_string(),
                description: None,
                workspace_id: workspace.id,
                creator_id: creator.id,
            })
            .await
            .expect("Failed to seed team")
    }

    pub async fn count_memberships(&self, team_id: i32, user_id: i32) -> u64 {
        team_members::Entity::find()
            .filter(team_members::Column::TeamId.eq(team_id))
            .filter(team_members::Column::UserId.eq(user_id))
            .count(&self.store.conn)
            .await
            .expect("Failed to count team memberships")
    }

    pub async fn seed_invitation(
        &self,
        workspace: &workspaces::Model,
        inviter: &User,
        email: &str,
        role: UserRole,
        expires_at: DateTime<Utc>,
    ) -> invitations::Model {
        self.store
            .invitations()
            .create(NewInvitation {
                email: email.to_string(),
                role,
                workspace_id: workspace.id,
                invited_by: inviter.id,
                expires_at,
            })
            .await
            .expect("Failed to seed invitation")
    }

    pub async fn seed_pending_invitation(
        &self,
        workspace: &workspaces::Model,
        inviter: &User,
        email: &str,
    ) -> invitations::Model {
        self.seed_invitation(
            workspace,
            inviter,
            email,
            UserRole::Member,
            Utc::now() + Duration::days(7),
        )
        .await
    }

    pub fn token_for(&self, user: &User) -> String {
        self.shared
            .tokens
            .issue(user.id)
            .expect("Failed to issue token")
    }

    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }

        let request = match body {
            Some(json) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, json)
    }

    pub async fn login(&self, email: &str, password: &str) -> (StatusCode, Value) {
        self.request(
            "POST",
            "/api/auth/login",
            None,
            Some(serde_json::json!({ "email": email, "password": password })),
        )
        .await
    }
}
