use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::domain::events::ActivityEvent;
use crate::services::{
    AuthService, InvitationService, ProjectService, TaskService, TeamService, WorkspaceService,
};
use crate::state::SharedState;

pub mod auth;
mod error;
mod invitations;
mod observability;
mod projects;
mod system;
mod tasks;
mod teams;
mod types;
mod users;
mod validation;
mod workspaces;

pub use error::ApiError;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn event_bus(&self) -> &tokio::sync::broadcast::Sender<ActivityEvent> {
        &self.shared.event_bus
    }

    #[must_use]
    pub fn auth_service(&self) -> &Arc<dyn AuthService> {
        &self.shared.auth_service
    }

    #[must_use]
    pub fn invitation_service(&self) -> &Arc<dyn InvitationService> {
        &self.shared.invitation_service
    }

    #[must_use]
    pub fn workspace_service(&self) -> &Arc<dyn WorkspaceService> {
        &self.shared.workspace_service
    }

    #[must_use]
    pub fn team_service(&self) -> &Arc<dyn TeamService> {
        &self.shared.team_service
    }

    #[must_use]
    pub fn project_service(&self) -> &Arc<dyn ProjectService> {
        &self.shared.project_service
    }

    #[must_use]
    pub fn task_service(&self) -> &Arc<dyn TaskService> {
        &self.shared.task_service
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config().server.cors_allowed_origins.clone();

    let protected_routes = create_protected_router(state.clone());

    let api_router = Router::new()
        .merge(protected_routes)
        .route("/auth/login", post(auth::login))
        .route("/auth/initiate-signup", post(auth::initiate_signup))
        .route("/invitations/{id}", get(invitations::get_invitation))
        .route(
            "/invitations/accept/{token}",
            post(invitations::accept_invitation),
        )
        .route("/health/live", get(system::health_live))
        .route("/health/ready", get(system::health_ready))
        .layer(middleware::from_fn(observability::logging_middleware))
        .with_state(state);

    let cors_layer = if cors_origins.iter().any(|origin| origin == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/me", get(auth::me))
        .route("/auth/password", put(auth::change_password))
        .route("/auth/profile", put(auth::update_profile))
        .route("/invitations", post(invitations::create_invitation))
        .route("/invitations/{id}", delete(invitations::revoke_invitation))
        .route(
            "/workspaces",
            get(workspaces::list_workspaces).post(workspaces::create_workspace),
        )
        .route(
            "/workspaces/{id}",
            get(workspaces::get_workspace)
                .put(workspaces::update_workspace)
                .delete(workspaces::delete_workspace),
        )
        .route("/workspaces/{id}/activity", get(workspaces::get_activity))
        .route(
            "/workspaces/{id}/invitations",
            get(invitations::list_for_workspace),
        )
        .route("/teams", get(teams::list_teams).post(teams::create_team))
        .route("/teams/{id}/members", get(teams::list_members))
        .route(
            "/teams/{id}/members/{user_id}",
            delete(teams::remove_member),
        )
        .route(
            "/projects",
            get(projects::list_projects).post(projects::create_project),
        )
        .route(
            "/projects/{id}",
            get(projects::get_project)
                .put(projects::update_project)
                .delete(projects::delete_project),
        )
        .route("/tasks", get(tasks::list_tasks).post(tasks::create_task))
        .route(
            "/tasks/{id}",
            get(tasks::get_task)
                .put(tasks::update_task)
                .delete(tasks::delete_task),
        )
        .route("/tasks/{id}/subtasks", post(tasks::add_subtask))
        .route(
            "/subtasks/{id}",
            put(tasks::update_subtask).delete(tasks::delete_subtask),
        )
        .route("/tasks/{id}/tags", post(tasks::attach_tag))
        .route("/tasks/{id}/tags/{tag_id}", delete(tasks::detach_tag))
        .route("/users", get(users::list_users))
        .route("/users/{id}/role", put(users::set_role))
        .route("/users/{id}/active", put(users::set_active))
        .route("/metrics", get(observability::get_metrics))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}
