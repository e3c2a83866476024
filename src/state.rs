use std::sync::Arc;
use tokio::sync::broadcast;

use crate::config::Config;
use crate::db::Store;
use crate::domain::events::ActivityEvent;
use crate::services::{
    AuthService, InvitationService, LogMailer, Mailer, NotificationService, ProjectService,
    RelayMailer, SeaOrmAuthService, SeaOrmInvitationService, SeaOrmProjectService,
    SeaOrmTaskService, SeaOrmTeamService, SeaOrmWorkspaceService, TaskService, TeamService,
    TokenService, WorkspaceService,
};

fn build_mailer(config: &Config) -> anyhow::Result<Arc<dyn Mailer>> {
    if config.mail.enabled {
        Ok(Arc::new(RelayMailer::new(&config.mail)?))
    } else {
        Ok(Arc::new(LogMailer))
    }
}

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub event_bus: broadcast::Sender<ActivityEvent>,

    pub tokens: Arc<TokenService>,

    pub auth_service: Arc<dyn AuthService>,

    pub invitation_service: Arc<dyn InvitationService>,

    pub workspace_service: Arc<dyn WorkspaceService>,

    pub team_service: Arc<dyn TeamService>,

    pub project_service: Arc<dyn ProjectService>,

    pub task_service: Arc<dyn TaskService>,

    pub notifications: Arc<NotificationService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let mailer = build_mailer(&config)?;
        Self::with_mailer(config, mailer).await
    }

    pub async fn with_mailer(config: Config, mailer: Arc<dyn Mailer>) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_url,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        Ok(Self::from_store(config, store, mailer))
    }

    pub fn from_store(config: Config, store: Store, mailer: Arc<dyn Mailer>) -> Self {
        let (event_bus, _) = broadcast::channel(config.general.event_bus_buffer_size.max(1));

        let tokens = Arc::new(TokenService::new(&config.auth));

        let notifications = Arc::new(NotificationService::new(
            store.clone(),
            mailer,
            config.mail.frontend_url.clone(),
            event_bus.clone(),
        ));
        notifications.clone().start_listener();

        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            tokens.clone(),
            config.security.clone(),
            config.invitations.clone(),
            event_bus.clone(),
        )) as Arc<dyn AuthService>;

        let invitation_service = Arc::new(SeaOrmInvitationService::new(
            store.clone(),
            tokens.clone(),
            config.security.clone(),
            config.invitations.clone(),
            event_bus.clone(),
        )) as Arc<dyn InvitationService>;

        let workspace_service = Arc::new(SeaOrmWorkspaceService::new(
            store.clone(),
            event_bus.clone(),
        )) as Arc<dyn WorkspaceService>;

        let team_service = Arc::new(SeaOrmTeamService::new(store.clone())) as Arc<dyn TeamService>;

        let project_service =
            Arc::new(SeaOrmProjectService::new(store.clone())) as Arc<dyn ProjectService>;

        let task_service = Arc::new(SeaOrmTaskService::new(store.clone(), event_bus.clone()))
            as Arc<dyn TaskService>;

        Self {
            config: Arc::new(config),
            store,
            event_bus,
            tokens,
            auth_service,
            invitation_service,
            workspace_service,
            team_service,
            project_service,
            task_service,
            notifications,
        }
    }
}
