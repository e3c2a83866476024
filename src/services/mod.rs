pub mod access;
pub use access::{Access, ResourceError};

pub mod tokens;
pub use tokens::TokenService;

pub mod membership;

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, LoginResult, authorize};
pub use auth_service_impl::SeaOrmAuthService;

pub mod invitation_service;
pub mod invitation_service_impl;
pub use invitation_service::{InvitationError, InvitationService};
pub use invitation_service_impl::SeaOrmInvitationService;

pub mod workspace_service;
pub mod workspace_service_impl;
pub use workspace_service::WorkspaceService;
pub use workspace_service_impl::SeaOrmWorkspaceService;

pub mod team_service;
pub mod team_service_impl;
pub use team_service::TeamService;
pub use team_service_impl::SeaOrmTeamService;

pub mod project_service;
pub mod project_service_impl;
pub use project_service::ProjectService;
pub use project_service_impl::SeaOrmProjectService;

pub mod task_service;
pub mod task_service_impl;
pub use task_service::TaskService;
pub use task_service_impl::SeaOrmTaskService;

pub mod mailer;
pub use mailer::{LogMailer, Mailer, RelayMailer};

pub mod notifications;
pub use notifications::NotificationService;

pub mod scheduler;
pub use scheduler::Scheduler;
