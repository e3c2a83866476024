pub use super::activity_logs::Entity as ActivityLogs;
pub use super::invitations::Entity as Invitations;
pub use super::projects::Entity as Projects;
pub use super::subtasks::Entity as Subtasks;
pub use super::tags::Entity as Tags;
pub use super::task_tags::Entity as TaskTags;
pub use super::tasks::Entity as Tasks;
pub use super::team_members::Entity as TeamMembers;
pub use super::teams::Entity as Teams;
pub use super::users::Entity as Users;
pub use super::workspaces::Entity as Workspaces;
