pub mod prelude;

pub mod activity_logs;
pub mod invitations;
pub mod projects;
pub mod subtasks;
pub mod tags;
pub mod task_tags;
pub mod tasks;
pub mod team_members;
pub mod teams;
pub mod users;
pub mod workspaces;
