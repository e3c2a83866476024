pub mod activity;
pub mod invitation;
pub mod project;
pub mod task;
pub mod team;
pub mod user;
pub mod workspace;
