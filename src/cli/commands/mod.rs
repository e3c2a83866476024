mod create_admin;
mod prune;

pub use create_admin::cmd_create_admin;
pub use prune::cmd_prune;
