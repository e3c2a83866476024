//! Command-line interface for Planyty.

mod commands;

use clap::{Parser, Subcommand};

/// Planyty - multi-tenant project management backend
#[derive(Parser)]
#[command(name = "planyty")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API with the maintenance scheduler (default)
    #[command(alias = "server")]
    Serve,

    /// Create an administrator account
    CreateAdmin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        /// Falls back to the PLANYTY_ADMIN_PASSWORD environment variable
        #[arg(long, env = "PLANYTY_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Delete stale invitations and old activity now
    Prune,
}

pub use commands::*;
