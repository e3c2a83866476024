//! Bootstrap an administrator account

use crate::config::Config;
use crate::services::AuthError;
use crate::state::SharedState;

pub async fn cmd_create_admin(
    config: Config,
    email: &str,
    name: &str,
    password: &str,
) -> anyhow::Result<()> {
    let state = SharedState::new(config).await?;

    match state.auth_service.create_admin(email, name, password).await {
        Ok(user) => {
            println!("Created admin {} <{}> (id {})", user.name, user.email, user.id);
            Ok(())
        }
        Err(AuthError::UserAlreadyExists) => {
            println!("A user with email {email} already exists.");
            Ok(())
        }
        Err(AuthError::Validation(msg)) => {
            println!("Invalid input: {msg}");
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!("Failed to create admin: {e}")),
    }
}
