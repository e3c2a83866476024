//! Outgoing email.
//!
//! Messages are handed to an HTTP relay; delivery is the relay's problem.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::MailConfig;
use crate::domain::UserRole;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub text: String,
}

#[async_trait::async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &Email) -> Result<()>;
}

#[derive(Serialize)]
struct RelayRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

pub struct RelayMailer {
    client: Client,
    relay_url: String,
    api_key: Option<String>,
    from_address: String,
}

impl RelayMailer {
    pub fn new(config: &MailConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .user_agent(concat!("Planyty/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build mail relay HTTP client")?;

        Ok(Self {
            client,
            relay_url: config.relay_url.clone(),
            api_key: config.api_key.clone(),
            from_address: config.from_address.clone(),
        })
    }
}

#[async_trait::async_trait]
impl Mailer for RelayMailer {
    async fn send(&self, email: &Email) -> Result<()> {
        let mut request = self.client.post(&self.relay_url).json(&RelayRequest {
            from: &self.from_address,
            to: &email.to,
            subject: &email.subject,
            text: &email.text,
        });

        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.context("Mail relay unreachable")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Mail relay error: {} - {}", status, body));
        }

        debug!(to = %email.to, "Email handed to relay");
        Ok(())
    }
}

/// Writes emails to the log instead of sending them.
pub struct LogMailer;

#[async_trait::async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &Email) -> Result<()> {
        info!(to = %email.to, subject = %email.subject, "Mail disabled, not sending");
        Ok(())
    }
}

#[must_use]
pub fn invitation_link(frontend_url: &str, token: &str) -> String {
    format!(
        "{}/accept-invitation/{token}",
        frontend_url.trim_end_matches('/')
    )
}

#[must_use]
pub fn invitation_email(
    to: &str,
    workspace_name: &str,
    role: UserRole,
    frontend_url: &str,
    token: &str,
) -> Email {
    let role = match role {
        UserRole::Admin => "an admin",
        UserRole::TeamLead => "a team lead",
        UserRole::Member => "a member",
    };

    Email {
        to: to.to_string(),
        subject: format!("You're invited to join {workspace_name} on Planyty"),
        text: format!(
            "You have been invited to join the workspace \"{workspace_name}\" as {role}.\n\n\
             Accept the invitation here:\n{}\n\n\
             If you did not expect this email you can ignore it.",
            invitation_link(frontend_url, token)
        ),
    }
}

#[must_use]
pub fn task_assigned_email(to: &str, task_title: &str, frontend_url: &str, task_id: i32) -> Email {
    Email {
        to: to.to_string(),
        subject: format!("Task assigned: {task_title}"),
        text: format!(
            "You have been assigned the task \"{task_title}\".\n\n{}/tasks/{task_id}",
            frontend_url.trim_end_matches('/')
        ),
    }
}
