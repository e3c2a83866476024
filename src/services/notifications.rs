use crate::db::Store;
use crate::domain::events::ActivityEvent;
use crate::services::mailer::{Email, Mailer, invitation_email, task_assigned_email};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{error, warn};

/// Turns domain events into activity-log rows and emails.
///
/// Nothing here can fail the operation that published the event; errors are
/// logged and dropped.
pub struct NotificationService {
    store: Store,
    mailer: Arc<dyn Mailer>,
    frontend_url: String,
    event_bus: broadcast::Sender<ActivityEvent>,
}

impl NotificationService {
    #[must_use]
    pub fn new(
        store: Store,
        mailer: Arc<dyn Mailer>,
        frontend_url: String,
        event_bus: broadcast::Sender<ActivityEvent>,
    ) -> Self {
        Self {
            store,
            mailer,
            frontend_url,
            event_bus,
        }
    }

    pub fn start_listener(self: Arc<Self>) {
        let mut rx = self.event_bus.subscribe();
        let service = self;

        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => service.handle_event(event).await,
                    Err(broadcast::error::RecvError::Lagged(count)) => {
                        warn!(count, "Notification listener lagged, events dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        error!("Notification listener event bus closed");
                        break;
                    }
                }
            }
        });
    }

    pub async fn handle_event(&self, event: ActivityEvent) {
        metrics::counter!("activity_events_total", "type" => event.event_type()).increment(1);

        if let Err(e) = self.record(&event).await {
            error!(error = %e, event_type = event.event_type(), "Failed to write activity log");
        }

        if let Some(email) = self.email_for(&event)
            && let Err(e) = self.mailer.send(&email).await
        {
            error!(error = %e, to = %email.to, event_type = event.event_type(), "Failed to send email");
        }
    }

    async fn record(&self, event: &ActivityEvent) -> anyhow::Result<()> {
        let details = serde_json::to_string(event)?;

        self.store
            .activity()
            .add(
                event.event_type(),
                event.actor_id(),
                event.workspace_id(),
                &event.message(),
                Some(details),
            )
            .await
    }

    fn email_for(&self, event: &ActivityEvent) -> Option<Email> {
        match event {
            ActivityEvent::InvitationSent {
                email,
                workspace_name,
                role,
                token,
                ..
            } => Some(invitation_email(
                email,
                workspace_name,
                *role,
                &self.frontend_url,
                token,
            )),
            ActivityEvent::TaskAssigned {
                task_id,
                task_title,
                assignee_email,
                ..
            } => Some(task_assigned_email(
                assignee_email,
                task_title,
                &self.frontend_url,
                *task_id,
            )),
            ActivityEvent::WorkspaceCreated { .. }
            | ActivityEvent::WorkspaceDeleted { .. }
            | ActivityEvent::InvitationAccepted { .. }
            | ActivityEvent::UserLoggedIn { .. } => None,
        }
    }
}
