//! Domain events.
//!
//! Services publish these on the event bus after a state change has been
//! committed. The notification listener turns them into activity-log rows and
//! emails; nothing that consumes them can affect the operation that produced
//! them.

use serde::Serialize;

use super::UserRole;

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum ActivityEvent {
    WorkspaceCreated {
        workspace_id: i32,
        name: String,
        actor_id: i32,
    },
    WorkspaceDeleted {
        workspace_id: i32,
        name: String,
        actor_id: i32,
    },
    InvitationSent {
        invitation_id: i32,
        workspace_id: i32,
        workspace_name: String,
        email: String,
        role: UserRole,
        #[serde(skip_serializing)]
        token: String,
        actor_id: i32,
    },
    InvitationAccepted {
        invitation_id: i32,
        workspace_id: i32,
        user_id: i32,
    },
    TaskAssigned {
        task_id: i32,
        task_title: String,
        workspace_id: i32,
        assignee_id: i32,
        assignee_email: String,
        actor_id: i32,
    },
    UserLoggedIn {
        user_id: i32,
    },
}

impl ActivityEvent {
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::WorkspaceCreated { .. } => "WorkspaceCreated",
            Self::WorkspaceDeleted { .. } => "WorkspaceDeleted",
            Self::InvitationSent { .. } => "InvitationSent",
            Self::InvitationAccepted { .. } => "InvitationAccepted",
            Self::TaskAssigned { .. } => "TaskAssigned",
            Self::UserLoggedIn { .. } => "UserLoggedIn",
        }
    }

    #[must_use]
    pub const fn actor_id(&self) -> Option<i32> {
        match self {
            Self::WorkspaceCreated { actor_id, .. }
            | Self::WorkspaceDeleted { actor_id, .. }
            | Self::InvitationSent { actor_id, .. }
            | Self::TaskAssigned { actor_id, .. } => Some(*actor_id),
            Self::InvitationAccepted { user_id, .. } | Self::UserLoggedIn { user_id } => {
                Some(*user_id)
            }
        }
    }

    /// Workspace the event belongs to. A deleted workspace has no rows left to
    /// attach the event to, so it is logged globally.
    #[must_use]
    pub const fn workspace_id(&self) -> Option<i32> {
        match self {
            Self::WorkspaceCreated { workspace_id, .. }
            | Self::InvitationSent { workspace_id, .. }
            | Self::InvitationAccepted { workspace_id, .. }
            | Self::TaskAssigned { workspace_id, .. } => Some(*workspace_id),
            Self::WorkspaceDeleted { .. } | Self::UserLoggedIn { .. } => None,
        }
    }

    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::WorkspaceCreated { name, .. } => format!("Workspace \"{name}\" created"),
            Self::WorkspaceDeleted { name, .. } => format!("Workspace \"{name}\" deleted"),
            Self::InvitationSent { email, role, .. } => {
                format!("Invited {email} as {role}")
            }
            Self::InvitationAccepted { user_id, .. } => {
                format!("User {user_id} joined the workspace")
            }
            Self::TaskAssigned {
                task_title,
                assignee_email,
                ..
            } => format!("Task \"{task_title}\" assigned to {assignee_email}"),
            Self::UserLoggedIn { user_id } => format!("User {user_id} logged in"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deleted_workspace_is_logged_globally() {
        let event = ActivityEvent::WorkspaceDeleted {
            workspace_id: 4,
            name: "Ops".to_string(),
            actor_id: 2,
        };

        assert_eq!(event.workspace_id(), None);
        assert_eq!(event.actor_id(), Some(2));
        assert_eq!(event.event_type(), "WorkspaceDeleted");
    }

    #[test]
    fn test_event_json_shape() {
        let event = ActivityEvent::UserLoggedIn { user_id: 5 };
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "UserLoggedIn");
        assert_eq!(json["payload"]["user_id"], 5);
    }
}
