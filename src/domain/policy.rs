//! Resource permission policy.
//!
//! Every workspace, project and task handler asks this module for a decision
//! before touching the database. The rule is:
//!
//! - admins and the creator of the resource may do anything;
//! - members of the resource's workspace may read and contribute;
//! - everyone else is denied.

use super::UserRole;

/// The authenticated caller, reduced to what the policy needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requester {
    pub id: i32,
    pub role: UserRole,
}

impl Requester {
    #[must_use]
    pub const fn new(id: i32, role: UserRole) -> Self {
        Self { id, role }
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin)
    }
}

/// What the policy needs to know about the target resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDescriptor {
    pub workspace_id: i32,

    /// Users that count as creators. A task lists both its own creator and
    /// the creator of its project.
    pub creators: Vec<i32>,

    /// Whether the requester has a team membership in `workspace_id`.
    pub requester_is_member: bool,
}

impl ResourceDescriptor {
    #[must_use]
    pub fn new(workspace_id: i32, created_by: i32, requester_is_member: bool) -> Self {
        Self {
            workspace_id,
            creators: vec![created_by],
            requester_is_member,
        }
    }

    #[must_use]
    pub fn with_creator(mut self, created_by: i32) -> Self {
        if !self.creators.contains(&created_by) {
            self.creators.push(created_by);
        }
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,

    /// Status/progress changes and everyday task work.
    Contribute,

    /// Renaming, redescribing, managing teams and invitations.
    Administer,

    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }
}

#[must_use]
pub fn evaluate(requester: &Requester, resource: &ResourceDescriptor, action: Action) -> Decision {
    if requester.is_admin() || resource.creators.contains(&requester.id) {
        return Decision::Allow;
    }

    match action {
        Action::Read | Action::Contribute if resource.requester_is_member => Decision::Allow,
        _ => Decision::Deny,
    }
}
