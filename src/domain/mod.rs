//! Domain types shared by the persistence layer, the services and the API.
//!
//! The role and status enums double as `sea-orm` active enums so they are
//! stored as their lowercase string values.

pub mod events;
pub mod policy;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse, global role of a user.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[sea_orm(string_value = "admin")]
    Admin,

    #[sea_orm(string_value = "team_lead")]
    TeamLead,

    #[sea_orm(string_value = "member")]
    Member,
}

impl UserRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::TeamLead => "team_lead",
            Self::Member => "member",
        }
    }

    /// Team role granted when a user joins a team through an invitation
    /// carrying this role.
    #[must_use]
    pub const fn team_role(self) -> TeamRole {
        match self {
            Self::Admin | Self::TeamLead => TeamRole::Lead,
            Self::Member => TeamRole::Member,
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role of a user inside one team.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum TeamRole {
    #[sea_orm(string_value = "lead")]
    Lead,

    #[sea_orm(string_value = "member")]
    Member,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    #[sea_orm(string_value = "pending")]
    Pending,

    #[sea_orm(string_value = "accepted")]
    Accepted,
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    #[sea_orm(string_value = "planning")]
    Planning,

    #[sea_orm(string_value = "active")]
    Active,

    #[sea_orm(string_value = "on_hold")]
    OnHold,

    #[sea_orm(string_value = "completed")]
    Completed,
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    #[sea_orm(string_value = "todo")]
    Todo,

    #[sea_orm(string_value = "in_progress")]
    InProgress,

    #[sea_orm(string_value = "review")]
    Review,

    #[sea_orm(string_value = "done")]
    Done,
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    #[sea_orm(string_value = "low")]
    Low,

    #[default]
    #[sea_orm(string_value = "medium")]
    Medium,

    #[sea_orm(string_value = "high")]
    High,

    #[sea_orm(string_value = "urgent")]
    Urgent,
}

/// Who a task should be assigned to.
///
/// Replaces the loosely typed `"Me"` sentinel: clients send one of
/// `{"kind":"me"}`, `{"kind":"user","id":7}` or `{"kind":"unassigned"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Assignee {
    Me,
    User { id: i32 },
    Unassigned,
}

impl Assignee {
    /// Resolves the assignee to a concrete user id relative to the requester.
    #[must_use]
    pub const fn resolve(self, requester_id: i32) -> Option<i32> {
        match self {
            Self::Me => Some(requester_id),
            Self::User { id } => Some(id),
            Self::Unassigned => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assignee_wire_format() {
        let me: Assignee = serde_json::from_str(r#"{"kind":"me"}"#).unwrap();
        assert_eq!(me.resolve(9), Some(9));

        let user: Assignee = serde_json::from_str(r#"{"kind":"user","id":7}"#).unwrap();
        assert_eq!(user.resolve(9), Some(7));

        let none: Assignee = serde_json::from_str(r#"{"kind":"unassigned"}"#).unwrap();
        assert_eq!(none.resolve(9), None);

        assert!(serde_json::from_str::<Assignee>(r#""Me""#).is_err());
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(
            serde_json::to_string(&UserRole::TeamLead).unwrap(),
            r#""team_lead""#
        );
        assert_eq!(UserRole::TeamLead.team_role(), TeamRole::Lead);
        assert_eq!(UserRole::Member.team_role(), TeamRole::Member);
    }
}
