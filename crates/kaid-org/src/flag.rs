//! Flag domain model
//!
//! Flags are issues raised against a project, optionally scoped to a team.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a flag.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FlagStatus {
    /// Newly raised
    Open,

    /// Someone is working on it
    InProgress,

    /// Resolved
    Closed,
}

impl FlagStatus {
    /// Parse status from string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "open" => Some(Self::Open),
            "in_progress" | "in progress" => Some(Self::InProgress),
            "closed" | "resolved" => Some(Self::Closed),
            _ => None,
        }
    }

    /// Get string representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Closed => "closed",
        }
    }
}

impl Default for FlagStatus {
    fn default() -> Self {
        Self::Open
    }
}

/// An issue raised within a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flag {
    /// Unique identifier
    pub id: Uuid,

    /// Project the flag belongs to
    pub project_id: Uuid,

    /// Team the flag is raised against (if any)
    pub team_id: Option<Uuid>,

    /// User who raised the flag
    pub owner_id: Uuid,

    /// What is wrong
    pub description: String,

    /// Current status
    pub status: FlagStatus,

    /// Priority, higher is more urgent
    pub priority: i32,

    /// When the flag was raised
    pub created_at: DateTime<Utc>,
}

impl Flag {
    /// Creates a new open flag.
    pub fn new(project_id: Uuid, owner_id: Uuid, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            project_id,
            team_id: None,
            owner_id,
            description: description.into(),
            status: FlagStatus::Open,
            priority: 0,
            created_at: Utc::now(),
        }
    }

    /// Raise the flag against a team.
    pub fn with_team(mut self, team_id: Uuid) -> Self {
        self.team_id = Some(team_id);
        self
    }

    /// Set the priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_status_parse() {
        assert_eq!(FlagStatus::parse("open"), Some(FlagStatus::Open));
        assert_eq!(FlagStatus::parse("In Progress"), Some(FlagStatus::InProgress));
        assert_eq!(FlagStatus::parse("resolved"), Some(FlagStatus::Closed));
        assert_eq!(FlagStatus::parse("wontfix"), None);
    }

    #[test]
    fn test_new_flag_is_open() {
        let flag = Flag::new(Uuid::now_v7(), Uuid::now_v7(), "login broken").with_priority(3);
        assert_eq!(flag.status, FlagStatus::Open);
        assert_eq!(flag.priority, 3);
        assert!(flag.team_id.is_none());
    }
}
