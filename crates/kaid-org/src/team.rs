//! Team domain model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A team within a project, led by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    /// Unique identifier
    pub id: Uuid,

    /// Project the team belongs to
    pub project_id: Uuid,

    /// Team name
    pub name: String,

    /// Team description
    pub description: Option<String>,

    /// Team leader (treated as the team's owner)
    pub leader_id: Uuid,
}

impl Team {
    /// Creates a new team.
    pub fn new(project_id: Uuid, name: impl Into<String>, leader_id: Uuid) -> Self {
        Self {
            id: Uuid::now_v7(),
            project_id,
            name: name.into(),
            description: None,
            leader_id,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
