//! Task domain model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Progress of a task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started
    Todo,

    /// Being worked on
    InProgress,

    /// Finished
    Done,
}

impl Default for TaskStatus {
    fn default() -> Self {
        Self::Todo
    }
}

/// A unit of work within a project.
///
/// The owner is whoever created the task; the assignee is whoever does it.
/// Access decisions compare against the owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier
    pub id: Uuid,

    /// Project the task belongs to
    pub project_id: Uuid,

    /// Team responsible (if any)
    pub team_id: Option<Uuid>,

    /// User doing the work
    pub assignee_id: Option<Uuid>,

    /// User who created the task
    pub owner_id: Uuid,

    /// Short name
    pub name: String,

    /// Details
    pub description: Option<String>,

    /// Progress
    pub status: TaskStatus,

    /// Priority, higher is more urgent
    pub priority: i32,

    /// Due date
    pub due_date: Option<DateTime<Utc>>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new task in the `Todo` state.
    pub fn new(project_id: Uuid, owner_id: Uuid, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            project_id,
            team_id: None,
            assignee_id: None,
            owner_id,
            name: name.into(),
            description: None,
            status: TaskStatus::Todo,
            priority: 0,
            due_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Assign the task to a team.
    pub fn with_team(mut self, team_id: Uuid) -> Self {
        self.team_id = Some(team_id);
        self
    }

    /// Assign the task to a user.
    pub fn with_assignee(mut self, assignee_id: Uuid) -> Self {
        self.assignee_id = Some(assignee_id);
        self
    }

    /// Bump `updated_at`.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
