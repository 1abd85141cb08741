//! Comment domain model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A comment on a task.
///
/// The project id is copied from the task when the comment is posted, so a
/// comment can be checked against project memberships without loading its
/// task first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    /// Unique identifier
    pub id: Uuid,

    /// Project of the commented task
    pub project_id: Uuid,

    /// Commented task
    pub task_id: Uuid,

    /// Author
    pub owner_id: Uuid,

    /// Comment body
    pub text: String,

    /// When the comment was posted
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Creates a new comment.
    pub fn new(project_id: Uuid, task_id: Uuid, owner_id: Uuid, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            project_id,
            task_id,
            owner_id,
            text: text.into(),
            created_at: Utc::now(),
        }
    }
}
