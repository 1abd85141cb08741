//! Project domain models
//!
//! A project is the scope every membership and resource belongs to. Its
//! creator owns it and receives an Admin membership in the same unit of work
//! that creates the project.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A project grouping teams, tasks and flags.
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use kaid_org::Project;
///
/// let owner = Uuid::now_v7();
/// let project = Project::new("Website relaunch", owner);
/// assert_eq!(project.owner_id, owner);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Unique identifier for the project
    pub id: Uuid,

    /// Human-readable name
    pub name: String,

    /// Project description
    pub description: Option<String>,

    /// User who created and owns the project
    pub owner_id: Uuid,

    /// When the project was created
    pub created_at: DateTime<Utc>,

    /// Optional due date
    pub due_date: Option<DateTime<Utc>>,
}

impl Project {
    /// Creates a new project owned by `owner_id`.
    pub fn new(name: impl Into<String>, owner_id: Uuid) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            description: None,
            owner_id,
            created_at: Utc::now(),
            due_date: None,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the due date.
    pub fn with_due_date(mut self, due: DateTime<Utc>) -> Self {
        self.due_date = Some(due);
        self
    }

    /// Whether the due date has passed.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.due_date.is_some_and(|due| due < now)
    }
}
