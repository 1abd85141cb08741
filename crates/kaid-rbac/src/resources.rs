//! # Resource Types
//!
//! Every resource the hierarchy engine guards belongs to exactly one project
//! and has exactly one owner. [`OwnedResource`] exposes those two facts so
//! the engine can treat projects, teams, flags, tasks and comments uniformly.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use kaid_org::{Comment, Flag, Project, Task, Team};

/// Resource types guarded by the hierarchy engine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// A project (owned by its creator).
    Project,
    /// A team (owned by its leader).
    Team,
    /// A flag (owned by whoever raised it).
    Flag,
    /// A task (owned by whoever created it).
    Task,
    /// A comment (owned by its author).
    Comment,
}

impl ResourceKind {
    /// Get the string representation of the resource kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Project => "project",
            ResourceKind::Team => "team",
            ResourceKind::Flag => "flag",
            ResourceKind::Task => "task",
            ResourceKind::Comment => "comment",
        }
    }

    /// Human-readable name, capitalized.
    pub fn display_name(&self) -> &'static str {
        match self {
            ResourceKind::Project => "Project",
            ResourceKind::Team => "Team",
            ResourceKind::Flag => "Flag",
            ResourceKind::Task => "Task",
            ResourceKind::Comment => "Comment",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resource that belongs to one project and has one owner.
pub trait OwnedResource: Clone + Send + Sync + 'static {
    /// The kind of resource.
    const KIND: ResourceKind;

    /// Unique id of this resource.
    fn id(&self) -> Uuid;

    /// Project the resource belongs to.
    fn project_id(&self) -> Uuid;

    /// User the engine compares the caller against.
    fn owner_id(&self) -> Uuid;

    /// Record that the resource was just changed. Most resources keep no
    /// modification time.
    fn mark_updated(&mut self) {}
}

impl OwnedResource for Project {
    const KIND: ResourceKind = ResourceKind::Project;

    fn id(&self) -> Uuid {
        self.id
    }

    fn project_id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

impl OwnedResource for Team {
    const KIND: ResourceKind = ResourceKind::Team;

    fn id(&self) -> Uuid {
        self.id
    }

    fn project_id(&self) -> Uuid {
        self.project_id
    }

    fn owner_id(&self) -> Uuid {
        self.leader_id
    }
}

impl OwnedResource for Flag {
    const KIND: ResourceKind = ResourceKind::Flag;

    fn id(&self) -> Uuid {
        self.id
    }

    fn project_id(&self) -> Uuid {
        self.project_id
    }

    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

impl OwnedResource for Task {
    const KIND: ResourceKind = ResourceKind::Task;

    fn id(&self) -> Uuid {
        self.id
    }

    fn project_id(&self) -> Uuid {
        self.project_id
    }

    fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    fn mark_updated(&mut self) {
        self.touch();
    }
}

impl OwnedResource for Comment {
    const KIND: ResourceKind = ResourceKind::Comment;

    fn id(&self) -> Uuid {
        self.id
    }

    fn project_id(&self) -> Uuid {
        self.project_id
    }

    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}
