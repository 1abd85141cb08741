//! # Kaid Organization Model
//!
//! This crate provides the project and membership data model for the Kaid
//! project-management backend.
//!
//! ## Overview
//!
//! The kaid-org crate handles:
//! - **Roles**: The fixed Admin / Manager / Member catalog and its ranking
//! - **Memberships**: User-project relationships with role, team, superior and invitation state
//! - **Users**: Internal users and their external identity linkage
//! - **Resources**: Projects, teams, flags, tasks and comments
//!
//! ## Architecture
//!
//! ```text
//! User
//!   └─ Membership ─→ Project
//!        ├─ Role (rank 1..3)      ├─ Team   (leader)
//!        ├─ Superior              ├─ Flag   (owner)
//!        └─ InvitationState       └─ Task   (owner)
//!                                      └─ Comment (owner)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use kaid_org::{Membership, Project, Role, RoleCatalog};
//! use uuid::Uuid;
//!
//! let catalog = RoleCatalog::standard();
//!
//! let creator = Uuid::now_v7();
//! let project = Project::new("Website relaunch", creator);
//! let admin = Membership::creator(project.id, creator);
//!
//! let invitee = Uuid::now_v7();
//! let invitation = Membership::invited(project.id, invitee, Role::Member);
//!
//! assert!(catalog.is_strictly_more_powerful(admin.role, invitation.role));
//! assert!(!invitation.grants_access());
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Serialization support (enabled by default)

pub mod comment;
pub mod flag;
pub mod membership;
pub mod project;
pub mod roles;
pub mod task;
pub mod team;
pub mod user;

// Re-export main types for convenience
pub use comment::Comment;
pub use flag::{Flag, FlagStatus};
pub use membership::{InvalidTransition, InvitationState, Membership, Superior, STATUS_LABEL_MAX_LEN};
pub use project::Project;
pub use roles::{Role, RoleCatalog, RoleEntry};
pub use task::{Task, TaskStatus};
pub use team::Team;
pub use user::{ExternalIdentity, User};
