//! # Kaid Access
//!
//! Access-checked services for the Kaid project-management backend. Every
//! read or write of a project, team, flag, task, comment or membership goes
//! through an [`AccessGuard`], which fetches the memberships involved and
//! asks the hierarchy engine from `kaid-rbac`.
//!
//! ## Overview
//!
//! The kaid-access crate handles:
//! - **Guard**: Store-backed decisions, denials as [`AccessError::AccessDenied`]
//! - **Memberships**: Invite, accept, deny, remove, update, reporting chains
//! - **Projects**: Atomic creation with the creator's Admin membership
//! - **Resources**: Teams, flags and tasks through one generic service
//! - **Comments**: Posting on tasks the caller can read
//! - **Identity**: External sign-in identity to internal user id
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use kaid_access::{AccessConfig, AccessServices, NewMembership, NewProject};
//! use kaid_org::{Flag, Role};
//! use kaid_store::MemoryStore;
//! use uuid::Uuid;
//!
//! async fn example() {
//!     let services = AccessServices::new(Arc::new(MemoryStore::new()), AccessConfig::from_env()).unwrap();
//!
//!     let creator = Uuid::now_v7();
//!     let (project, _) = services.projects.create(creator, NewProject::named("Launch")).await.unwrap();
//!
//!     let dev = Uuid::now_v7();
//!     let invite = services
//!         .memberships
//!         .invite(creator, NewMembership::new(project.id, dev, Role::Member))
//!         .await
//!         .unwrap();
//!     services.memberships.accept(dev, invite.id).await.unwrap();
//!
//!     let flag = services
//!         .flags
//!         .create(dev, Flag::new(project.id, dev, "Login page 500s"))
//!         .await
//!         .unwrap();
//!
//!     // The project creator is an Admin and may change anything in the project.
//!     services.flags.update(creator, flag.id, |f| f.priority = 1).await.unwrap();
//! }
//! ```

pub mod comment;
pub mod config;
pub mod error;
pub mod guard;
pub mod identity;
pub mod membership;
pub mod project;
pub mod resource;
pub mod services;

// Re-export main types for convenience
pub use comment::CommentService;
pub use config::{AccessConfig, ConfigError};
pub use error::{AccessError, AccessResult};
pub use guard::AccessGuard;
pub use identity::IdentityService;
pub use membership::{MembershipService, MembershipUpdate, NewMembership};
pub use project::{NewProject, ProjectService};
pub use resource::{FlagService, ResourceService, TaskService, TeamService};
pub use services::AccessServices;
