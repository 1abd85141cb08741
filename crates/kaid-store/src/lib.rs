//! # Kaid Store
//!
//! Persistence contracts consumed by the Kaid access core, plus an
//! in-memory reference implementation.
//!
//! ## Overview
//!
//! The kaid-store crate handles:
//! - **Memberships**: Lookup by id, by (project, user), by user and state
//! - **Projects**: Atomic creation together with the creator's membership
//! - **Resources**: Teams, flags, tasks and comments inside a project
//! - **Identity**: Mapping an external sign-in identity to a user id
//!
//! ## Features
//!
//! - `memory` (default): In-memory store for tests and single-process apps
//!
//! ## Usage
//!
//! ```rust,no_run
//! use kaid_org::{Membership, Project};
//! use kaid_store::{MemoryStore, MembershipStore, ProjectStore};
//! use uuid::Uuid;
//!
//! async fn example() {
//!     let store = MemoryStore::new();
//!     let creator = Uuid::now_v7();
//!
//!     let project = Project::new("Launch", creator);
//!     let owner = Membership::creator(project.id, creator);
//!     store.create_project_with_owner(project.clone(), owner).await.unwrap();
//!
//!     let mine = store
//!         .find_membership_by_project_and_user(project.id, creator)
//!         .await
//!         .unwrap();
//!     assert!(mine.is_some());
//! }
//! ```

pub mod error;
pub mod store;

#[cfg(feature = "memory")]
pub mod memory;

// Re-export main types for convenience
pub use error::{StoreError, StoreResult};
pub use store::{IdentityResolver, MembershipStore, ProjectStore, ResourceStore, UserStore};

#[cfg(feature = "memory")]
pub use memory::MemoryStore;
