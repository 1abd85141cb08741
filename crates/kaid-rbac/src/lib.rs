//! # Kaid RBAC (Membership Hierarchy Engine)
//!
//! This crate provides the one authoritative access decision for resources
//! inside a Kaid project. Project, team, flag, task, comment and membership
//! services all ask the same engine rather than comparing roles themselves.
//!
//! ## Overview
//!
//! The kaid-rbac crate handles:
//! - **Operations**: Read vs. mutate
//! - **Resources**: Anything with a project and an owner ([`OwnedResource`])
//! - **Decisions**: `Allow` or `Deny(reason)`, never an error
//! - **Bulk filtering**: Per-item decisions over a [`MembershipIndex`]
//!
//! ## Decision order
//!
//! ```text
//! caller == owner            → Allow
//! missing membership         → Deny("membership not found")
//! caller pending             → Deny("membership not active")
//! caller is Admin            → Allow
//! rank(caller) < rank(owner) → Allow
//! otherwise                  → Deny("access denied")
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use kaid_org::{Flag, Membership, RoleCatalog};
//! use kaid_rbac::{HierarchyEngine, OperationKind};
//! use uuid::Uuid;
//!
//! let engine = HierarchyEngine::new(Arc::new(RoleCatalog::standard()));
//!
//! let creator = Uuid::now_v7();
//! let project = Uuid::now_v7();
//! let admin = Membership::creator(project, creator);
//!
//! let reporter = Uuid::now_v7();
//! let flag = Flag::new(project, reporter, "Build is red");
//! let reporter_m = Membership::creator(project, reporter);
//!
//! let decision = engine.decide_for(creator, &flag, OperationKind::Mutate, Some(&admin), Some(&reporter_m));
//! assert!(decision.is_allowed());
//! ```

pub mod actions;
pub mod decision;
pub mod engine;
pub mod resources;

// Re-export main types for convenience
pub use actions::OperationKind;
pub use decision::{Decision, DenyReason, EqualRankPolicy};
pub use engine::{AccessRequest, HierarchyEngine, MembershipIndex};
pub use resources::{OwnedResource, ResourceKind};
