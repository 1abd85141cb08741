//! Persistence contracts
//!
//! The access core does not implement storage. It consumes these traits,
//! which a relational backend (or the in-memory reference store) provides.
//! Every mutating call is atomic from the caller's point of view.

use async_trait::async_trait;
use uuid::Uuid;

use kaid_org::{ExternalIdentity, Membership, Project, User};
use kaid_rbac::OwnedResource;

use crate::error::StoreResult;

/// Membership persistence.
///
/// At most one membership exists per (project, user) pair; creating a
/// second one fails with [`StoreError::Duplicate`](crate::StoreError::Duplicate).
#[async_trait]
pub trait MembershipStore: Send + Sync {
    /// Insert a new membership.
    async fn create_membership(&self, membership: Membership) -> StoreResult<Membership>;

    /// Look up a membership by id.
    async fn find_membership(&self, membership_id: Uuid) -> StoreResult<Option<Membership>>;

    /// Look up the membership of `user_id` in `project_id`.
    async fn find_membership_by_project_and_user(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<Option<Membership>>;

    /// All memberships of a user, active and pending.
    async fn find_memberships_by_user(&self, user_id: Uuid) -> StoreResult<Vec<Membership>>;

    /// Active memberships of a user.
    async fn find_active_memberships_by_user(&self, user_id: Uuid) -> StoreResult<Vec<Membership>>;

    /// Pending memberships (open invitations) of a user.
    async fn find_pending_memberships_by_user(&self, user_id: Uuid) -> StoreResult<Vec<Membership>>;

    /// Every membership.
    async fn find_all_memberships(&self) -> StoreResult<Vec<Membership>>;

    /// Memberships of one project.
    async fn find_memberships_by_project(&self, project_id: Uuid) -> StoreResult<Vec<Membership>> {
        Ok(self
            .find_all_memberships()
            .await?
            .into_iter()
            .filter(|m| m.project_id == project_id)
            .collect())
    }

    /// Replace the stored values of a membership.
    async fn update_membership(&self, membership_id: Uuid, membership: Membership) -> StoreResult<Membership>;

    /// Delete a membership.
    async fn delete_membership(&self, membership_id: Uuid) -> StoreResult<()>;
}

/// Project persistence.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Insert a project together with its creator's membership in one unit of work.
    ///
    /// Either both rows are written or neither is.
    async fn create_project_with_owner(&self, project: Project, owner: Membership) -> StoreResult<(Project, Membership)>;

    /// Look up a project by id.
    async fn find_project(&self, project_id: Uuid) -> StoreResult<Option<Project>>;

    /// Every project.
    async fn find_all_projects(&self) -> StoreResult<Vec<Project>>;

    /// Replace the stored values of a project.
    async fn update_project(&self, project: Project) -> StoreResult<Project>;

    /// Delete a project and everything it owns.
    async fn delete_project(&self, project_id: Uuid) -> StoreResult<()>;
}

/// Persistence for resources that live inside a project.
#[async_trait]
pub trait ResourceStore<R: OwnedResource>: Send + Sync {
    /// Insert a new resource.
    async fn create(&self, resource: R) -> StoreResult<R>;

    /// Look up a resource by id.
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<R>>;

    /// All resources in a project.
    async fn find_by_project(&self, project_id: Uuid) -> StoreResult<Vec<R>>;

    /// Replace the stored values of a resource.
    async fn update(&self, resource: R) -> StoreResult<R>;

    /// Delete a resource.
    async fn delete(&self, id: Uuid) -> StoreResult<()>;
}

/// Maps an authenticated external identity to an internal user id.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Resolve the caller, `None` if the identity never signed in.
    async fn resolve(&self, identity: &ExternalIdentity) -> StoreResult<Option<Uuid>>;
}

/// User persistence.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Register a user on first sign-in.
    ///
    /// If a user with the same external identity exists, that user is
    /// returned unchanged.
    async fn register_user(&self, user: User) -> StoreResult<User>;

    /// Look up a user by id.
    async fn find_user(&self, user_id: Uuid) -> StoreResult<Option<User>>;
}
