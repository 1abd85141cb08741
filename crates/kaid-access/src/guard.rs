//! Access guard
//!
//! Fetches the memberships a decision needs and asks the hierarchy engine.
//! Feature services never compare roles themselves; they go through here.

use std::sync::Arc;

use tracing::{debug, instrument};
use uuid::Uuid;

use kaid_org::{Membership, Role};
use kaid_rbac::{AccessRequest, Decision, DenyReason, HierarchyEngine, MembershipIndex, OperationKind, OwnedResource};
use kaid_store::MembershipStore;

use crate::config::AccessConfig;
use crate::error::{AccessError, AccessResult};

/// Store-backed front end to the [`HierarchyEngine`].
#[derive(Clone)]
pub struct AccessGuard {
    engine: HierarchyEngine,
    memberships: Arc<dyn MembershipStore>,
}

impl std::fmt::Debug for AccessGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessGuard")
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}

impl AccessGuard {
    /// Create a guard over an engine and a membership store.
    pub fn new(engine: HierarchyEngine, memberships: Arc<dyn MembershipStore>) -> Self {
        Self { engine, memberships }
    }

    /// Create a guard with the engine described by `config`.
    pub fn from_config(config: &AccessConfig, memberships: Arc<dyn MembershipStore>) -> Self {
        Self::new(config.engine(), memberships)
    }

    /// The decision engine.
    pub fn engine(&self) -> &HierarchyEngine {
        &self.engine
    }

    /// The membership store decisions are read from.
    pub fn memberships(&self) -> &dyn MembershipStore {
        self.memberships.as_ref()
    }

    /// Decide whether `caller_id` may perform `operation` on a resource
    /// owned by `owner_id` in `project_id`.
    ///
    /// Self-access is decided without touching the store.
    #[instrument(skip(self))]
    pub async fn authorize(
        &self,
        caller_id: Uuid,
        project_id: Uuid,
        owner_id: Uuid,
        operation: OperationKind,
    ) -> AccessResult<Decision> {
        let request = AccessRequest::new(caller_id, owner_id, project_id, operation);
        if request.is_self_access() {
            return Ok(self.engine.decide(&request, None, None));
        }

        let caller_m = self
            .memberships
            .find_membership_by_project_and_user(project_id, caller_id)
            .await?;
        let owner_m = self
            .memberships
            .find_membership_by_project_and_user(project_id, owner_id)
            .await?;

        Ok(self.engine.decide(&request, caller_m.as_ref(), owner_m.as_ref()))
    }

    /// Decide access to an owned resource.
    pub async fn authorize_resource<R: OwnedResource>(
        &self,
        caller_id: Uuid,
        resource: &R,
        operation: OperationKind,
    ) -> AccessResult<Decision> {
        self.authorize(caller_id, resource.project_id(), resource.owner_id(), operation)
            .await
    }

    /// Like [`authorize`](Self::authorize), but a denial becomes
    /// [`AccessError::AccessDenied`] carrying the engine's reason.
    pub async fn require(
        &self,
        caller_id: Uuid,
        project_id: Uuid,
        owner_id: Uuid,
        operation: OperationKind,
    ) -> AccessResult<()> {
        match self.authorize(caller_id, project_id, owner_id, operation).await? {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => Err(AccessError::denied(reason)),
        }
    }

    /// Require access to an owned resource.
    pub async fn require_resource<R: OwnedResource>(
        &self,
        caller_id: Uuid,
        resource: &R,
        operation: OperationKind,
    ) -> AccessResult<()> {
        self.require(caller_id, resource.project_id(), resource.owner_id(), operation)
            .await
    }

    /// The caller's membership in a project, which must be active.
    ///
    /// A missing membership is denied with "membership not found" and a
    /// pending one with "membership not active".
    pub async fn require_active_member(&self, caller_id: Uuid, project_id: Uuid) -> AccessResult<Membership> {
        let membership = self
            .memberships
            .find_membership_by_project_and_user(project_id, caller_id)
            .await?
            .ok_or_else(|| AccessError::denied(DenyReason::MembershipNotFound))?;

        if !membership.grants_access() {
            return Err(AccessError::denied(DenyReason::MembershipInactive));
        }
        Ok(membership)
    }

    /// The caller's membership in a project, which must be an active Admin.
    pub async fn require_admin(&self, caller_id: Uuid, project_id: Uuid) -> AccessResult<Membership> {
        let membership = self.require_active_member(caller_id, project_id).await?;
        if membership.role != Role::Admin {
            return Err(AccessError::denied(DenyReason::AccessDenied));
        }
        Ok(membership)
    }

    /// Keep only the items `caller_id` may access.
    ///
    /// All memberships are read once; each item is then decided on its own.
    /// If the read fails the whole call fails and nothing is returned.
    #[instrument(skip(self, items), fields(kind = R::KIND.as_str()))]
    pub async fn filter_visible<R: OwnedResource>(
        &self,
        caller_id: Uuid,
        items: Vec<R>,
        operation: OperationKind,
    ) -> AccessResult<Vec<R>> {
        let total = items.len();
        let index: MembershipIndex = self.memberships.find_all_memberships().await?.into_iter().collect();
        let visible = self.engine.filter_accessible(caller_id, items, &index, operation);

        debug!(total, visible = visible.len(), "Filtered resources");
        Ok(visible)
    }
}
