//! # Hierarchy Engine
//!
//! The single authoritative access decision for project-scoped resources.
//!
//! Given a caller, a resource owner, the resource's project and the two
//! users' memberships in that project, the engine decides:
//!
//! 1. The owner may always access their own resource.
//! 2. Otherwise both memberships must exist in the project.
//! 3. A pending caller membership grants nothing.
//! 4. Admins may access everything in their project.
//! 5. A caller whose role strictly outranks the owner's may access the resource.
//! 6. Peers and weaker callers are denied ([`EqualRankPolicy::AllowReads`]
//!    relaxes this for reads between peers).
//!
//! The engine performs no I/O; membership rows are fetched by the caller.

use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use kaid_org::{Membership, Role, RoleCatalog};

use crate::actions::OperationKind;
use crate::decision::{Decision, DenyReason, EqualRankPolicy};
use crate::resources::OwnedResource;

/// Who wants to do what to whose resource, in which project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessRequest {
    /// User asking for access
    pub caller_id: Uuid,

    /// Owner (or leader) of the resource
    pub owner_id: Uuid,

    /// Project the resource belongs to
    pub project_id: Uuid,

    /// Requested operation
    pub operation: OperationKind,
}

impl AccessRequest {
    /// Creates a new access request.
    pub fn new(caller_id: Uuid, owner_id: Uuid, project_id: Uuid, operation: OperationKind) -> Self {
        Self {
            caller_id,
            owner_id,
            project_id,
            operation,
        }
    }

    /// Build a request for an owned resource.
    pub fn for_resource<R: OwnedResource>(caller_id: Uuid, resource: &R, operation: OperationKind) -> Self {
        Self::new(caller_id, resource.owner_id(), resource.project_id(), operation)
    }

    /// Whether the caller owns the resource.
    pub fn is_self_access(&self) -> bool {
        self.caller_id == self.owner_id
    }
}

/// Memberships indexed by (project, user).
///
/// Used by bulk listing so one membership scan serves every item.
#[derive(Debug, Clone, Default)]
pub struct MembershipIndex {
    by_pair: HashMap<(Uuid, Uuid), Membership>,
}

impl MembershipIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a membership, replacing any previous row for the same pair.
    pub fn insert(&mut self, membership: Membership) {
        self.by_pair
            .insert((membership.project_id, membership.user_id), membership);
    }

    /// Membership of `user_id` in `project_id`.
    pub fn get(&self, project_id: Uuid, user_id: Uuid) -> Option<&Membership> {
        self.by_pair.get(&(project_id, user_id))
    }

    /// Number of indexed memberships.
    pub fn len(&self) -> usize {
        self.by_pair.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.by_pair.is_empty()
    }
}

impl FromIterator<Membership> for MembershipIndex {
    fn from_iter<I: IntoIterator<Item = Membership>>(iter: I) -> Self {
        let mut index = Self::new();
        for membership in iter {
            index.insert(membership);
        }
        index
    }
}

/// Project-scoped access decision engine.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use kaid_org::{Membership, Role, RoleCatalog};
/// use kaid_rbac::{AccessRequest, Decision, DenyReason, HierarchyEngine, OperationKind};
/// use uuid::Uuid;
///
/// let engine = HierarchyEngine::new(Arc::new(RoleCatalog::standard()));
/// let project = Uuid::now_v7();
/// let manager = Uuid::now_v7();
/// let member = Uuid::now_v7();
///
/// let mut manager_m = Membership::invited(project, manager, Role::Manager);
/// manager_m.accept().unwrap();
/// let mut member_m = Membership::invited(project, member, Role::Member);
/// member_m.accept().unwrap();
///
/// let down = AccessRequest::new(manager, member, project, OperationKind::Mutate);
/// assert_eq!(engine.decide(&down, Some(&manager_m), Some(&member_m)), Decision::Allow);
///
/// let up = AccessRequest::new(member, manager, project, OperationKind::Read);
/// assert_eq!(
///     engine.decide(&up, Some(&member_m), Some(&manager_m)),
///     Decision::Deny(DenyReason::AccessDenied)
/// );
/// ```
#[derive(Debug, Clone)]
pub struct HierarchyEngine {
    catalog: Arc<RoleCatalog>,
    equal_rank: EqualRankPolicy,
}

impl HierarchyEngine {
    /// Create an engine over a role catalog with the strict equal-rank policy.
    pub fn new(catalog: Arc<RoleCatalog>) -> Self {
        Self {
            catalog,
            equal_rank: EqualRankPolicy::Deny,
        }
    }

    /// Set how callers of equal rank are treated.
    pub fn with_equal_rank_policy(mut self, policy: EqualRankPolicy) -> Self {
        self.equal_rank = policy;
        self
    }

    /// The role catalog this engine compares with.
    pub fn catalog(&self) -> &RoleCatalog {
        &self.catalog
    }

    /// The active equal-rank policy.
    pub fn equal_rank_policy(&self) -> EqualRankPolicy {
        self.equal_rank
    }

    /// Decide a request given the caller's and owner's memberships.
    ///
    /// Memberships that belong to another project or another user than the
    /// request names are treated as missing.
    pub fn decide(
        &self,
        request: &AccessRequest,
        caller_membership: Option<&Membership>,
        owner_membership: Option<&Membership>,
    ) -> Decision {
        let decision = self.evaluate(request, caller_membership, owner_membership);

        tracing::debug!(
            caller_id = %request.caller_id,
            owner_id = %request.owner_id,
            project_id = %request.project_id,
            operation = %request.operation,
            allowed = decision.is_allowed(),
            reason = decision.reason().unwrap_or(""),
            "Access decision"
        );

        decision
    }

    /// Decide a request for an owned resource.
    pub fn decide_for<R: OwnedResource>(
        &self,
        caller_id: Uuid,
        resource: &R,
        operation: OperationKind,
        caller_membership: Option<&Membership>,
        owner_membership: Option<&Membership>,
    ) -> Decision {
        let request = AccessRequest::for_resource(caller_id, resource, operation);
        self.decide(&request, caller_membership, owner_membership)
    }

    /// Keep only the items the caller may access.
    ///
    /// Each item is decided on its own against the caller's and the item
    /// owner's memberships in the item's project.
    pub fn filter_accessible<R, I>(
        &self,
        caller_id: Uuid,
        items: I,
        index: &MembershipIndex,
        operation: OperationKind,
    ) -> Vec<R>
    where
        R: OwnedResource,
        I: IntoIterator<Item = R>,
    {
        items
            .into_iter()
            .filter(|item| {
                let request = AccessRequest::for_resource(caller_id, item, operation);
                let caller_m = index.get(request.project_id, caller_id);
                let owner_m = index.get(request.project_id, request.owner_id);
                self.decide(&request, caller_m, owner_m).is_allowed()
            })
            .collect()
    }

    fn evaluate(
        &self,
        request: &AccessRequest,
        caller_membership: Option<&Membership>,
        owner_membership: Option<&Membership>,
    ) -> Decision {
        if request.is_self_access() {
            return Decision::Allow;
        }

        let caller_m = caller_membership
            .filter(|m| m.project_id == request.project_id && m.user_id == request.caller_id);
        let owner_m = owner_membership
            .filter(|m| m.project_id == request.project_id && m.user_id == request.owner_id);

        let (caller_m, owner_m) = match (caller_m, owner_m) {
            (Some(c), Some(o)) => (c, o),
            (Some(_), None) => {
                tracing::warn!(
                    owner_id = %request.owner_id,
                    project_id = %request.project_id,
                    "Resource owner has no membership in the resource's project"
                );
                return Decision::Deny(DenyReason::MembershipNotFound);
            }
            _ => return Decision::Deny(DenyReason::MembershipNotFound),
        };

        if !caller_m.grants_access() {
            return Decision::Deny(DenyReason::MembershipInactive);
        }

        if caller_m.role == Role::Admin {
            return Decision::Allow;
        }

        if self
            .catalog
            .is_strictly_more_powerful(caller_m.role, owner_m.role)
        {
            return Decision::Allow;
        }

        let peers = self.catalog.rank_of(caller_m.role) == self.catalog.rank_of(owner_m.role);
        if peers
            && request.operation == OperationKind::Read
            && self.equal_rank == EqualRankPolicy::AllowReads
        {
            return Decision::Allow;
        }

        Decision::Deny(DenyReason::AccessDenied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kaid_org::Flag;

    fn engine() -> HierarchyEngine {
        HierarchyEngine::new(Arc::new(RoleCatalog::standard()))
    }

    fn active(project: Uuid, user: Uuid, role: Role) -> Membership {
        let mut m = Membership::invited(project, user, role);
        m.accept().unwrap();
        m
    }

    #[test]
    fn test_self_access_without_memberships() {
        let user = Uuid::now_v7();
        let request = AccessRequest::new(user, user, Uuid::now_v7(), OperationKind::Mutate);
        assert_eq!(engine().decide(&request, None, None), Decision::Allow);
    }

    #[test]
    fn test_self_access_with_pending_membership() {
        let project = Uuid::now_v7();
        let user = Uuid::now_v7();
        let pending = Membership::invited(project, user, Role::Member);
        let request = AccessRequest::new(user, user, project, OperationKind::Read);
        assert_eq!(engine().decide(&request, Some(&pending), Some(&pending)), Decision::Allow);
    }

    #[test]
    fn test_missing_memberships_deny() {
        let project = Uuid::now_v7();
        let (caller, owner) = (Uuid::now_v7(), Uuid::now_v7());
        let admin = active(project, caller, Role::Admin);
        let request = AccessRequest::new(caller, owner, project, OperationKind::Read);

        let not_found = Decision::Deny(DenyReason::MembershipNotFound);
        assert_eq!(engine().decide(&request, None, None), not_found);
        assert_eq!(engine().decide(&request, Some(&admin), None), not_found);

        let owner_m = active(project, owner, Role::Member);
        assert_eq!(engine().decide(&request, None, Some(&owner_m)), not_found);
    }

    #[test]
    fn test_membership_from_other_project_is_missing() {
        let project = Uuid::now_v7();
        let (caller, owner) = (Uuid::now_v7(), Uuid::now_v7());
        let foreign_admin = active(Uuid::now_v7(), caller, Role::Admin);
        let owner_m = active(project, owner, Role::Member);
        let request = AccessRequest::new(caller, owner, project, OperationKind::Read);

        assert_eq!(
            engine().decide(&request, Some(&foreign_admin), Some(&owner_m)),
            Decision::Deny(DenyReason::MembershipNotFound)
        );
    }

    #[test]
    fn test_membership_of_wrong_user_is_missing() {
        let project = Uuid::now_v7();
        let (caller, owner) = (Uuid::now_v7(), Uuid::now_v7());
        let owner_m = active(project, owner, Role::Member);
        let request = AccessRequest::new(caller, owner, project, OperationKind::Read);

        // Passing the owner's row as the caller's must not help.
        assert_eq!(
            engine().decide(&request, Some(&owner_m), Some(&owner_m)),
            Decision::Deny(DenyReason::MembershipNotFound)
        );
    }

    #[test]
    fn test_pending_caller_denied() {
        let project = Uuid::now_v7();
        let (caller, owner) = (Uuid::now_v7(), Uuid::now_v7());
        let pending_admin = Membership::invited(project, caller, Role::Admin);
        let owner_m = active(project, owner, Role::Member);
        let request = AccessRequest::new(caller, owner, project, OperationKind::Read);

        assert_eq!(
            engine().decide(&request, Some(&pending_admin), Some(&owner_m)),
            Decision::Deny(DenyReason::MembershipInactive)
        );
    }

    #[test]
    fn test_admin_universality() {
        let project = Uuid::now_v7();
        let caller = Uuid::now_v7();
        let admin = active(project, caller, Role::Admin);

        for role in Role::all() {
            let owner = Uuid::now_v7();
            let owner_m = active(project, owner, role);
            for op in [OperationKind::Read, OperationKind::Mutate] {
                let request = AccessRequest::new(caller, owner, project, op);
                assert_eq!(engine().decide(&request, Some(&admin), Some(&owner_m)), Decision::Allow);
            }
        }
    }

    #[test]
    fn test_rank_monotonicity() {
        let project = Uuid::now_v7();
        for caller_role in [Role::Manager, Role::Member] {
            for owner_role in Role::all() {
                let (caller, owner) = (Uuid::now_v7(), Uuid::now_v7());
                let caller_m = active(project, caller, caller_role);
                let owner_m = active(project, owner, owner_role);

                for op in [OperationKind::Read, OperationKind::Mutate] {
                    let request = AccessRequest::new(caller, owner, project, op);
                    let decision = engine().decide(&request, Some(&caller_m), Some(&owner_m));
                    if caller_role.rank() < owner_role.rank() {
                        assert_eq!(decision, Decision::Allow);
                    } else {
                        assert_eq!(decision, Decision::Deny(DenyReason::AccessDenied));
                    }
                }
            }
        }
    }

    #[test]
    fn test_allow_reads_policy_only_relaxes_peer_reads() {
        let engine = engine().with_equal_rank_policy(EqualRankPolicy::AllowReads);
        let project = Uuid::now_v7();
        let (a, b) = (Uuid::now_v7(), Uuid::now_v7());
        let a_m = active(project, a, Role::Member);
        let b_m = active(project, b, Role::Member);

        let read = AccessRequest::new(a, b, project, OperationKind::Read);
        assert_eq!(engine.decide(&read, Some(&a_m), Some(&b_m)), Decision::Allow);

        let mutate = AccessRequest::new(a, b, project, OperationKind::Mutate);
        assert_eq!(
            engine.decide(&mutate, Some(&a_m), Some(&b_m)),
            Decision::Deny(DenyReason::AccessDenied)
        );

        let manager = Uuid::now_v7();
        let manager_m = active(project, manager, Role::Manager);
        let upward = AccessRequest::new(a, manager, project, OperationKind::Read);
        assert_eq!(
            engine.decide(&upward, Some(&a_m), Some(&manager_m)),
            Decision::Deny(DenyReason::AccessDenied)
        );
    }

    #[test]
    fn test_filter_accessible() {
        let project = Uuid::now_v7();
        let manager = Uuid::now_v7();
        let member = Uuid::now_v7();
        let other_manager = Uuid::now_v7();
        let stranger = Uuid::now_v7();

        let index: MembershipIndex = vec![
            active(project, manager, Role::Manager),
            active(project, member, Role::Member),
            active(project, other_manager, Role::Manager),
        ]
        .into_iter()
        .collect();
        assert_eq!(index.len(), 3);

        let own = Flag::new(project, manager, "mine");
        let members = Flag::new(project, member, "member's");
        let peers = Flag::new(project, other_manager, "peer's");
        let orphan = Flag::new(project, stranger, "no membership");

        let visible = engine().filter_accessible(
            manager,
            vec![own.clone(), members.clone(), peers, orphan],
            &index,
            OperationKind::Read,
        );

        assert_eq!(visible, vec![own, members]);
    }
}
