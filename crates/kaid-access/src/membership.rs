//! Membership management
//!
//! Invitations, their acceptance or refusal, removal, role and team
//! reassignment, and the read views over a user's memberships.
//!
//! ```text
//!            invite            accept
//!   (none) ─────────→ Pending ────────→ Active
//!                        │                │
//!                  deny  │                │ remove
//!                        ↓                ↓
//!                     (row deleted = Removed)
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use kaid_org::{Membership, Role, Superior};
use kaid_rbac::DenyReason;
use kaid_store::{MembershipStore, ProjectStore};

use crate::config::AccessConfig;
use crate::error::{AccessError, AccessResult};
use crate::guard::AccessGuard;

/// An invitation to create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMembership {
    /// Project to invite into
    pub project_id: Uuid,

    /// User being invited
    pub user_id: Uuid,

    /// Role the user will hold once they accept
    pub role: Role,

    /// Team within the project
    #[serde(default)]
    pub team_id: Option<Uuid>,

    /// Superior's user id; `None` makes the member the top of their own chain
    #[serde(default)]
    pub superior: Option<Uuid>,

    /// Status label; the configured pending label when absent
    #[serde(default)]
    pub status: Option<String>,
}

impl NewMembership {
    /// Invite `user_id` into `project_id` with `role`.
    pub fn new(project_id: Uuid, user_id: Uuid, role: Role) -> Self {
        Self {
            project_id,
            user_id,
            role,
            team_id: None,
            superior: None,
            status: None,
        }
    }

    /// Place the invitee in a team.
    pub fn with_team(mut self, team_id: Uuid) -> Self {
        self.team_id = Some(team_id);
        self
    }

    /// Have the invitee report to `superior`.
    pub fn with_superior(mut self, superior: Uuid) -> Self {
        self.superior = Some(superior);
        self
    }
}

/// Changes to an active membership. `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipUpdate {
    /// New role
    pub role: Option<Role>,

    /// New team; `Some(None)` takes the member out of their team
    pub team_id: Option<Option<Uuid>>,

    /// New superior
    pub superior: Option<Superior>,

    /// New status label
    pub status: Option<String>,
}

/// Membership lifecycle and queries.
///
/// The project owner's membership can be neither removed nor demoted, so
/// the owner always stays an Admin of their project.
#[derive(Clone)]
pub struct MembershipService {
    guard: AccessGuard,
    projects: Arc<dyn ProjectStore>,
    config: AccessConfig,
}

impl MembershipService {
    /// Create a membership service.
    pub fn new(guard: AccessGuard, projects: Arc<dyn ProjectStore>, config: AccessConfig) -> Self {
        Self {
            guard,
            projects,
            config,
        }
    }

    fn store(&self) -> &dyn MembershipStore {
        self.guard.memberships()
    }

    async fn load(&self, membership_id: Uuid) -> AccessResult<Membership> {
        self.store()
            .find_membership(membership_id)
            .await?
            .ok_or_else(|| AccessError::NotFound(format!("membership {}", membership_id)))
    }

    fn check_status(&self, membership: &Membership) -> AccessResult<()> {
        if !membership.status_fits(self.config.status_label_max_len) {
            return Err(AccessError::InvalidInput(format!(
                "status label longer than {} characters",
                self.config.status_label_max_len
            )));
        }
        Ok(())
    }

    /// Whether `membership` belongs to the owner of its project.
    async fn is_project_owner(&self, membership: &Membership) -> AccessResult<bool> {
        Ok(self
            .projects
            .find_project(membership.project_id)
            .await?
            .is_some_and(|p| p.owner_id == membership.user_id))
    }

    /// Resolve a requested superior for `member`, who must belong to the project.
    async fn resolve_superior(&self, project_id: Uuid, member: Uuid, superior: Superior) -> AccessResult<Superior> {
        let superior = match superior {
            Superior::User(id) => Superior::resolve(Some(id), member),
            other => other,
        };

        if let Superior::User(id) = superior {
            if self
                .store()
                .find_membership_by_project_and_user(project_id, id)
                .await?
                .is_none()
            {
                return Err(AccessError::InvalidInput(format!(
                    "superior {} is not a member of project {}",
                    id, project_id
                )));
            }
        }
        Ok(superior)
    }

    /// Invite a user into a project.
    ///
    /// The caller must be an active member at least as powerful as the
    /// role being handed out. The new membership is pending.
    #[instrument(skip(self, invitation), fields(project_id = %invitation.project_id, user_id = %invitation.user_id))]
    pub async fn invite(&self, caller_id: Uuid, invitation: NewMembership) -> AccessResult<Membership> {
        let caller_m = self
            .guard
            .require_active_member(caller_id, invitation.project_id)
            .await?;

        if !self
            .guard
            .engine()
            .catalog()
            .is_at_least_as_powerful_as(caller_m.role, invitation.role)
        {
            return Err(AccessError::denied(DenyReason::AccessDenied));
        }

        let status = invitation
            .status
            .unwrap_or_else(|| self.config.pending_status_label.clone());

        let superior = self
            .resolve_superior(
                invitation.project_id,
                invitation.user_id,
                Superior::resolve(invitation.superior, invitation.user_id),
            )
            .await?;

        let mut membership = Membership::invited(invitation.project_id, invitation.user_id, invitation.role)
            .with_superior(superior)
            .with_status(status);
        membership.team_id = invitation.team_id;
        self.check_status(&membership)?;

        let created = self.store().create_membership(membership).await?;
        info!(
            membership_id = %created.id,
            role = created.role.as_str(),
            invited_by = %caller_id,
            "Membership invitation created"
        );
        Ok(created)
    }

    /// Accept an invitation. Only the invited user may accept.
    #[instrument(skip(self))]
    pub async fn accept(&self, caller_id: Uuid, membership_id: Uuid) -> AccessResult<Membership> {
        let mut membership = self.load(membership_id).await?;
        if membership.user_id != caller_id {
            return Err(AccessError::denied(DenyReason::AccessDenied));
        }

        membership.accept()?;
        membership.status = self.config.active_status_label.clone();

        let updated = self.store().update_membership(membership_id, membership).await?;
        info!(project_id = %updated.project_id, "Membership invitation accepted");
        Ok(updated)
    }

    /// Decline an invitation. Only the invited user may decline; the row is deleted.
    #[instrument(skip(self))]
    pub async fn deny(&self, caller_id: Uuid, membership_id: Uuid) -> AccessResult<()> {
        let membership = self.load(membership_id).await?;
        if membership.user_id != caller_id {
            return Err(AccessError::denied(DenyReason::AccessDenied));
        }

        membership.state.decline()?;
        self.store().delete_membership(membership_id).await?;
        info!(project_id = %membership.project_id, "Membership invitation declined");
        Ok(())
    }

    /// Remove a membership. Allowed for the member themself or an active
    /// Admin of the membership's project, except for the project owner's.
    #[instrument(skip(self))]
    pub async fn remove(&self, caller_id: Uuid, membership_id: Uuid) -> AccessResult<()> {
        let membership = self.load(membership_id).await?;
        if membership.user_id != caller_id {
            self.guard.require_admin(caller_id, membership.project_id).await?;
        }
        if self.is_project_owner(&membership).await? {
            return Err(AccessError::InvalidState(
                "cannot remove the project owner's membership".to_string(),
            ));
        }

        self.store().delete_membership(membership_id).await?;
        info!(
            project_id = %membership.project_id,
            user_id = %membership.user_id,
            removed_by = %caller_id,
            "Membership removed"
        );
        Ok(())
    }

    /// Change role, team, superior or status of an active membership.
    ///
    /// Only an active Admin of the project may do this. The project owner
    /// cannot be given a role other than Admin.
    #[instrument(skip(self, changes))]
    pub async fn update(
        &self,
        caller_id: Uuid,
        membership_id: Uuid,
        changes: MembershipUpdate,
    ) -> AccessResult<Membership> {
        let mut membership = self.load(membership_id).await?;
        self.guard.require_admin(caller_id, membership.project_id).await?;

        if !membership.grants_access() {
            return Err(AccessError::InvalidState(
                "cannot update a membership that is pending".to_string(),
            ));
        }

        if let Some(role) = changes.role {
            if role != Role::Admin && self.is_project_owner(&membership).await? {
                return Err(AccessError::InvalidState(
                    "cannot demote the project owner".to_string(),
                ));
            }
            membership.role = role;
        }
        if let Some(status) = changes.status {
            membership.status = status;
            self.check_status(&membership)?;
        }
        if let Some(team_id) = changes.team_id {
            membership.team_id = team_id;
        }
        if let Some(superior) = changes.superior {
            membership.superior = self
                .resolve_superior(membership.project_id, membership.user_id, superior)
                .await?;
        }

        let updated = self.store().update_membership(membership_id, membership).await?;
        info!(
            project_id = %updated.project_id,
            user_id = %updated.user_id,
            role = updated.role.as_str(),
            "Membership updated"
        );
        Ok(updated)
    }

    /// The caller's open invitations.
    pub async fn my_invitations(&self, caller_id: Uuid) -> AccessResult<Vec<Membership>> {
        Ok(self.store().find_pending_memberships_by_user(caller_id).await?)
    }

    /// The caller's active memberships.
    pub async fn my_memberships(&self, caller_id: Uuid) -> AccessResult<Vec<Membership>> {
        Ok(self.store().find_active_memberships_by_user(caller_id).await?)
    }

    /// The caller's role in a project, `None` unless the membership is active.
    pub async fn role_in_project(&self, caller_id: Uuid, project_id: Uuid) -> AccessResult<Option<Role>> {
        Ok(self
            .store()
            .find_membership_by_project_and_user(project_id, caller_id)
            .await?
            .filter(Membership::grants_access)
            .map(|m| m.role))
    }

    /// Members of a project, optionally narrowed to one team.
    ///
    /// The caller must be an active member of the project.
    #[instrument(skip(self))]
    pub async fn members(
        &self,
        caller_id: Uuid,
        project_id: Uuid,
        team_id: Option<Uuid>,
    ) -> AccessResult<Vec<Membership>> {
        self.guard.require_active_member(caller_id, project_id).await?;

        let members = self.store().find_memberships_by_project(project_id).await?;
        Ok(match team_id {
            Some(team) => members.into_iter().filter(|m| m.team_id == Some(team)).collect(),
            None => members,
        })
    }

    /// Walk the superior links from `user_id` upward within one project.
    ///
    /// The first entry is `user_id`'s own membership. The walk stops at the
    /// top of a chain, an unassigned superior, a superior without a
    /// membership in the project, or a cycle.
    #[instrument(skip(self))]
    pub async fn reporting_chain(
        &self,
        caller_id: Uuid,
        project_id: Uuid,
        user_id: Uuid,
    ) -> AccessResult<Vec<Membership>> {
        self.guard.require_active_member(caller_id, project_id).await?;

        let mut by_user: HashMap<Uuid, Membership> = self
            .store()
            .find_memberships_by_project(project_id)
            .await?
            .into_iter()
            .map(|m| (m.user_id, m))
            .collect();

        let mut current = by_user
            .remove(&user_id)
            .ok_or_else(|| AccessError::NotFound(format!("membership of user {} in project {}", user_id, project_id)))?;

        let mut seen = HashSet::from([user_id]);
        let mut chain = Vec::new();

        loop {
            let next = match current.superior {
                Superior::User(id) => id,
                Superior::OwnChain | Superior::Unassigned => {
                    chain.push(current);
                    break;
                }
            };
            chain.push(current);

            if !seen.insert(next) {
                warn!(project_id = %project_id, user_id = %next, "Reporting chain contains a cycle");
                break;
            }
            match by_user.remove(&next) {
                Some(m) => current = m,
                None => {
                    warn!(project_id = %project_id, superior_id = %next, "Superior has no membership in project");
                    break;
                }
            }
        }

        Ok(chain)
    }
}
