//! Membership domain models
//!
//! This module provides the membership entity that links a user to a project.
//! A membership carries the user's role, optional team, position in the
//! project's reporting hierarchy, and invitation state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::roles::Role;

/// Maximum length of the free-text status label.
pub const STATUS_LABEL_MAX_LEN: usize = 20;

/// Who a member reports to within a project.
///
/// "Reports to self" and "no superior recorded" are distinct states: the
/// former marks the top of a reporting chain, the latter means nobody has
/// decided yet.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "kind", content = "user_id", rename_all = "snake_case")]
pub enum Superior {
    /// No superior recorded
    Unassigned,

    /// The member reports to themself (top of chain)
    OwnChain,

    /// The member reports to another user in the same project
    User(Uuid),
}

impl Superior {
    /// Resolve a requested superior at membership creation time.
    ///
    /// No request, or a request naming the member themself, resolves to
    /// [`Superior::OwnChain`].
    ///
    /// # Examples
    ///
    /// ```
    /// use kaid_org::Superior;
    /// use uuid::Uuid;
    ///
    /// let member = Uuid::now_v7();
    /// let boss = Uuid::now_v7();
    /// assert_eq!(Superior::resolve(None, member), Superior::OwnChain);
    /// assert_eq!(Superior::resolve(Some(member), member), Superior::OwnChain);
    /// assert_eq!(Superior::resolve(Some(boss), member), Superior::User(boss));
    /// ```
    pub fn resolve(requested: Option<Uuid>, member: Uuid) -> Self {
        match requested {
            Some(id) if id != member => Self::User(id),
            _ => Self::OwnChain,
        }
    }

    /// The superior's user id, given the member this superior belongs to.
    pub fn superior_user_id(&self, member: Uuid) -> Option<Uuid> {
        match self {
            Self::Unassigned => None,
            Self::OwnChain => Some(member),
            Self::User(id) => Some(*id),
        }
    }

    /// Whether this is the top of a reporting chain.
    pub fn is_top_of_chain(&self) -> bool {
        matches!(self, Self::OwnChain)
    }
}

impl Default for Superior {
    fn default() -> Self {
        Self::OwnChain
    }
}

/// Invitation state of a membership.
///
/// A membership starts `Pending` when a user is invited and becomes
/// `Active` once the invited user accepts. Declining or removing deletes the
/// membership row, so there is no explicit removed state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum InvitationState {
    /// Invited, not yet accepted. Grants no access.
    Pending,

    /// Accepted. Grants the membership's role.
    Active,
}

impl InvitationState {
    /// Map a stored tri-state activation flag onto an invitation state.
    ///
    /// Only an explicit `true` is active; `false` and unset are pending.
    pub fn from_activation(activation: Option<bool>) -> Self {
        match activation {
            Some(true) => Self::Active,
            Some(false) | None => Self::Pending,
        }
    }

    /// The activation flag as it would be stored.
    pub fn activation(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Whether the membership is active.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Transition `Pending -> Active`.
    pub fn accept(self) -> Result<Self, InvalidTransition> {
        match self {
            Self::Pending => Ok(Self::Active),
            Self::Active => Err(InvalidTransition {
                from: self,
                action: "accept",
            }),
        }
    }

    /// Check that a decline is legal. Only pending invitations can be declined.
    pub fn decline(self) -> Result<(), InvalidTransition> {
        match self {
            Self::Pending => Ok(()),
            Self::Active => Err(InvalidTransition {
                from: self,
                action: "decline",
            }),
        }
    }

    /// Get string representation of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
        }
    }
}

impl Default for InvitationState {
    fn default() -> Self {
        Self::Pending
    }
}

impl std::fmt::Display for InvitationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lifecycle transition that is not allowed from the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot {action} a membership that is {from}")]
pub struct InvalidTransition {
    /// State the membership was in
    pub from: InvitationState,
    /// Attempted action
    pub action: &'static str,
}

/// Project membership linking a user to a project.
///
/// At most one membership exists per (project, user) pair. A pending
/// membership confers no rights until it is accepted.
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use kaid_org::{Membership, Role};
///
/// let project_id = Uuid::now_v7();
/// let user_id = Uuid::now_v7();
/// let membership = Membership::invited(project_id, user_id, Role::Member);
/// assert!(!membership.grants_access());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Membership {
    /// Unique membership ID
    pub id: Uuid,

    /// Project ID
    pub project_id: Uuid,

    /// User ID
    pub user_id: Uuid,

    /// Role within the project
    pub role: Role,

    /// Team within the project (if assigned)
    pub team_id: Option<Uuid>,

    /// Position in the reporting hierarchy
    #[serde(default)]
    pub superior: Superior,

    /// When the membership was created
    pub joined_at: DateTime<Utc>,

    /// Invitation state
    #[serde(default)]
    pub state: InvitationState,

    /// Free-text status label
    #[serde(default)]
    pub status: String,
}

impl Membership {
    /// Creates a pending membership for an invited user.
    ///
    /// The membership is created with:
    /// - A newly generated UUID v7 ID
    /// - Pending state
    /// - The member reporting to themself
    /// - Current timestamp for joined_at
    pub fn invited(project_id: Uuid, user_id: Uuid, role: Role) -> Self {
        Self {
            id: Uuid::now_v7(),
            project_id,
            user_id,
            role,
            team_id: None,
            superior: Superior::OwnChain,
            joined_at: Utc::now(),
            state: InvitationState::Pending,
            status: InvitationState::Pending.as_str().to_string(),
        }
    }

    /// Creates the membership a project's creator receives.
    ///
    /// Creators are active Admins at the top of their own chain.
    ///
    /// # Examples
    ///
    /// ```
    /// use uuid::Uuid;
    /// use kaid_org::{Membership, Role, Superior};
    ///
    /// let m = Membership::creator(Uuid::now_v7(), Uuid::now_v7());
    /// assert_eq!(m.role, Role::Admin);
    /// assert_eq!(m.superior, Superior::OwnChain);
    /// assert!(m.grants_access());
    /// ```
    pub fn creator(project_id: Uuid, user_id: Uuid) -> Self {
        Self {
            state: InvitationState::Active,
            status: InvitationState::Active.as_str().to_string(),
            ..Self::invited(project_id, user_id, Role::Admin)
        }
    }

    /// Assign the membership to a team.
    pub fn with_team(mut self, team_id: Uuid) -> Self {
        self.team_id = Some(team_id);
        self
    }

    /// Set the member's superior.
    pub fn with_superior(mut self, superior: Superior) -> Self {
        self.superior = superior;
        self
    }

    /// Set the free-text status label.
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    /// Whether this membership currently grants its role's rights.
    pub fn grants_access(&self) -> bool {
        self.state.is_active()
    }

    /// Whether this membership is an unanswered invitation.
    pub fn is_pending(&self) -> bool {
        !self.state.is_active()
    }

    /// The user this member reports to, if any.
    pub fn superior_user_id(&self) -> Option<Uuid> {
        self.superior.superior_user_id(self.user_id)
    }

    /// Accept the invitation in place.
    pub fn accept(&mut self) -> Result<(), InvalidTransition> {
        self.state = self.state.accept()?;
        Ok(())
    }

    /// Whether the status label fits the stored column.
    pub fn status_fits(&self, max_len: usize) -> bool {
        self.status.chars().count() <= max_len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invited_membership() {
        let project_id = Uuid::now_v7();
        let user_id = Uuid::now_v7();
        let m = Membership::invited(project_id, user_id, Role::Manager);

        assert_eq!(m.project_id, project_id);
        assert_eq!(m.user_id, user_id);
        assert_eq!(m.role, Role::Manager);
        assert_eq!(m.state, InvitationState::Pending);
        assert!(m.is_pending());
        assert!(!m.grants_access());
        assert_eq!(m.superior_user_id(), Some(user_id));
    }

    #[test]
    fn test_creator_membership() {
        let m = Membership::creator(Uuid::now_v7(), Uuid::now_v7());
        assert_eq!(m.role, Role::Admin);
        assert!(m.grants_access());
        assert_eq!(m.status, "active");
    }

    #[test]
    fn test_accept_transition() {
        let mut m = Membership::invited(Uuid::now_v7(), Uuid::now_v7(), Role::Member);
        m.accept().unwrap();
        assert!(m.grants_access());

        let err = m.accept().unwrap_err();
        assert_eq!(err.from, InvitationState::Active);
        assert_eq!(err.to_string(), "cannot accept a membership that is active");
    }

    #[test]
    fn test_decline_only_pending() {
        assert!(InvitationState::Pending.decline().is_ok());
        assert!(InvitationState::Active.decline().is_err());
    }

    #[test]
    fn test_activation_tri_state() {
        assert_eq!(InvitationState::from_activation(Some(true)), InvitationState::Active);
        assert_eq!(InvitationState::from_activation(Some(false)), InvitationState::Pending);
        assert_eq!(InvitationState::from_activation(None), InvitationState::Pending);
        assert!(InvitationState::Active.activation());
    }

    #[test]
    fn test_superior_states() {
        let member = Uuid::now_v7();
        let boss = Uuid::now_v7();

        assert_eq!(Superior::Unassigned.superior_user_id(member), None);
        assert_eq!(Superior::OwnChain.superior_user_id(member), Some(member));
        assert_eq!(Superior::User(boss).superior_user_id(member), Some(boss));
        assert!(Superior::OwnChain.is_top_of_chain());
        assert!(!Superior::User(boss).is_top_of_chain());
    }

    #[test]
    fn test_builders() {
        let team = Uuid::now_v7();
        let boss = Uuid::now_v7();
        let m = Membership::invited(Uuid::now_v7(), Uuid::now_v7(), Role::Member)
            .with_team(team)
            .with_superior(Superior::User(boss))
            .with_status("on leave");

        assert_eq!(m.team_id, Some(team));
        assert_eq!(m.superior_user_id(), Some(boss));
        assert_eq!(m.status, "on leave");
        assert!(m.status_fits(STATUS_LABEL_MAX_LEN));
        assert!(!m.with_status("x".repeat(21)).status_fits(STATUS_LABEL_MAX_LEN));
    }

    #[test]
    fn test_membership_serde_roundtrip_keeps_superior() {
        let boss = Uuid::now_v7();
        let m = Membership::invited(Uuid::now_v7(), Uuid::now_v7(), Role::Member)
            .with_superior(Superior::User(boss));

        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["superior"]["kind"], "user");
        assert_eq!(json["state"], "pending");

        let back: Membership = serde_json::from_value(json).unwrap();
        assert_eq!(back, m);
    }
}
