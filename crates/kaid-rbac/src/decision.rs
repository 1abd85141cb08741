//! # Decisions
//!
//! The outcome of an access check. A denial is an ordinary value carrying a
//! human-readable reason, not an error.

use serde::{Deserialize, Serialize};

/// Why the engine denied an operation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// Caller or owner has no membership in the resource's project.
    MembershipNotFound,

    /// Caller's membership is a pending invitation.
    MembershipInactive,

    /// Caller's role does not outrank the owner's.
    AccessDenied,
}

impl DenyReason {
    /// The reason string reported to callers.
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::MembershipNotFound => "membership not found",
            DenyReason::MembershipInactive => "membership not active",
            DenyReason::AccessDenied => "access denied",
        }
    }
}

impl std::fmt::Display for DenyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of an access check.
///
/// # Example
///
/// ```
/// use kaid_rbac::{Decision, DenyReason};
///
/// let d = Decision::Deny(DenyReason::AccessDenied);
/// assert!(!d.is_allowed());
/// assert_eq!(d.reason(), Some("access denied"));
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "decision", content = "reason", rename_all = "snake_case")]
pub enum Decision {
    /// The operation may proceed.
    Allow,

    /// The operation must not proceed.
    Deny(DenyReason),
}

impl Decision {
    /// Whether the operation may proceed.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// Reason for a denial, `None` when allowed.
    pub fn reason(&self) -> Option<&'static str> {
        match self {
            Decision::Allow => None,
            Decision::Deny(reason) => Some(reason.as_str()),
        }
    }

    /// The deny reason, `None` when allowed.
    pub fn deny_reason(&self) -> Option<DenyReason> {
        match self {
            Decision::Allow => None,
            Decision::Deny(reason) => Some(*reason),
        }
    }
}

/// How the engine treats callers of the same rank as the resource owner.
///
/// Peers never mutate each other's resources. Whether peers may read each
/// other's resources is a product decision; the default denies it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EqualRankPolicy {
    /// Equal rank is denied for every operation.
    Deny,

    /// Equal rank may read; mutation is still denied.
    AllowReads,
}

impl EqualRankPolicy {
    /// Parse policy from string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "deny" | "strict" => Some(EqualRankPolicy::Deny),
            "allow_reads" | "allow-reads" | "read" => Some(EqualRankPolicy::AllowReads),
            _ => None,
        }
    }

    /// Get the string representation of the policy.
    pub fn as_str(&self) -> &'static str {
        match self {
            EqualRankPolicy::Deny => "deny",
            EqualRankPolicy::AllowReads => "allow_reads",
        }
    }
}

impl Default for EqualRankPolicy {
    fn default() -> Self {
        EqualRankPolicy::Deny
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_strings() {
        assert_eq!(DenyReason::MembershipNotFound.as_str(), "membership not found");
        assert_eq!(DenyReason::MembershipInactive.as_str(), "membership not active");
        assert_eq!(DenyReason::AccessDenied.to_string(), "access denied");
    }

    #[test]
    fn test_decision_accessors() {
        assert!(Decision::Allow.is_allowed());
        assert_eq!(Decision::Allow.reason(), None);

        let deny = Decision::Deny(DenyReason::MembershipNotFound);
        assert_eq!(deny.deny_reason(), Some(DenyReason::MembershipNotFound));
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!(EqualRankPolicy::parse("deny"), Some(EqualRankPolicy::Deny));
        assert_eq!(EqualRankPolicy::parse("ALLOW_READS"), Some(EqualRankPolicy::AllowReads));
        assert_eq!(EqualRankPolicy::parse("maybe"), None);
        assert_eq!(EqualRankPolicy::default(), EqualRankPolicy::Deny);
    }
}
