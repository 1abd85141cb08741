//! Error types for access-checked operations
//!
//! A denial from the hierarchy engine is a value. It becomes an
//! [`AccessError::AccessDenied`] only once a service refuses to carry out
//! the operation, so callers can still tell "not found" from "not allowed".

use kaid_org::InvalidTransition;
use kaid_rbac::DenyReason;
use kaid_store::StoreError;
use thiserror::Error;

/// Access service error types.
#[derive(Debug, Error)]
pub enum AccessError {
    /// The caller could not be resolved to an internal user
    #[error("User not found")]
    UserNotFound,

    /// The addressed membership or resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The operation was refused; carries the human-readable reason
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// The operation conflicts with the current state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The persistence backend failed
    #[error(transparent)]
    Store(StoreError),

    /// The request carried an unusable value
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for access service operations.
pub type AccessResult<T> = Result<T, AccessError>;

impl AccessError {
    /// Build an [`AccessError::AccessDenied`] from an engine deny reason.
    pub fn denied(reason: DenyReason) -> Self {
        AccessError::AccessDenied(reason.as_str().to_string())
    }

    /// The denial reason, if this is an access denial.
    pub fn deny_reason(&self) -> Option<&str> {
        match self {
            AccessError::AccessDenied(reason) => Some(reason),
            _ => None,
        }
    }

    /// Check if this error should be logged at error level.
    ///
    /// Denials and missing records are expected outcomes.
    pub fn is_server_error(&self) -> bool {
        matches!(self, AccessError::Store(_))
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            AccessError::UserNotFound | AccessError::NotFound(_) => 404,
            AccessError::AccessDenied(_) => 403,
            AccessError::InvalidState(_) => 409,
            AccessError::Store(e) if e.is_transient() => 503,
            AccessError::Store(_) => 500,
            AccessError::InvalidInput(_) => 400,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            AccessError::UserNotFound => "USER_NOT_FOUND",
            AccessError::NotFound(_) => "NOT_FOUND",
            AccessError::AccessDenied(_) => "ACCESS_DENIED",
            AccessError::InvalidState(_) => "INVALID_STATE",
            AccessError::Store(e) if e.is_transient() => "STORE_UNAVAILABLE",
            AccessError::Store(_) => "STORE_ERROR",
            AccessError::InvalidInput(_) => "INVALID_INPUT",
        }
    }
}

impl From<StoreError> for AccessError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(what) => AccessError::InvalidState(format!("already exists: {}", what)),
            other => AccessError::Store(other),
        }
    }
}

impl From<InvalidTransition> for AccessError {
    fn from(err: InvalidTransition) -> Self {
        AccessError::InvalidState(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kaid_org::InvitationState;

    #[test]
    fn test_status_codes() {
        assert_eq!(AccessError::UserNotFound.status_code(), 404);
        assert_eq!(AccessError::NotFound("flag".into()).status_code(), 404);
        assert_eq!(AccessError::denied(DenyReason::AccessDenied).status_code(), 403);
        assert_eq!(AccessError::InvalidState("x".into()).status_code(), 409);
        assert_eq!(AccessError::InvalidInput("x".into()).status_code(), 400);
        assert_eq!(
            AccessError::Store(StoreError::Unavailable("down".into())).status_code(),
            503
        );
        assert_eq!(
            AccessError::Store(StoreError::Internal("boom".into())).status_code(),
            500
        );
    }

    #[test]
    fn test_duplicate_maps_to_invalid_state() {
        let err: AccessError = StoreError::Duplicate("membership".into()).into();
        assert!(matches!(err, AccessError::InvalidState(_)));
        assert!(!err.is_server_error());

        let err: AccessError = StoreError::Unavailable("down".into()).into();
        assert!(err.is_server_error());
        assert_eq!(err.error_code(), "STORE_UNAVAILABLE");
    }

    #[test]
    fn test_denied_keeps_reason() {
        let err = AccessError::denied(DenyReason::MembershipNotFound);
        assert_eq!(err.deny_reason(), Some("membership not found"));
        assert_eq!(err.error_code(), "ACCESS_DENIED");
    }

    #[test]
    fn test_invalid_transition_maps_to_invalid_state() {
        let transition = InvitationState::Active.accept().unwrap_err();
        let err: AccessError = transition.into();
        assert_eq!(err.status_code(), 409);
    }
}
