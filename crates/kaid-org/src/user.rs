//! User domain models
//!
//! Users are created on first sign-in. The external identity (issuer and
//! subject of the identity provider) is only used to resolve a caller to a
//! stable internal id; access decisions never look at it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity asserted by an external identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExternalIdentity {
    /// Token issuer
    pub issuer: String,

    /// Subject within the issuer
    pub subject: String,
}

impl ExternalIdentity {
    /// Creates a new external identity.
    pub fn new(issuer: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            subject: subject.into(),
        }
    }
}

/// A user of the backend.
///
/// # Examples
///
/// ```
/// use kaid_org::{ExternalIdentity, User};
///
/// let user = User::new("alice", "alice@example.com")
///     .with_external(ExternalIdentity::new("https://sso.example.com", "sub-1"));
/// assert!(user.external.is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Stable internal identifier
    pub id: Uuid,

    /// Display name
    pub username: String,

    /// Contact email
    pub email: String,

    /// Linked external identity
    pub external: Option<ExternalIdentity>,

    /// When the user first signed in
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Creates a new user with a freshly generated id.
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            username: username.into(),
            email: email.into(),
            external: None,
            created_at: Utc::now(),
        }
    }

    /// Link an external identity.
    pub fn with_external(mut self, external: ExternalIdentity) -> Self {
        self.external = Some(external);
        self
    }
}
