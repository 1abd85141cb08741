//! Caller identity
//!
//! Maps an authenticated external identity (issuer + subject) onto the
//! internal user id every other service works with.

use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use kaid_org::{ExternalIdentity, User};
use kaid_store::{IdentityResolver, UserStore};

use crate::error::{AccessError, AccessResult};

/// Resolves callers and registers users on first sign-in.
#[derive(Clone)]
pub struct IdentityService {
    resolver: Arc<dyn IdentityResolver>,
    users: Arc<dyn UserStore>,
}

impl IdentityService {
    /// Create an identity service.
    pub fn new(resolver: Arc<dyn IdentityResolver>, users: Arc<dyn UserStore>) -> Self {
        Self { resolver, users }
    }

    /// The internal id of an authenticated caller.
    ///
    /// Fails with [`AccessError::UserNotFound`] if the identity never signed in.
    #[instrument(skip(self), fields(issuer = %identity.issuer))]
    pub async fn resolve_caller(&self, identity: &ExternalIdentity) -> AccessResult<Uuid> {
        self.resolver
            .resolve(identity)
            .await?
            .ok_or(AccessError::UserNotFound)
    }

    /// Register a user on first sign-in, or return the existing one.
    pub async fn sign_in(&self, user: User) -> AccessResult<User> {
        if user.external.is_none() {
            return Err(AccessError::InvalidInput(
                "sign-in requires an external identity".to_string(),
            ));
        }
        if user.username.trim().is_empty() {
            return Err(AccessError::InvalidInput("username must not be empty".to_string()));
        }

        let registered = self.users.register_user(user).await?;
        info!(user_id = %registered.id, "User signed in");
        Ok(registered)
    }

    /// Look up a user by internal id.
    pub async fn user(&self, user_id: Uuid) -> AccessResult<User> {
        self.users
            .find_user(user_id)
            .await?
            .ok_or(AccessError::UserNotFound)
    }
}
