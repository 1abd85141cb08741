//! Service wiring
//!
//! Builds every access-checked service over one backend that implements all
//! persistence contracts.

use std::sync::Arc;

use kaid_org::{Comment, Flag, Task, Team};
use kaid_store::{IdentityResolver, MembershipStore, ProjectStore, ResourceStore, UserStore};

use crate::comment::CommentService;
use crate::config::{AccessConfig, ConfigError};
use crate::guard::AccessGuard;
use crate::identity::IdentityService;
use crate::membership::MembershipService;
use crate::project::ProjectService;
use crate::resource::{FlagService, TaskService, TeamService};

/// All feature services sharing one guard.
#[derive(Clone)]
pub struct AccessServices {
    /// Caller resolution and sign-in
    pub identity: IdentityService,
    /// Invitations and membership management
    pub memberships: MembershipService,
    /// Projects
    pub projects: ProjectService,
    /// Teams
    pub teams: TeamService,
    /// Flags
    pub flags: FlagService,
    /// Tasks
    pub tasks: TaskService,
    /// Comments on tasks
    pub comments: CommentService,
    guard: AccessGuard,
}

impl AccessServices {
    /// Wire all services over `store`.
    ///
    /// Fails if `config` does not validate.
    pub fn new<S>(store: Arc<S>, config: AccessConfig) -> Result<Self, ConfigError>
    where
        S: MembershipStore
            + ProjectStore
            + ResourceStore<Team>
            + ResourceStore<Flag>
            + ResourceStore<Task>
            + ResourceStore<Comment>
            + IdentityResolver
            + UserStore
            + 'static,
    {
        config.validate()?;

        let memberships: Arc<dyn MembershipStore> = store.clone();
        let guard = AccessGuard::from_config(&config, memberships);

        let tasks: Arc<dyn ResourceStore<Task>> = store.clone();
        let comments: Arc<dyn ResourceStore<Comment>> = store.clone();
        let teams: Arc<dyn ResourceStore<Team>> = store.clone();
        let flags: Arc<dyn ResourceStore<Flag>> = store.clone();

        tracing::debug!(
            equal_rank_policy = config.equal_rank_policy.as_str(),
            "Access services configured"
        );

        Ok(Self {
            identity: IdentityService::new(store.clone(), store.clone()),
            memberships: MembershipService::new(guard.clone(), store.clone(), config.clone()),
            projects: ProjectService::new(guard.clone(), store, config),
            teams: TeamService::new(guard.clone(), teams),
            flags: FlagService::new(guard.clone(), flags),
            tasks: TaskService::new(guard.clone(), tasks.clone()),
            comments: CommentService::new(guard.clone(), tasks, comments),
            guard,
        })
    }

    /// The shared access guard.
    pub fn guard(&self) -> &AccessGuard {
        &self.guard
    }
}
