//! In-memory store implementation
//!
//! A reference backend for tests and single-process deployments. All tables
//! sit behind one lock, so multi-table writes such as project creation are
//! atomic.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use kaid_org::{Comment, ExternalIdentity, Flag, Membership, Project, Task, Team, User};

use crate::error::{StoreError, StoreResult};
use crate::store::{IdentityResolver, MembershipStore, ProjectStore, ResourceStore, UserStore};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    memberships: HashMap<Uuid, Membership>,
    projects: HashMap<Uuid, Project>,
    teams: HashMap<Uuid, Team>,
    flags: HashMap<Uuid, Flag>,
    tasks: HashMap<Uuid, Task>,
    comments: HashMap<Uuid, Comment>,
}

impl Tables {
    fn pair_taken(&self, project_id: Uuid, user_id: Uuid, except: Option<Uuid>) -> bool {
        self.memberships.values().any(|m| {
            m.project_id == project_id && m.user_id == user_id && Some(m.id) != except
        })
    }
}

/// In-memory store.
///
/// Cloning is cheap and clones share the same tables.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
    unavailable: Arc<AtomicBool>,
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("unavailable", &self.unavailable.load(Ordering::Relaxed))
            .finish()
    }
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with [`StoreError::Unavailable`].
    ///
    /// Lets tests observe how callers handle a backend outage.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::Relaxed);
    }

    fn ensure_available(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable("memory store switched off".to_string()));
        }
        Ok(())
    }

    /// Number of stored memberships.
    pub async fn membership_count(&self) -> usize {
        self.tables.read().await.memberships.len()
    }

    /// Number of stored projects.
    pub async fn project_count(&self) -> usize {
        self.tables.read().await.projects.len()
    }
}

#[async_trait]
impl MembershipStore for MemoryStore {
    async fn create_membership(&self, membership: Membership) -> StoreResult<Membership> {
        self.ensure_available()?;
        let mut tables = self.tables.write().await;

        if tables.memberships.contains_key(&membership.id) {
            return Err(StoreError::Duplicate(format!("membership {}", membership.id)));
        }
        if tables.pair_taken(membership.project_id, membership.user_id, None) {
            return Err(StoreError::Duplicate(format!(
                "membership for user {} in project {}",
                membership.user_id, membership.project_id
            )));
        }

        tables.memberships.insert(membership.id, membership.clone());
        tracing::debug!(
            membership_id = %membership.id,
            project_id = %membership.project_id,
            user_id = %membership.user_id,
            "Membership created"
        );
        Ok(membership)
    }

    async fn find_membership(&self, membership_id: Uuid) -> StoreResult<Option<Membership>> {
        self.ensure_available()?;
        Ok(self.tables.read().await.memberships.get(&membership_id).cloned())
    }

    async fn find_membership_by_project_and_user(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<Option<Membership>> {
        self.ensure_available()?;
        let tables = self.tables.read().await;
        Ok(tables
            .memberships
            .values()
            .find(|m| m.project_id == project_id && m.user_id == user_id)
            .cloned())
    }

    async fn find_memberships_by_user(&self, user_id: Uuid) -> StoreResult<Vec<Membership>> {
        self.ensure_available()?;
        let tables = self.tables.read().await;
        Ok(tables
            .memberships
            .values()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_active_memberships_by_user(&self, user_id: Uuid) -> StoreResult<Vec<Membership>> {
        Ok(self
            .find_memberships_by_user(user_id)
            .await?
            .into_iter()
            .filter(Membership::grants_access)
            .collect())
    }

    async fn find_pending_memberships_by_user(&self, user_id: Uuid) -> StoreResult<Vec<Membership>> {
        Ok(self
            .find_memberships_by_user(user_id)
            .await?
            .into_iter()
            .filter(Membership::is_pending)
            .collect())
    }

    async fn find_all_memberships(&self) -> StoreResult<Vec<Membership>> {
        self.ensure_available()?;
        Ok(self.tables.read().await.memberships.values().cloned().collect())
    }

    async fn find_memberships_by_project(&self, project_id: Uuid) -> StoreResult<Vec<Membership>> {
        self.ensure_available()?;
        let tables = self.tables.read().await;
        Ok(tables
            .memberships
            .values()
            .filter(|m| m.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn update_membership(&self, membership_id: Uuid, mut membership: Membership) -> StoreResult<Membership> {
        self.ensure_available()?;
        let mut tables = self.tables.write().await;

        if !tables.memberships.contains_key(&membership_id) {
            return Err(StoreError::NotFound(format!("membership {}", membership_id)));
        }
        if tables.pair_taken(membership.project_id, membership.user_id, Some(membership_id)) {
            return Err(StoreError::Duplicate(format!(
                "membership for user {} in project {}",
                membership.user_id, membership.project_id
            )));
        }

        membership.id = membership_id;
        tables.memberships.insert(membership_id, membership.clone());
        tracing::debug!(membership_id = %membership_id, "Membership updated");
        Ok(membership)
    }

    async fn delete_membership(&self, membership_id: Uuid) -> StoreResult<()> {
        self.ensure_available()?;
        let mut tables = self.tables.write().await;
        tables
            .memberships
            .remove(&membership_id)
            .ok_or_else(|| StoreError::NotFound(format!("membership {}", membership_id)))?;
        tracing::debug!(membership_id = %membership_id, "Membership deleted");
        Ok(())
    }
}

#[async_trait]
impl ProjectStore for MemoryStore {
    async fn create_project_with_owner(&self, project: Project, owner: Membership) -> StoreResult<(Project, Membership)> {
        self.ensure_available()?;
        let mut tables = self.tables.write().await;

        if tables.projects.contains_key(&project.id) {
            return Err(StoreError::Duplicate(format!("project {}", project.id)));
        }
        if owner.project_id != project.id {
            return Err(StoreError::Internal(format!(
                "owner membership belongs to project {}, not {}",
                owner.project_id, project.id
            )));
        }
        if tables.memberships.contains_key(&owner.id)
            || tables.pair_taken(owner.project_id, owner.user_id, None)
        {
            return Err(StoreError::Duplicate(format!("membership {}", owner.id)));
        }

        // Both checks passed under the same write lock; the inserts cannot fail.
        tables.projects.insert(project.id, project.clone());
        tables.memberships.insert(owner.id, owner.clone());

        tracing::debug!(
            project_id = %project.id,
            owner_id = %project.owner_id,
            "Project created with owner membership"
        );
        Ok((project, owner))
    }

    async fn find_project(&self, project_id: Uuid) -> StoreResult<Option<Project>> {
        self.ensure_available()?;
        Ok(self.tables.read().await.projects.get(&project_id).cloned())
    }

    async fn find_all_projects(&self) -> StoreResult<Vec<Project>> {
        self.ensure_available()?;
        Ok(self.tables.read().await.projects.values().cloned().collect())
    }

    async fn update_project(&self, project: Project) -> StoreResult<Project> {
        self.ensure_available()?;
        let mut tables = self.tables.write().await;
        let slot = tables
            .projects
            .get_mut(&project.id)
            .ok_or_else(|| StoreError::NotFound(format!("project {}", project.id)))?;
        *slot = project.clone();
        tracing::debug!(project_id = %project.id, "Project updated");
        Ok(project)
    }

    async fn delete_project(&self, project_id: Uuid) -> StoreResult<()> {
        self.ensure_available()?;
        let mut tables = self.tables.write().await;
        tables
            .projects
            .remove(&project_id)
            .ok_or_else(|| StoreError::NotFound(format!("project {}", project_id)))?;

        tables.memberships.retain(|_, m| m.project_id != project_id);
        tables.teams.retain(|_, t| t.project_id != project_id);
        tables.flags.retain(|_, f| f.project_id != project_id);
        tables.tasks.retain(|_, t| t.project_id != project_id);
        tables.comments.retain(|_, c| c.project_id != project_id);

        tracing::debug!(project_id = %project_id, "Project deleted with dependents");
        Ok(())
    }
}

macro_rules! memory_resource_store {
    ($resource:ty, $table:ident, $label:literal, |$tables:ident, $removed:ident| $on_delete:block) => {
        #[async_trait]
        impl ResourceStore<$resource> for MemoryStore {
            async fn create(&self, resource: $resource) -> StoreResult<$resource> {
                self.ensure_available()?;
                let mut tables = self.tables.write().await;
                if tables.$table.contains_key(&resource.id) {
                    return Err(StoreError::Duplicate(format!("{} {}", $label, resource.id)));
                }
                tables.$table.insert(resource.id, resource.clone());
                tracing::debug!(kind = $label, id = %resource.id, project_id = %resource.project_id, "Resource created");
                Ok(resource)
            }

            async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<$resource>> {
                self.ensure_available()?;
                Ok(self.tables.read().await.$table.get(&id).cloned())
            }

            async fn find_by_project(&self, project_id: Uuid) -> StoreResult<Vec<$resource>> {
                self.ensure_available()?;
                let tables = self.tables.read().await;
                Ok(tables
                    .$table
                    .values()
                    .filter(|r| r.project_id == project_id)
                    .cloned()
                    .collect())
            }

            async fn update(&self, resource: $resource) -> StoreResult<$resource> {
                self.ensure_available()?;
                let mut tables = self.tables.write().await;
                let slot = tables
                    .$table
                    .get_mut(&resource.id)
                    .ok_or_else(|| StoreError::NotFound(format!("{} {}", $label, resource.id)))?;
                *slot = resource.clone();
                tracing::debug!(kind = $label, id = %resource.id, "Resource updated");
                Ok(resource)
            }

            async fn delete(&self, id: Uuid) -> StoreResult<()> {
                self.ensure_available()?;
                let mut guard = self.tables.write().await;
                let $tables: &mut Tables = &mut guard;
                let $removed = $tables
                    .$table
                    .remove(&id)
                    .ok_or_else(|| StoreError::NotFound(format!("{} {}", $label, id)))?;
                $on_delete;
                tracing::debug!(kind = $label, id = %id, "Resource deleted");
                Ok(())
            }
        }
    };
}

memory_resource_store!(Team, teams, "team", |tables, removed| {
    let gone = Some(removed.id);
    for membership in tables.memberships.values_mut().filter(|m| m.team_id == gone) {
        membership.team_id = None;
    }
    for flag in tables.flags.values_mut().filter(|f| f.team_id == gone) {
        flag.team_id = None;
    }
    for task in tables.tasks.values_mut().filter(|t| t.team_id == gone) {
        task.team_id = None;
    }
});

memory_resource_store!(Flag, flags, "flag", |_tables, _removed| {});

memory_resource_store!(Task, tasks, "task", |tables, removed| {
    tables.comments.retain(|_, c| c.task_id != removed.id);
});

memory_resource_store!(Comment, comments, "comment", |_tables, _removed| {});

#[async_trait]
impl IdentityResolver for MemoryStore {
    async fn resolve(&self, identity: &ExternalIdentity) -> StoreResult<Option<Uuid>> {
        self.ensure_available()?;
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.external.as_ref() == Some(identity))
            .map(|u| u.id))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn register_user(&self, user: User) -> StoreResult<User> {
        self.ensure_available()?;
        let mut tables = self.tables.write().await;

        if let Some(external) = &user.external {
            if let Some(existing) = tables
                .users
                .values()
                .find(|u| u.external.as_ref() == Some(external))
            {
                return Ok(existing.clone());
            }
        }
        if tables.users.contains_key(&user.id) {
            return Err(StoreError::Duplicate(format!("user {}", user.id)));
        }

        tables.users.insert(user.id, user.clone());
        tracing::debug!(user_id = %user.id, "User registered");
        Ok(user)
    }

    async fn find_user(&self, user_id: Uuid) -> StoreResult<Option<User>> {
        self.ensure_available()?;
        Ok(self.tables.read().await.users.get(&user_id).cloned())
    }
}
