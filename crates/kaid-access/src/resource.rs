//! Project resource services
//!
//! Teams, flags and tasks share one service: every operation loads the
//! resource, asks the guard, then touches the store.

use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use kaid_org::{Flag, Task, Team};
use kaid_rbac::{OperationKind, OwnedResource};
use kaid_store::ResourceStore;

use crate::error::{AccessError, AccessResult};
use crate::guard::AccessGuard;

/// Access-checked operations on one kind of project resource.
pub struct ResourceService<R: OwnedResource> {
    guard: AccessGuard,
    store: Arc<dyn ResourceStore<R>>,
}

/// Team operations (a team is owned by its leader).
pub type TeamService = ResourceService<Team>;

/// Flag operations.
pub type FlagService = ResourceService<Flag>;

/// Task operations.
pub type TaskService = ResourceService<Task>;

impl<R: OwnedResource> Clone for ResourceService<R> {
    fn clone(&self) -> Self {
        Self {
            guard: self.guard.clone(),
            store: Arc::clone(&self.store),
        }
    }
}

impl<R: OwnedResource> ResourceService<R> {
    /// Create a resource service.
    pub fn new(guard: AccessGuard, store: Arc<dyn ResourceStore<R>>) -> Self {
        Self { guard, store }
    }

    async fn load(&self, id: Uuid) -> AccessResult<R> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AccessError::NotFound(format!("{} {}", R::KIND, id)))
    }

    /// Create a resource.
    ///
    /// The caller must be an active member of the resource's project. A
    /// resource recorded under someone else's name needs the caller to be
    /// allowed to mutate that user's resources.
    #[instrument(skip(self, resource), fields(kind = R::KIND.as_str(), project_id = %resource.project_id()))]
    pub async fn create(&self, caller_id: Uuid, resource: R) -> AccessResult<R> {
        self.guard
            .require_active_member(caller_id, resource.project_id())
            .await?;
        if resource.owner_id() != caller_id {
            self.guard
                .require_resource(caller_id, &resource, OperationKind::Mutate)
                .await?;
        }

        let created = self.store.create(resource).await?;
        info!(id = %created.id(), owner_id = %created.owner_id(), "Resource created");
        Ok(created)
    }

    /// Fetch a resource the caller may read.
    #[instrument(skip(self), fields(kind = R::KIND.as_str()))]
    pub async fn get(&self, caller_id: Uuid, id: Uuid) -> AccessResult<R> {
        let resource = self.load(id).await?;
        self.guard
            .require_resource(caller_id, &resource, OperationKind::Read)
            .await?;
        Ok(resource)
    }

    /// Change a resource the caller may mutate.
    ///
    /// A resource cannot move to another project. Handing it to a new owner
    /// needs the caller to be allowed to mutate that owner's resources too.
    /// Resources that keep a modification time have it refreshed.
    #[instrument(skip(self, apply), fields(kind = R::KIND.as_str()))]
    pub async fn update<F>(&self, caller_id: Uuid, id: Uuid, apply: F) -> AccessResult<R>
    where
        F: FnOnce(&mut R) + Send,
    {
        let mut resource = self.load(id).await?;
        self.guard
            .require_resource(caller_id, &resource, OperationKind::Mutate)
            .await?;

        let (project_id, owner_id) = (resource.project_id(), resource.owner_id());
        apply(&mut resource);

        if resource.id() != id {
            return Err(AccessError::InvalidInput(format!("{} id cannot change", R::KIND)));
        }
        if resource.project_id() != project_id {
            return Err(AccessError::InvalidInput(format!(
                "{} cannot move to another project",
                R::KIND
            )));
        }
        if resource.owner_id() != owner_id {
            self.guard
                .require_resource(caller_id, &resource, OperationKind::Mutate)
                .await?;
        }

        resource.mark_updated();
        let updated = self.store.update(resource).await?;
        info!(id = %id, "Resource updated");
        Ok(updated)
    }

    /// Delete a resource the caller may mutate.
    #[instrument(skip(self), fields(kind = R::KIND.as_str()))]
    pub async fn delete(&self, caller_id: Uuid, id: Uuid) -> AccessResult<()> {
        let resource = self.load(id).await?;
        self.guard
            .require_resource(caller_id, &resource, OperationKind::Mutate)
            .await?;

        self.store.delete(id).await?;
        info!(id = %id, "Resource deleted");
        Ok(())
    }

    /// Resources in a project the caller may read.
    #[instrument(skip(self), fields(kind = R::KIND.as_str()))]
    pub async fn list_in_project(&self, caller_id: Uuid, project_id: Uuid) -> AccessResult<Vec<R>> {
        let items = self.store.find_by_project(project_id).await?;
        self.guard
            .filter_visible(caller_id, items, OperationKind::Read)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kaid_org::{Membership, Role};
    use kaid_rbac::HierarchyEngine;
    use kaid_store::{MembershipStore, MemoryStore};

    struct Fixture {
        store: Arc<MemoryStore>,
        flags: FlagService,
        teams: TeamService,
        tasks: TaskService,
        project: Uuid,
        admin: Uuid,
        manager: Uuid,
        member: Uuid,
    }

    impl Fixture {
        async fn new() -> Self {
            let store = Arc::new(MemoryStore::new());
            let guard = AccessGuard::new(
                HierarchyEngine::new(Arc::new(kaid_org::RoleCatalog::standard())),
                store.clone(),
            );
            let project = Uuid::now_v7();
            let (admin, manager, member) = (Uuid::now_v7(), Uuid::now_v7(), Uuid::now_v7());

            store
                .create_membership(Membership::creator(project, admin))
                .await
                .unwrap();
            for (user, role) in [(manager, Role::Manager), (member, Role::Member)] {
                let mut m = Membership::invited(project, user, role);
                m.accept().unwrap();
                store.create_membership(m).await.unwrap();
            }

            Self {
                flags: FlagService::new(guard.clone(), store.clone()),
                teams: TeamService::new(guard.clone(), store.clone()),
                tasks: TaskService::new(guard, store.clone()),
                store,
                project,
                admin,
                manager,
                member,
            }
        }
    }

    #[tokio::test]
    async fn test_manager_updates_members_flag() {
        let fx = Fixture::new().await;
        let flag = fx
            .flags
            .create(fx.member, Flag::new(fx.project, fx.member, "tests are flaky"))
            .await
            .unwrap();

        let updated = fx
            .flags
            .update(fx.manager, flag.id, |f| f.priority = 1)
            .await
            .unwrap();
        assert_eq!(updated.priority, 1);

        let mine = fx
            .flags
            .create(fx.manager, Flag::new(fx.project, fx.manager, "release blocked"))
            .await
            .unwrap();
        let err = fx
            .flags
            .update(fx.member, mine.id, |f| f.priority = 5)
            .await
            .unwrap_err();
        assert_eq!(err.deny_reason(), Some("access denied"));
    }

    #[tokio::test]
    async fn test_task_update_refreshes_updated_at() {
        let fx = Fixture::new().await;
        let task = fx
            .tasks
            .create(
                fx.manager,
                Task::new(fx.project, fx.manager, "cut release").with_assignee(fx.member),
            )
            .await
            .unwrap();
        assert_eq!(task.assignee_id, Some(fx.member));

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        let updated = fx
            .tasks
            .update(fx.manager, task.id, |t| t.priority = 3)
            .await
            .unwrap();
        assert_eq!(updated.priority, 3);
        assert!(updated.updated_at > task.updated_at);
        assert_eq!(updated.created_at, task.created_at);

        let stored: Option<Task> = fx.store.find_by_id(task.id).await.unwrap();
        assert_eq!(stored.map(|t| t.updated_at), Some(updated.updated_at));
    }

    #[tokio::test]
    async fn test_create_for_someone_else_needs_authority() {
        let fx = Fixture::new().await;

        let err = fx
            .flags
            .create(fx.member, Flag::new(fx.project, fx.manager, "not mine"))
            .await
            .unwrap_err();
        assert!(matches!(err, AccessError::AccessDenied(_)));

        assert!(fx
            .teams
            .create(fx.admin, Team::new(fx.project, "Platform", fx.manager))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_create_requires_active_membership() {
        let fx = Fixture::new().await;
        let outsider = Uuid::now_v7();
        let err = fx
            .flags
            .create(outsider, Flag::new(fx.project, outsider, "drive-by"))
            .await
            .unwrap_err();
        assert_eq!(err.deny_reason(), Some("membership not found"));
    }

    #[tokio::test]
    async fn test_update_cannot_move_or_escalate() {
        let fx = Fixture::new().await;
        let flag = fx
            .flags
            .create(fx.manager, Flag::new(fx.project, fx.manager, "slow build"))
            .await
            .unwrap();

        let err = fx
            .flags
            .update(fx.manager, flag.id, |f| f.project_id = Uuid::now_v7())
            .await
            .unwrap_err();
        assert!(matches!(err, AccessError::InvalidInput(_)));

        // Handing the flag to the Admin would put it out of the manager's reach.
        let admin = fx.admin;
        let err = fx
            .flags
            .update(fx.manager, flag.id, move |f| f.owner_id = admin)
            .await
            .unwrap_err();
        assert!(matches!(err, AccessError::AccessDenied(_)));

        let stored: Option<Flag> = fx.store.find_by_id(flag.id).await.unwrap();
        assert_eq!(stored.map(|f| f.owner_id), Some(fx.manager));
    }

    #[tokio::test]
    async fn test_delete_and_missing() {
        let fx = Fixture::new().await;
        let flag = fx
            .flags
            .create(fx.member, Flag::new(fx.project, fx.member, "typo"))
            .await
            .unwrap();

        fx.flags.delete(fx.admin, flag.id).await.unwrap();
        let err = fx.flags.get(fx.admin, flag.id).await.unwrap_err();
        assert!(matches!(err, AccessError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_in_project_filters() {
        let fx = Fixture::new().await;
        for owner in [fx.admin, fx.manager, fx.member] {
            fx.flags
                .create(owner, Flag::new(fx.project, owner, "flag"))
                .await
                .unwrap();
        }

        assert_eq!(fx.flags.list_in_project(fx.admin, fx.project).await.unwrap().len(), 3);
        assert_eq!(fx.flags.list_in_project(fx.manager, fx.project).await.unwrap().len(), 2);

        let own: Vec<Uuid> = fx
            .flags
            .list_in_project(fx.member, fx.project)
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.owner_id)
            .collect();
        assert_eq!(own, vec![fx.member]);
    }
}
