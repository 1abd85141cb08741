//! Comment service
//!
//! Comments hang off tasks. Posting needs read access to the task; the
//! comment itself is then guarded like any other owned resource.

use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use kaid_org::{Comment, Task};
use kaid_rbac::OperationKind;
use kaid_store::ResourceStore;

use crate::error::{AccessError, AccessResult};
use crate::guard::AccessGuard;

/// Access-checked comment operations.
#[derive(Clone)]
pub struct CommentService {
    guard: AccessGuard,
    tasks: Arc<dyn ResourceStore<Task>>,
    comments: Arc<dyn ResourceStore<Comment>>,
}

impl CommentService {
    /// Create a comment service.
    pub fn new(
        guard: AccessGuard,
        tasks: Arc<dyn ResourceStore<Task>>,
        comments: Arc<dyn ResourceStore<Comment>>,
    ) -> Self {
        Self {
            guard,
            tasks,
            comments,
        }
    }

    async fn load_task(&self, task_id: Uuid) -> AccessResult<Task> {
        self.tasks
            .find_by_id(task_id)
            .await?
            .ok_or_else(|| AccessError::NotFound(format!("task {}", task_id)))
    }

    async fn load(&self, comment_id: Uuid) -> AccessResult<Comment> {
        self.comments
            .find_by_id(comment_id)
            .await?
            .ok_or_else(|| AccessError::NotFound(format!("comment {}", comment_id)))
    }

    fn check_text(text: &str) -> AccessResult<()> {
        if text.trim().is_empty() {
            return Err(AccessError::InvalidInput("comment text must not be empty".to_string()));
        }
        Ok(())
    }

    /// Post a comment on a task.
    #[instrument(skip(self, text))]
    pub async fn post(&self, caller_id: Uuid, task_id: Uuid, text: String) -> AccessResult<Comment> {
        Self::check_text(&text)?;

        let task = self.load_task(task_id).await?;
        self.guard
            .require_active_member(caller_id, task.project_id)
            .await?;
        self.guard
            .require_resource(caller_id, &task, OperationKind::Read)
            .await?;

        let comment = self
            .comments
            .create(Comment::new(task.project_id, task.id, caller_id, text))
            .await?;
        info!(comment_id = %comment.id, project_id = %comment.project_id, "Comment posted");
        Ok(comment)
    }

    /// Fetch a comment the caller may read.
    #[instrument(skip(self))]
    pub async fn get(&self, caller_id: Uuid, comment_id: Uuid) -> AccessResult<Comment> {
        let comment = self.load(comment_id).await?;
        self.guard
            .require_resource(caller_id, &comment, OperationKind::Read)
            .await?;
        Ok(comment)
    }

    /// Replace the text of a comment the caller may mutate.
    #[instrument(skip(self, text))]
    pub async fn update(&self, caller_id: Uuid, comment_id: Uuid, text: String) -> AccessResult<Comment> {
        Self::check_text(&text)?;

        let mut comment = self.load(comment_id).await?;
        self.guard
            .require_resource(caller_id, &comment, OperationKind::Mutate)
            .await?;

        comment.text = text;
        Ok(self.comments.update(comment).await?)
    }

    /// Delete a comment the caller may mutate.
    #[instrument(skip(self))]
    pub async fn delete(&self, caller_id: Uuid, comment_id: Uuid) -> AccessResult<()> {
        let comment = self.load(comment_id).await?;
        self.guard
            .require_resource(caller_id, &comment, OperationKind::Mutate)
            .await?;

        self.comments.delete(comment_id).await?;
        info!(comment_id = %comment_id, "Comment deleted");
        Ok(())
    }

    /// Comments on a task, limited to those the caller may read.
    #[instrument(skip(self))]
    pub async fn list_for_task(&self, caller_id: Uuid, task_id: Uuid) -> AccessResult<Vec<Comment>> {
        let task = self.load_task(task_id).await?;
        self.guard
            .require_resource(caller_id, &task, OperationKind::Read)
            .await?;

        let on_task: Vec<Comment> = self
            .comments
            .find_by_project(task.project_id)
            .await?
            .into_iter()
            .filter(|c| c.task_id == task_id)
            .collect();

        self.guard
            .filter_visible(caller_id, on_task, OperationKind::Read)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kaid_org::{Membership, Role};
    use kaid_store::{MembershipStore, MemoryStore};

    async fn setup() -> (Arc<MemoryStore>, CommentService, Task, Uuid, Uuid) {
        let store = Arc::new(MemoryStore::new());
        let config = crate::AccessConfig::default();
        let service = CommentService::new(
            AccessGuard::from_config(&config, store.clone()),
            store.clone(),
            store.clone(),
        );

        let project = Uuid::now_v7();
        let (manager, member) = (Uuid::now_v7(), Uuid::now_v7());
        for (user, role) in [(manager, Role::Manager), (member, Role::Member)] {
            let mut m = Membership::invited(project, user, role);
            m.accept().unwrap();
            store.create_membership(m).await.unwrap();
        }

        let task = Task::new(project, member, "write release notes");
        ResourceStore::<Task>::create(store.as_ref(), task.clone())
            .await
            .unwrap();

        (store, service, task, manager, member)
    }

    #[tokio::test]
    async fn test_post_and_list() {
        let (_store, comments, task, manager, member) = setup().await;

        let by_member = comments
            .post(member, task.id, "draft is up".to_string())
            .await
            .unwrap();
        assert_eq!(by_member.project_id, task.project_id);

        comments
            .post(manager, task.id, "thanks".to_string())
            .await
            .unwrap();

        assert_eq!(comments.list_for_task(manager, task.id).await.unwrap().len(), 2);
        // The member only sees their own comment; the manager's is out of reach.
        assert_eq!(
            comments.list_for_task(member, task.id).await.unwrap(),
            vec![by_member]
        );
    }

    #[tokio::test]
    async fn test_post_requires_task_access() {
        let (store, comments, task, manager, member) = setup().await;

        let managers_task = Task::new(task.project_id, manager, "plan sprint");
        ResourceStore::<Task>::create(store.as_ref(), managers_task.clone())
            .await
            .unwrap();

        let err = comments
            .post(member, managers_task.id, "can I help?".to_string())
            .await
            .unwrap_err();
        assert_eq!(err.deny_reason(), Some("access denied"));

        let outsider = Uuid::now_v7();
        let err = comments
            .post(outsider, task.id, "hi".to_string())
            .await
            .unwrap_err();
        assert_eq!(err.deny_reason(), Some("membership not found"));

        let err = comments
            .post(Uuid::now_v7(), Uuid::now_v7(), "hi".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, AccessError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_and_delete_follow_hierarchy() {
        let (_store, comments, task, manager, member) = setup().await;
        let by_manager = comments
            .post(manager, task.id, "ship it".to_string())
            .await
            .unwrap();
        let by_member = comments
            .post(member, task.id, "on it".to_string())
            .await
            .unwrap();

        assert!(comments
            .update(member, by_manager.id, "no".to_string())
            .await
            .is_err());
        let edited = comments
            .update(manager, by_member.id, "on it, eta friday".to_string())
            .await
            .unwrap();
        assert_eq!(edited.text, "on it, eta friday");

        let err = comments
            .update(manager, by_member.id, " ".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, AccessError::InvalidInput(_)));

        comments.delete(manager, by_member.id).await.unwrap();
        assert!(matches!(
            comments.get(manager, by_member.id).await,
            Err(AccessError::NotFound(_))
        ));
    }
}
