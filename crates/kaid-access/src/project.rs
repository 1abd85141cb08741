//! Project service
//!
//! Creating a project also makes its creator an active Admin of it, in one
//! unit of work. Reading a project needs an active membership; changing or
//! deleting it goes through the hierarchy engine.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use kaid_org::{Membership, Project};
use kaid_rbac::OperationKind;
use kaid_store::ProjectStore;

use crate::config::AccessConfig;
use crate::error::{AccessError, AccessResult};
use crate::guard::AccessGuard;

/// A project to create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProject {
    /// Project name
    pub name: String,

    /// Optional description
    #[serde(default)]
    pub description: Option<String>,

    /// Optional due date
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

impl NewProject {
    /// A project with only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            due_date: None,
        }
    }
}

/// Access-checked project operations.
#[derive(Clone)]
pub struct ProjectService {
    guard: AccessGuard,
    projects: Arc<dyn ProjectStore>,
    config: AccessConfig,
}

impl ProjectService {
    /// Create a project service.
    pub fn new(guard: AccessGuard, projects: Arc<dyn ProjectStore>, config: AccessConfig) -> Self {
        Self {
            guard,
            projects,
            config,
        }
    }

    async fn load(&self, project_id: Uuid) -> AccessResult<Project> {
        self.projects
            .find_project(project_id)
            .await?
            .ok_or_else(|| AccessError::NotFound(format!("project {}", project_id)))
    }

    /// Create a project owned by the caller.
    ///
    /// Returns the project and the caller's Admin membership.
    #[instrument(skip(self, new), fields(name = %new.name))]
    pub async fn create(&self, caller_id: Uuid, new: NewProject) -> AccessResult<(Project, Membership)> {
        if new.name.trim().is_empty() {
            return Err(AccessError::InvalidInput("project name must not be empty".to_string()));
        }

        let mut project = Project::new(new.name, caller_id);
        project.description = new.description;
        project.due_date = new.due_date;

        let owner = Membership::creator(project.id, caller_id)
            .with_status(self.config.active_status_label.clone());

        let (project, owner) = self.projects.create_project_with_owner(project, owner).await?;
        info!(project_id = %project.id, owner_id = %caller_id, "Project created");
        Ok((project, owner))
    }

    /// Fetch a project. The caller must own it or be an active member.
    #[instrument(skip(self))]
    pub async fn get(&self, caller_id: Uuid, project_id: Uuid) -> AccessResult<Project> {
        let project = self.load(project_id).await?;
        if project.owner_id != caller_id {
            self.guard.require_active_member(caller_id, project_id).await?;
        }
        Ok(project)
    }

    /// Change a project. Its id and owner cannot change.
    #[instrument(skip(self, apply))]
    pub async fn update<F>(&self, caller_id: Uuid, project_id: Uuid, apply: F) -> AccessResult<Project>
    where
        F: FnOnce(&mut Project) + Send,
    {
        let mut project = self.load(project_id).await?;
        self.guard
            .require_resource(caller_id, &project, OperationKind::Mutate)
            .await?;

        let (id, owner_id, created_at) = (project.id, project.owner_id, project.created_at);
        apply(&mut project);
        project.id = id;
        project.owner_id = owner_id;
        project.created_at = created_at;

        if project.name.trim().is_empty() {
            return Err(AccessError::InvalidInput("project name must not be empty".to_string()));
        }

        let updated = self.projects.update_project(project).await?;
        info!(project_id = %updated.id, "Project updated");
        Ok(updated)
    }

    /// Delete a project together with everything in it.
    #[instrument(skip(self))]
    pub async fn delete(&self, caller_id: Uuid, project_id: Uuid) -> AccessResult<()> {
        let project = self.load(project_id).await?;
        self.guard
            .require_resource(caller_id, &project, OperationKind::Mutate)
            .await?;

        self.projects.delete_project(project_id).await?;
        info!(project_id = %project_id, "Project deleted");
        Ok(())
    }

    /// Projects the caller owns or holds an active membership in.
    #[instrument(skip(self))]
    pub async fn list_visible(&self, caller_id: Uuid) -> AccessResult<Vec<Project>> {
        let joined: HashSet<Uuid> = self
            .guard
            .memberships()
            .find_active_memberships_by_user(caller_id)
            .await?
            .into_iter()
            .map(|m| m.project_id)
            .collect();

        Ok(self
            .projects
            .find_all_projects()
            .await?
            .into_iter()
            .filter(|p| p.owner_id == caller_id || joined.contains(&p.id))
            .collect())
    }
}
