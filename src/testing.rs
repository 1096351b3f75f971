//! In-memory [`EnvoyerApi`] for exercising catalog and orchestration logic
//! without a network.
//!
//! ```
//! use envoyer_client::testing::{FakeApi, Operation};
//! use envoyer_client::Orchestrator;
//!
//! let api = FakeApi::with_projects([(1, "Alpha"), (2, "Beta")]);
//! let orchestrator = Orchestrator::new(&api);
//! let report = orchestrator.invite_to_matches("dev@example.com", "alp");
//! assert_eq!(report.succeeded(), 1);
//! assert_eq!(api.calls_to(Operation::InviteCollaborator).len(), 1);
//! ```

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

use crate::api::EnvoyerApi;
use crate::error::{EnvoyerApiError, Result};
use crate::models::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListProjects,
    CreateProject,
    UpdateSource,
    DeleteProject,
    ListHooks,
    ListCollaborators,
    InviteCollaborator,
    AddServer,
    CreateDeployment,
}

/// One recorded call: the operation, the project it targeted (if any) and
/// the interesting part of its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub operation: Operation,
    pub project: Option<ProjectId>,
    pub detail: Option<String>,
}

#[derive(Default)]
pub struct FakeApi {
    projects: RefCell<Vec<Project>>,
    hooks: RefCell<HashMap<ProjectId, Vec<Hook>>>,
    collaborators: RefCell<HashMap<ProjectId, Vec<Collaborator>>>,
    calls: RefCell<Vec<Call>>,
    failures: RefCell<HashSet<(Operation, Option<ProjectId>)>>,
    next_id: Cell<u64>,
    omit_created_project: Cell<bool>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_projects<I, N>(projects: I) -> Self
    where
        I: IntoIterator<Item = (u64, N)>,
        N: Into<String>,
    {
        let fake = Self::new();
        for (id, name) in projects {
            fake.add_project(Project::new(id, name));
        }
        fake
    }

    pub fn add_project(&self, project: Project) {
        if let Ok(n) = project.id.as_str().parse::<u64>() {
            self.next_id.set(self.next_id.get().max(n));
        }
        self.projects.borrow_mut().push(project);
    }

    pub fn add_hook(&self, project: impl Into<ProjectId>, hook: Hook) {
        self.hooks
            .borrow_mut()
            .entry(project.into())
            .or_default()
            .push(hook);
    }

    pub fn add_collaborator(&self, project: impl Into<ProjectId>, email: &str) {
        self.collaborators
            .borrow_mut()
            .entry(project.into())
            .or_default()
            .push(collaborator(email));
    }

    /// Make `operation` fail for every project.
    pub fn fail(self, operation: Operation) -> Self {
        self.failures.borrow_mut().insert((operation, None));
        self
    }

    /// Make `operation` fail only when it targets `project`.
    pub fn fail_for(self, operation: Operation, project: impl Into<ProjectId>) -> Self {
        self.failures
            .borrow_mut()
            .insert((operation, Some(project.into())));
        self
    }

    /// Accept project creation but leave `project` out of the response.
    pub fn omit_created_project(self) -> Self {
        self.omit_created_project.set(true);
        self
    }

    pub fn projects(&self) -> Vec<Project> {
        self.projects.borrow().clone()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    /// Projects targeted by `operation`, in call order.
    pub fn calls_to(&self, operation: Operation) -> Vec<ProjectId> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.operation == operation)
            .filter_map(|c| c.project.clone())
            .collect()
    }

    pub fn count(&self, operation: Operation) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.operation == operation)
            .count()
    }

    fn record(
        &self,
        operation: Operation,
        project: Option<&ProjectId>,
        detail: Option<String>,
    ) -> Result<()> {
        self.calls.borrow_mut().push(Call {
            operation,
            project: project.cloned(),
            detail,
        });

        let failures = self.failures.borrow();
        if failures.contains(&(operation, None))
            || failures.contains(&(operation, project.cloned()))
        {
            return Err(EnvoyerApiError::Api {
                status: 500,
                message: format!("{operation:?} failed"),
            });
        }
        Ok(())
    }
}

fn collaborator(email: &str) -> Collaborator {
    Collaborator {
        email: email.to_string(),
        id: None,
        name: None,
    }
}

impl EnvoyerApi for FakeApi {
    fn list_projects(&self) -> Result<Vec<Project>> {
        self.record(Operation::ListProjects, None, None)?;
        Ok(self.projects())
    }

    fn create_project(&self, body: &NewProject) -> Result<Option<Project>> {
        self.record(Operation::CreateProject, None, Some(body.name.clone()))?;
        let id = self.next_id.get() + 1;
        self.next_id.set(id);

        let mut project = Project::new(id, body.name.clone());
        project.repository = Some(body.repository.clone());
        project.provider = Some(body.provider.clone());
        project.project_type = Some(body.project_type.clone());
        self.projects.borrow_mut().push(project.clone());

        if self.omit_created_project.get() {
            Ok(None)
        } else {
            Ok(Some(project))
        }
    }

    fn update_source(&self, project: &ProjectId, body: &SourceUpdate) -> Result<()> {
        self.record(Operation::UpdateSource, Some(project), Some(body.branch.clone()))?;
        if let Some(p) = self
            .projects
            .borrow_mut()
            .iter_mut()
            .find(|p| &p.id == project)
        {
            p.branch = Some(body.branch.clone());
        }
        Ok(())
    }

    fn delete_project(&self, project: &ProjectId) -> Result<()> {
        self.record(Operation::DeleteProject, Some(project), None)?;
        self.projects.borrow_mut().retain(|p| &p.id != project);
        Ok(())
    }

    fn list_hooks(&self, project: &ProjectId) -> Result<Vec<Hook>> {
        self.record(Operation::ListHooks, Some(project), None)?;
        Ok(self.hooks.borrow().get(project).cloned().unwrap_or_default())
    }

    fn list_collaborators(&self, project: &ProjectId) -> Result<Vec<Collaborator>> {
        self.record(Operation::ListCollaborators, Some(project), None)?;
        Ok(self
            .collaborators
            .borrow()
            .get(project)
            .cloned()
            .unwrap_or_default())
    }

    fn invite_collaborator(&self, project: &ProjectId, email: &str) -> Result<()> {
        self.record(
            Operation::InviteCollaborator,
            Some(project),
            Some(email.to_string()),
        )?;
        self.add_collaborator(project.clone(), email);
        Ok(())
    }

    fn add_server(&self, project: &ProjectId, body: &NewServer) -> Result<()> {
        self.record(Operation::AddServer, Some(project), Some(body.host.clone()))
    }

    fn create_deployment(&self, project: &ProjectId, body: &DeploymentRequest) -> Result<()> {
        self.record(
            Operation::CreateDeployment,
            Some(project),
            Some(body.branch.clone()),
        )
    }
}
