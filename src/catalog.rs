use tracing::{info, warn};

use crate::api::EnvoyerApi;
use crate::error::Result;
use crate::models::*;
use crate::report::{CreatedProject, Outcome};

/// Envoyer operations with the degrade-and-report policy applied.
///
/// Nothing here returns an error: listings degrade to empty vectors and
/// writes return an [`Outcome`]. Every failure is also logged with
/// `tracing::warn!`. The `try_*` methods expose the strict result for
/// callers that must tell "empty" apart from "failed".
pub struct Catalog<A> {
    api: A,
}

impl<A: EnvoyerApi> Catalog<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    // -- listings -------------------------------------------------------------

    pub fn try_list_projects(&self) -> Result<Vec<Project>> {
        self.api.list_projects()
    }

    pub fn list_projects(&self) -> Vec<Project> {
        self.try_list_projects().unwrap_or_else(|e| {
            warn!(error = %e, "listing projects failed");
            Vec::new()
        })
    }

    pub fn try_list_hooks(&self, project: &ProjectId) -> Result<Vec<Hook>> {
        self.api.list_hooks(project)
    }

    pub fn list_hooks(&self, project: &ProjectId) -> Vec<Hook> {
        self.try_list_hooks(project).unwrap_or_else(|e| {
            warn!(%project, error = %e, "listing hooks failed");
            Vec::new()
        })
    }

    pub fn try_list_collaborators(&self, project: &ProjectId) -> Result<Vec<Collaborator>> {
        self.api.list_collaborators(project)
    }

    pub fn list_collaborators(&self, project: &ProjectId) -> Vec<Collaborator> {
        self.try_list_collaborators(project).unwrap_or_else(|e| {
            warn!(%project, error = %e, "listing collaborators failed");
            Vec::new()
        })
    }

    // -- writes ---------------------------------------------------------------

    /// Create a GitHub Laravel project, then pin its source to the default
    /// branch with push-to-deploy.
    ///
    /// The two steps are not atomic: when the source update fails the
    /// project stays created and its id is still returned.
    pub fn create_project(
        &self,
        name: &str,
        repository: &str,
        health_check_url: Option<&str>,
    ) -> CreatedProject {
        let body = NewProject::laravel(
            name,
            repository,
            health_check_url.unwrap_or(DEFAULT_HEALTH_CHECK_URL),
        );

        let project = match self.api.create_project(&body) {
            Ok(Some(project)) => project,
            Ok(None) => {
                warn!(project_name = name, "project created but not returned by Envoyer");
                return CreatedProject {
                    id: None,
                    creation: Outcome::failed(format!(
                        "Created '{name}' but Envoyer returned no project data"
                    )),
                    source_update: None,
                };
            }
            Err(e) => {
                warn!(project_name = name, error = %e, "project creation failed");
                return CreatedProject {
                    id: None,
                    creation: Outcome::failed(format!("Project creation failed: {e}")),
                    source_update: None,
                };
            }
        };
        info!(project_name = name, id = %project.id, "project created");

        let source = SourceUpdate::default();
        let source_update = match self.api.update_source(&project.id, &source) {
            Ok(()) => Outcome::succeeded(format!(
                "Set branch to '{}' and enabled push-to-deploy",
                source.branch
            )),
            Err(e) => {
                warn!(id = %project.id, error = %e, "source update failed");
                Outcome::failed(format!(
                    "Failed to set branch to '{}' or enable push-to-deploy: {e}",
                    source.branch
                ))
            }
        };

        CreatedProject {
            creation: Outcome::succeeded(format!("Created '{name}' as project {}", project.id)),
            id: Some(project.id),
            source_update: Some(source_update),
        }
    }

    /// Register `hostname` as a deployment target of a project.
    pub fn add_server(&self, hostname: &str, project: &ProjectId) -> Outcome {
        match self.api.add_server(project, &NewServer::for_host(hostname)) {
            Ok(()) => {
                info!(hostname, %project, "server added");
                Outcome::succeeded(format!("Added server '{hostname}' to project {project}"))
            }
            Err(e) => {
                warn!(hostname, %project, error = %e, "adding server failed");
                Outcome::failed(format!(
                    "Error adding server '{hostname}' to project {project}: {e}"
                ))
            }
        }
    }

    pub fn invite_collaborator(&self, email: &str, project: &ProjectId) -> Outcome {
        match self.api.invite_collaborator(project, email) {
            Ok(()) => {
                info!(email, %project, "collaborator invited");
                Outcome::succeeded(format!("Invited {email} to project {project}"))
            }
            Err(e) => {
                warn!(email, %project, error = %e, "invite failed");
                Outcome::failed(format!("Failed to invite {email} to project {project}: {e}"))
            }
        }
    }

    pub fn delete_project(&self, project: &ProjectId) -> Outcome {
        match self.api.delete_project(project) {
            Ok(()) => {
                info!(%project, "project deleted");
                Outcome::succeeded(format!("Deleted project {project}"))
            }
            Err(e) => {
                warn!(%project, error = %e, "delete failed");
                Outcome::failed(format!("Failed to delete project {project}: {e}"))
            }
        }
    }

    /// Queue a deployment of `branch`.
    pub fn deploy_project(&self, project: &ProjectId, branch: &str) -> Outcome {
        match self
            .api
            .create_deployment(project, &DeploymentRequest::from_branch(branch))
        {
            Ok(()) => {
                info!(%project, branch, "deployment queued");
                Outcome::succeeded(format!("Deployed project {project} from '{branch}'"))
            }
            Err(e) => {
                warn!(%project, branch, error = %e, "deployment failed");
                Outcome::failed(format!("Deployment failed for project {project}: {e}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeApi, Operation};
    use pretty_assertions::assert_eq;

    fn id(n: u64) -> ProjectId {
        ProjectId::from(n)
    }

    #[test]
    fn listing_failure_degrades_to_empty() {
        let api = FakeApi::with_projects([(1, "Alpha")]).fail(Operation::ListProjects);
        let catalog = Catalog::new(&api);
        assert!(catalog.list_projects().is_empty());
        assert!(catalog.try_list_projects().is_err());
    }

    #[test]
    fn hooks_and_collaborators_degrade_to_empty() {
        let api = FakeApi::with_projects([(1, "Alpha")])
            .fail(Operation::ListHooks)
            .fail(Operation::ListCollaborators);
        api.add_collaborator(id(1), "a@example.com");
        let catalog = Catalog::new(&api);
        assert!(catalog.list_hooks(&id(1)).is_empty());
        assert!(catalog.list_collaborators(&id(1)).is_empty());
    }

    #[test]
    fn hooks_are_listed_per_project() {
        let api = FakeApi::with_projects([(1, "Alpha"), (2, "Beta")]);
        api.add_hook(
            id(1),
            Hook {
                id: ResourceId::from(7u64),
                name: "Migrate".to_string(),
                run: Some("php artisan migrate".to_string()),
                sequence: Some(1),
                timing: Some("after".to_string()),
                action_id: Some(3),
            },
        );
        let catalog = Catalog::new(&api);

        let hooks = catalog.list_hooks(&id(1));
        assert_eq!(hooks.len(), 1);
        assert_eq!(hooks[0].name, "Migrate");
        assert!(catalog.list_hooks(&id(2)).is_empty());
    }

    #[test]
    fn create_project_runs_both_steps() {
        let api = FakeApi::with_projects([(4, "Existing")]);
        let catalog = Catalog::new(&api);

        let created = catalog.create_project("Shop", "acme/shop", None);

        assert_eq!(created.id, Some(id(5)));
        assert!(created.fully_configured());
        assert_eq!(api.calls_to(Operation::UpdateSource), vec![id(5)]);
        let stored = api.projects().into_iter().find(|p| p.name == "Shop").unwrap();
        assert_eq!(stored.branch.as_deref(), Some(DEFAULT_BRANCH));
    }

    #[test]
    fn failed_source_update_keeps_the_created_id() {
        let api = FakeApi::new().fail(Operation::UpdateSource);
        let catalog = Catalog::new(&api);

        let created = catalog.create_project("Shop", "acme/shop", Some("https://shop.test"));

        assert_eq!(created.id, Some(id(1)));
        assert!(created.creation.is_success());
        assert!(!created.source_update.as_ref().unwrap().is_success());
        assert!(!created.fully_configured());
        // No compensating delete.
        assert_eq!(api.count(Operation::DeleteProject), 0);
        assert_eq!(api.projects().len(), 1);
    }

    #[test]
    fn failed_creation_skips_the_source_update() {
        let api = FakeApi::new().fail(Operation::CreateProject);
        let created = Catalog::new(&api).create_project("Shop", "acme/shop", None);

        assert_eq!(created.id, None);
        assert!(!created.creation.is_success());
        assert_eq!(created.source_update, None);
        assert_eq!(api.count(Operation::UpdateSource), 0);
    }

    #[test]
    fn missing_project_in_creation_response_is_reported() {
        let api = FakeApi::new().omit_created_project();
        let created = Catalog::new(&api).create_project("Shop", "acme/shop", None);

        assert_eq!(created.id, None);
        assert!(!created.creation.is_success());
        assert_eq!(api.count(Operation::UpdateSource), 0);
    }

    #[test]
    fn writes_report_outcomes() {
        let api = FakeApi::with_projects([(1, "Alpha"), (2, "Beta")])
            .fail_for(Operation::CreateDeployment, id(2));
        let catalog = Catalog::new(&api);

        assert!(catalog.deploy_project(&id(1), DEFAULT_BRANCH).is_success());
        assert!(!catalog.deploy_project(&id(2), DEFAULT_BRANCH).is_success());
        assert!(catalog.add_server("web-1.example.com", &id(1)).is_success());
        assert!(catalog.invite_collaborator("a@example.com", &id(1)).is_success());
        assert!(catalog.delete_project(&id(2)).is_success());

        let server_call = api
            .calls()
            .into_iter()
            .find(|c| c.operation == Operation::AddServer)
            .unwrap();
        assert_eq!(server_call.detail.as_deref(), Some("web-1.example.com"));
    }
}
