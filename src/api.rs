use crate::client::EnvoyerClient;
use crate::error::Result;
use crate::models::*;

/// The primitive remote operations [`Catalog`](crate::Catalog) is built on.
///
/// Implemented by [`EnvoyerClient`]; tests substitute an in-memory fake.
pub trait EnvoyerApi {
    fn list_projects(&self) -> Result<Vec<Project>>;

    fn create_project(&self, body: &NewProject) -> Result<Option<Project>>;

    fn update_source(&self, project: &ProjectId, body: &SourceUpdate) -> Result<()>;

    fn delete_project(&self, project: &ProjectId) -> Result<()>;

    fn list_hooks(&self, project: &ProjectId) -> Result<Vec<Hook>>;

    fn list_collaborators(&self, project: &ProjectId) -> Result<Vec<Collaborator>>;

    fn invite_collaborator(&self, project: &ProjectId, email: &str) -> Result<()>;

    fn add_server(&self, project: &ProjectId, body: &NewServer) -> Result<()>;

    fn create_deployment(&self, project: &ProjectId, body: &DeploymentRequest) -> Result<()>;
}

impl EnvoyerApi for EnvoyerClient {
    fn list_projects(&self) -> Result<Vec<Project>> {
        self.projects().list()
    }

    fn create_project(&self, body: &NewProject) -> Result<Option<Project>> {
        self.projects().create(body)
    }

    fn update_source(&self, project: &ProjectId, body: &SourceUpdate) -> Result<()> {
        self.projects().update_source(project, body)
    }

    fn delete_project(&self, project: &ProjectId) -> Result<()> {
        self.projects().delete(project)
    }

    fn list_hooks(&self, project: &ProjectId) -> Result<Vec<Hook>> {
        self.hooks().list(project)
    }

    fn list_collaborators(&self, project: &ProjectId) -> Result<Vec<Collaborator>> {
        self.collaborators().list(project)
    }

    fn invite_collaborator(&self, project: &ProjectId, email: &str) -> Result<()> {
        self.collaborators().invite(project, email)
    }

    fn add_server(&self, project: &ProjectId, body: &NewServer) -> Result<()> {
        self.servers().create(project, body)
    }

    fn create_deployment(&self, project: &ProjectId, body: &DeploymentRequest) -> Result<()> {
        self.deployments().create(project, body)
    }
}

impl<A: EnvoyerApi + ?Sized> EnvoyerApi for &A {
    fn list_projects(&self) -> Result<Vec<Project>> {
        (**self).list_projects()
    }

    fn create_project(&self, body: &NewProject) -> Result<Option<Project>> {
        (**self).create_project(body)
    }

    fn update_source(&self, project: &ProjectId, body: &SourceUpdate) -> Result<()> {
        (**self).update_source(project, body)
    }

    fn delete_project(&self, project: &ProjectId) -> Result<()> {
        (**self).delete_project(project)
    }

    fn list_hooks(&self, project: &ProjectId) -> Result<Vec<Hook>> {
        (**self).list_hooks(project)
    }

    fn list_collaborators(&self, project: &ProjectId) -> Result<Vec<Collaborator>> {
        (**self).list_collaborators(project)
    }

    fn invite_collaborator(&self, project: &ProjectId, email: &str) -> Result<()> {
        (**self).invite_collaborator(project, email)
    }

    fn add_server(&self, project: &ProjectId, body: &NewServer) -> Result<()> {
        (**self).add_server(project, body)
    }

    fn create_deployment(&self, project: &ProjectId, body: &DeploymentRequest) -> Result<()> {
        (**self).create_deployment(project, body)
    }
}
