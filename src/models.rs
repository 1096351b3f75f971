use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Branch used for deployments and push-to-deploy when none is given.
pub const DEFAULT_BRANCH: &str = "main";

/// Monitor URL sent with new projects when the caller supplies none.
pub const DEFAULT_HEALTH_CHECK_URL: &str = "https://my-laravel-project.com";

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Opaque identifier of a remote resource.
///
/// Envoyer emits ids as JSON integers in some responses and as strings in
/// others; both forms decode to the same value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ResourceId(String);

/// The only stable key of a project. Names are not unique.
pub type ProjectId = ResourceId;

impl ResourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ResourceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for ResourceId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for ResourceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Int(n) => ResourceId(n.to_string()),
            Raw::Text(s) => ResourceId(s),
        })
    }
}

// ---------------------------------------------------------------------------
// Listing envelopes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ProjectsEnvelope {
    #[serde(default)]
    pub projects: Vec<Project>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ProjectEnvelope {
    #[serde(default)]
    pub project: Option<Project>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct HooksEnvelope {
    #[serde(default)]
    pub hooks: Vec<Hook>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CollaboratorsEnvelope {
    #[serde(default)]
    pub collaborators: Vec<Collaborator>,
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub repository: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default, rename = "type")]
    pub project_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub last_deployed_at: Option<String>,
}

impl Project {
    /// Bare project with only the fields used for searching.
    pub fn new(id: impl Into<ProjectId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            provider: None,
            repository: None,
            branch: None,
            project_type: None,
            status: None,
            last_deployed_at: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collaborator {
    pub email: String,
    #[serde(default)]
    pub id: Option<ResourceId>,
    #[serde(default)]
    pub name: Option<String>,
}

// ---------------------------------------------------------------------------
// Hooks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hook {
    pub id: ResourceId,
    pub name: String,
    #[serde(default)]
    pub run: Option<String>,
    #[serde(default)]
    pub sequence: Option<i64>,
    #[serde(default)]
    pub timing: Option<String>,
    #[serde(default)]
    pub action_id: Option<i64>,
}

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// Body for `POST /projects`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewProject {
    pub name: String,
    pub provider: String,
    pub repository: String,
    #[serde(rename = "type")]
    pub project_type: String,
    pub retain_deployments: u32,
    pub monitor: String,
    pub composer: bool,
    pub composer_dev: bool,
    pub composer_quiet: bool,
}

impl NewProject {
    /// A GitHub-hosted Laravel project keeping five deployments.
    pub fn laravel(name: &str, repository: &str, health_check_url: &str) -> Self {
        Self {
            name: name.to_string(),
            provider: "github".into(),
            repository: repository.to_string(),
            project_type: "laravel-5".into(),
            retain_deployments: 5,
            monitor: health_check_url.to_string(),
            composer: true,
            composer_dev: true,
            composer_quiet: false,
        }
    }
}

/// Body for `PUT /projects/{id}/source`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceUpdate {
    pub branch: String,
    pub push_to_deploy: bool,
}

impl Default for SourceUpdate {
    fn default() -> Self {
        Self {
            branch: DEFAULT_BRANCH.into(),
            push_to_deploy: true,
        }
    }
}

/// Body for `POST /projects/{id}/servers`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewServer {
    pub name: String,
    pub connect_as: String,
    pub host: String,
    pub port: u16,
    pub php_version: String,
    pub deployment_path: String,
    pub composer_path: String,
    pub receives_code_deployments: bool,
    pub restart_fpm: bool,
}

impl NewServer {
    /// The fixed server shape: `ubuntu@hostname:22`, PHP 8.0, deploying
    /// into `/srv/application/`.
    pub fn for_host(hostname: &str) -> Self {
        Self {
            name: hostname.to_string(),
            connect_as: "ubuntu".into(),
            host: hostname.to_string(),
            port: 22,
            php_version: "php80".into(),
            deployment_path: "/srv/application/".into(),
            composer_path: "composer".into(),
            receives_code_deployments: true,
            restart_fpm: true,
        }
    }
}

/// Body for `POST /projects/{id}/collaborators`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewCollaborator {
    pub email: String,
}

/// Body for `POST /projects/{id}/deployments`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeploymentRequest {
    pub from: String,
    pub branch: String,
}

impl DeploymentRequest {
    pub fn from_branch(branch: &str) -> Self {
        Self {
            from: "branch".into(),
            branch: branch.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn project_id_accepts_integers_and_strings() {
        let from_int: ProjectId = serde_json::from_value(json!(7)).unwrap();
        let from_str: ProjectId = serde_json::from_value(json!("7")).unwrap();
        assert_eq!(from_int, from_str);
        assert_eq!(from_int.to_string(), "7");
    }

    #[test]
    fn projects_envelope_yields_projects() {
        let env: ProjectsEnvelope =
            serde_json::from_value(json!({"projects": [{"id": 7, "name": "Foo"}]})).unwrap();
        assert_eq!(env.projects, vec![Project::new("7", "Foo")]);
    }

    #[test]
    fn missing_array_field_is_empty() {
        let env: HooksEnvelope = serde_json::from_value(json!({})).unwrap();
        assert!(env.hooks.is_empty());
    }

    #[test]
    fn project_keeps_optional_details() {
        let env: ProjectEnvelope = serde_json::from_value(json!({
            "project": {
                "id": 12,
                "name": "Shop",
                "type": "laravel-5",
                "branch": "main",
                "repository": "acme/shop"
            }
        }))
        .unwrap();
        let project = env.project.unwrap();
        assert_eq!(project.project_type.as_deref(), Some("laravel-5"));
        assert_eq!(project.branch.as_deref(), Some("main"));
    }

    #[test]
    fn server_body_uses_camel_case_wire_names() {
        let body = serde_json::to_value(NewServer::for_host("web-1.example.com")).unwrap();
        assert_eq!(
            body,
            json!({
                "name": "web-1.example.com",
                "connectAs": "ubuntu",
                "host": "web-1.example.com",
                "port": 22,
                "phpVersion": "php80",
                "deploymentPath": "/srv/application/",
                "composerPath": "composer",
                "receivesCodeDeployments": true,
                "restartFpm": true
            })
        );
    }

    #[test]
    fn project_body_carries_fixed_defaults() {
        let body = serde_json::to_value(NewProject::laravel(
            "shop",
            "acme/shop",
            DEFAULT_HEALTH_CHECK_URL,
        ))
        .unwrap();
        assert_eq!(body["provider"], "github");
        assert_eq!(body["type"], "laravel-5");
        assert_eq!(body["retain_deployments"], 5);
        assert_eq!(body["monitor"], DEFAULT_HEALTH_CHECK_URL);
        assert_eq!(body["composer_quiet"], false);
    }

    #[test]
    fn deployment_body_is_from_branch() {
        let body = serde_json::to_value(DeploymentRequest::from_branch(DEFAULT_BRANCH)).unwrap();
        assert_eq!(body, json!({"from": "branch", "branch": "main"}));
    }
}
