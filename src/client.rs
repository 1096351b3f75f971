use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::config::Config;
use crate::error::{EnvoyerApiError, Result};
use crate::models::*;

// ---------------------------------------------------------------------------
// Internal response handling
// ---------------------------------------------------------------------------

/// Shared logic for building a configured [`Client`] and making requests.
struct BaseClient {
    base_url: String,
    http: Client,
}

impl BaseClient {
    fn new(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut auth = HeaderValue::from_str(&authorization_value(&config.api_key))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Build the full URL for a given endpoint.
    fn url(&self, endpoint: &str) -> String {
        format!("{}{endpoint}", self.base_url)
    }

    fn send(&self, method: &'static str, endpoint: &str, request: RequestBuilder) -> Result<Body> {
        debug!(method, endpoint, "sending request");
        let response = request.send()?;
        handle_response(response)
    }

    // ---- convenience wrappers for common HTTP verbs -----------------------

    fn get(&self, endpoint: &str) -> Result<Body> {
        self.send("GET", endpoint, self.http.get(self.url(endpoint)))
    }

    fn post<B: Serialize + ?Sized>(&self, endpoint: &str, body: &B) -> Result<Body> {
        self.send("POST", endpoint, self.http.post(self.url(endpoint)).json(body))
    }

    fn put<B: Serialize + ?Sized>(&self, endpoint: &str, body: &B) -> Result<Body> {
        self.send("PUT", endpoint, self.http.put(self.url(endpoint)).json(body))
    }

    fn delete(&self, endpoint: &str) -> Result<Body> {
        self.send("DELETE", endpoint, self.http.delete(self.url(endpoint)))
    }
}

/// Parsed response body; `None` for `204 No Content`.
type Body = Option<serde_json::Value>;

/// Envoyer tokens are bearer tokens; a value that already carries the scheme
/// is sent unchanged.
fn authorization_value(api_key: &str) -> String {
    if api_key.starts_with("Bearer ") {
        api_key.to_string()
    } else {
        format!("Bearer {api_key}")
    }
}

fn handle_response(response: Response) -> Result<Body> {
    let status = response.status().as_u16();

    if status == 204 {
        return Ok(None);
    }

    // Try to parse JSON body; fall back to empty object on failure.
    let data: serde_json::Value = response
        .json()
        .unwrap_or_else(|_| serde_json::Value::Object(serde_json::Map::new()));

    check_status(status, data).map(Some)
}

/// Map a status code and its body to either the body or an API error.
fn check_status(status: u16, data: serde_json::Value) -> Result<serde_json::Value> {
    if (200..300).contains(&status) {
        return Ok(data);
    }

    let msg = data
        .get("message")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();
    let or = |fallback: &str| {
        if msg.is_empty() {
            fallback.to_string()
        } else {
            msg.clone()
        }
    };

    Err(match status {
        401 => EnvoyerApiError::Authentication {
            message: or("Unauthenticated"),
        },
        403 => EnvoyerApiError::PermissionDenied {
            message: or("Permission denied"),
        },
        404 => EnvoyerApiError::NotFound {
            message: or("Not found"),
        },
        422 => EnvoyerApiError::Validation {
            message: or("Validation error"),
            errors: data.get("errors").cloned(),
        },
        _ => EnvoyerApiError::Api {
            status,
            message: or(&format!("HTTP {status}")),
        },
    })
}

/// Decode an envelope; an empty body decodes as an empty object so that
/// envelopes with defaulted fields still succeed.
fn decode<T: DeserializeOwned>(data: Body) -> Result<T> {
    let value = data.unwrap_or_else(|| serde_json::Value::Object(serde_json::Map::new()));
    Ok(serde_json::from_value(value)?)
}

// ---------------------------------------------------------------------------
// Public client
// ---------------------------------------------------------------------------

/// Authenticated, strict client for the Envoyer API.
///
/// Every call returns the raw [`Result`]; use [`Catalog`](crate::Catalog)
/// for the logging, degrade-to-empty flavour.
///
/// ```no_run
/// use envoyer_client::{Config, EnvoyerClient};
///
/// let client = EnvoyerClient::new(&Config::from_env().unwrap()).unwrap();
/// for p in client.projects().list().unwrap() {
///     println!("{}: {}", p.id, p.name);
/// }
/// ```
pub struct EnvoyerClient {
    base: BaseClient,
}

impl EnvoyerClient {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            base: BaseClient::new(config)?,
        })
    }

    // -- sub-client accessors ------------------------------------------------

    pub fn projects(&self) -> ProjectsClient<'_> {
        ProjectsClient { base: &self.base }
    }

    pub fn hooks(&self) -> HooksClient<'_> {
        HooksClient { base: &self.base }
    }

    pub fn collaborators(&self) -> CollaboratorsClient<'_> {
        CollaboratorsClient { base: &self.base }
    }

    pub fn servers(&self) -> ServersClient<'_> {
        ServersClient { base: &self.base }
    }

    pub fn deployments(&self) -> DeploymentsClient<'_> {
        DeploymentsClient { base: &self.base }
    }
}

// ===========================================================================
// Sub-clients
// ===========================================================================

// ---- Projects -------------------------------------------------------------

pub struct ProjectsClient<'a> {
    base: &'a BaseClient,
}

impl ProjectsClient<'_> {
    /// List every project visible to the credential.
    pub fn list(&self) -> Result<Vec<Project>> {
        let envelope: ProjectsEnvelope = decode(self.base.get("/projects")?)?;
        Ok(envelope.projects)
    }

    /// Create a project. `None` when the API accepted the request but did
    /// not echo the project back.
    pub fn create(&self, body: &NewProject) -> Result<Option<Project>> {
        let envelope: ProjectEnvelope = decode(self.base.post("/projects", body)?)?;
        Ok(envelope.project)
    }

    /// Change the deploy branch and push-to-deploy flag.
    pub fn update_source(&self, id: &ProjectId, body: &SourceUpdate) -> Result<()> {
        self.base.put(&format!("/projects/{id}/source"), body)?;
        Ok(())
    }

    pub fn delete(&self, id: &ProjectId) -> Result<()> {
        self.base.delete(&format!("/projects/{id}"))?;
        Ok(())
    }
}

// ---- Hooks ----------------------------------------------------------------

pub struct HooksClient<'a> {
    base: &'a BaseClient,
}

impl HooksClient<'_> {
    pub fn list(&self, project: &ProjectId) -> Result<Vec<Hook>> {
        let envelope: HooksEnvelope =
            decode(self.base.get(&format!("/projects/{project}/hooks"))?)?;
        Ok(envelope.hooks)
    }
}

// ---- Collaborators --------------------------------------------------------

pub struct CollaboratorsClient<'a> {
    base: &'a BaseClient,
}

impl CollaboratorsClient<'_> {
    pub fn list(&self, project: &ProjectId) -> Result<Vec<Collaborator>> {
        let envelope: CollaboratorsEnvelope =
            decode(self.base.get(&format!("/projects/{project}/collaborators"))?)?;
        Ok(envelope.collaborators)
    }

    /// Invite `email` to collaborate on a project.
    pub fn invite(&self, project: &ProjectId, email: &str) -> Result<()> {
        let body = NewCollaborator {
            email: email.to_string(),
        };
        self.base
            .post(&format!("/projects/{project}/collaborators"), &body)?;
        Ok(())
    }
}

// ---- Servers --------------------------------------------------------------

pub struct ServersClient<'a> {
    base: &'a BaseClient,
}

impl ServersClient<'_> {
    pub fn create(&self, project: &ProjectId, body: &NewServer) -> Result<()> {
        self.base.post(&format!("/projects/{project}/servers"), body)?;
        Ok(())
    }
}

// ---- Deployments ----------------------------------------------------------

pub struct DeploymentsClient<'a> {
    base: &'a BaseClient,
}

impl DeploymentsClient<'_> {
    /// Queue a deployment. Envoyer keeps no handle we need afterwards.
    pub fn create(&self, project: &ProjectId, body: &DeploymentRequest) -> Result<()> {
        self.base
            .post(&format!("/projects/{project}/deployments"), body)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bearer_scheme_is_added_once() {
        assert_eq!(authorization_value("abc"), "Bearer abc");
        assert_eq!(authorization_value("Bearer abc"), "Bearer abc");
    }

    #[test]
    fn success_statuses_pass_the_body_through() {
        let body = json!({"projects": []});
        assert_eq!(check_status(200, body.clone()).unwrap(), body);
        assert_eq!(check_status(201, body.clone()).unwrap(), body);
    }

    #[test]
    fn status_codes_map_to_error_variants() {
        assert!(matches!(
            check_status(401, json!({})),
            Err(EnvoyerApiError::Authentication { message }) if message == "Unauthenticated"
        ));
        assert!(matches!(
            check_status(403, json!({"message": "Nope"})),
            Err(EnvoyerApiError::PermissionDenied { message }) if message == "Nope"
        ));
        assert!(matches!(
            check_status(404, json!({})),
            Err(EnvoyerApiError::NotFound { .. })
        ));
        assert!(matches!(
            check_status(500, json!({})),
            Err(EnvoyerApiError::Api { status: 500, message }) if message == "HTTP 500"
        ));
    }

    #[test]
    fn validation_errors_keep_field_details() {
        let err = check_status(
            422,
            json!({"message": "The given data was invalid.", "errors": {"email": ["taken"]}}),
        )
        .unwrap_err();
        match err {
            EnvoyerApiError::Validation { message, errors } => {
                assert_eq!(message, "The given data was invalid.");
                assert_eq!(errors, Some(json!({"email": ["taken"]})));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_body_decodes_defaulted_envelopes() {
        let envelope: CollaboratorsEnvelope = decode(None).unwrap();
        assert!(envelope.collaborators.is_empty());
    }

    #[test]
    fn malformed_envelope_is_a_decode_error() {
        let result: Result<ProjectsEnvelope> = decode(Some(json!({"projects": "nope"})));
        assert!(matches!(result, Err(EnvoyerApiError::Decode(_))));
    }

    #[test]
    fn urls_join_without_double_slashes() {
        let client = EnvoyerClient::new(&Config::new("k").with_base_url("http://x/api/")).unwrap();
        assert_eq!(client.base.url("/projects"), "http://x/api/projects");
    }

    #[test]
    fn credential_with_newline_is_rejected() {
        let result = EnvoyerClient::new(&Config::new("abc\ndef"));
        assert!(matches!(result, Err(EnvoyerApiError::InvalidCredential(_))));
    }
}
