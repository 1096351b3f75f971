use thiserror::Error;

/// Error type for Envoyer API operations.
///
/// - `RequestFailed` — network/transport errors, including timeouts
/// - `Authentication` — HTTP 401
/// - `PermissionDenied` — HTTP 403
/// - `NotFound` — HTTP 404
/// - `Validation` — HTTP 422, carries optional field-level errors
/// - `Api` — any other non-2xx status code
/// - `Decode` — a 2xx body that does not match the expected envelope
#[derive(Debug, Error)]
pub enum EnvoyerApiError {
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Invalid credential header value: {0}")]
    InvalidCredential(#[from] reqwest::header::InvalidHeaderValue),

    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    #[error("Permission denied: {message}")]
    PermissionDenied { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        errors: Option<serde_json::Value>,
    },

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EnvoyerApiError>;

/// Fatal configuration problems, raised before any request is attempted.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing API credential: set {var}")]
    MissingCredential { var: &'static str },

    #[error("Invalid timeout {value:?}: expected a whole number of seconds")]
    InvalidTimeout { value: String },
}
