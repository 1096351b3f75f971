//! Envoyer API client library for Rust.
//!
//! A Rust client for the [Envoyer](https://envoyer.io) deployment API. On
//! top of the raw HTTP calls it offers a "search-then-act" layer: resolve a
//! search term to every project whose name contains it, then invite,
//! deploy, delete or list collaborators across that set with a per-project
//! report.
//!
//! # Quick Start
//!
//! ```no_run
//! use envoyer_client::{Config, EnvoyerClient, Orchestrator};
//!
//! let config = Config::from_env().unwrap();
//! let orchestrator = Orchestrator::new(EnvoyerClient::new(&config).unwrap());
//!
//! let report = orchestrator.invite_to_matches("dev@example.com", "shop");
//! for item in &report.items {
//!     println!("{}: {}", item.project.name, item.outcome);
//! }
//! ```

pub mod api;
pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod report;
pub mod testing;

// Re-export the main public types at the crate root for convenience.
pub use api::EnvoyerApi;
pub use catalog::Catalog;
pub use client::{
    CollaboratorsClient, DeploymentsClient, EnvoyerClient, HooksClient, ProjectsClient,
    ServersClient,
};
pub use config::Config;
pub use error::{ConfigError, EnvoyerApiError};
pub use models::{
    Collaborator, DeploymentRequest, Hook, NewProject, NewServer, Project, ProjectId,
    ResourceId, SourceUpdate, DEFAULT_BRANCH, DEFAULT_HEALTH_CHECK_URL,
};
pub use orchestrator::{filter_matches, name_matches, Orchestrator};
pub use report::{
    CollaboratorListing, ConfirmedAction, CreatedProject, FanOutReport, ItemOutcome, Match,
    MatchSet, Outcome,
};
