//! Live, read-only tests against the Envoyer API.
//!
//! Skipped unless `ENVOYER_API_KEY` (or `API_KEY`) is set. Nothing here
//! creates, deploys or deletes anything.
//!
//! Run with:
//!
//! ```bash
//! ENVOYER_API_KEY=... cargo test --test integration -- --nocapture
//! ```

use envoyer_client::{Catalog, Config, EnvoyerApiError, EnvoyerClient, Orchestrator};

fn live_client() -> Option<EnvoyerClient> {
    match Config::from_env() {
        Ok(config) => Some(EnvoyerClient::new(&config).unwrap()),
        Err(_) => {
            println!("Skipping live tests (no credentials)");
            None
        }
    }
}

#[test]
fn test_list_projects() {
    let Some(client) = live_client() else { return };
    let projects = client.projects().list().unwrap();
    println!("[1] Found {} projects", projects.len());
    for p in projects.iter().take(3) {
        println!("  - {} ({})", p.name, p.id);
    }
}

#[test]
fn test_search_is_subset_of_listing() {
    let Some(client) = live_client() else { return };
    let all = client.projects().list().unwrap();
    let Some(first) = all.first() else {
        println!("[2] No projects; nothing to search");
        return;
    };

    let term = first.name.split_whitespace().next().unwrap_or(&first.name);
    let orchestrator = Orchestrator::new(&client);
    let matches = orchestrator.resolve_matches(&term.to_uppercase());
    println!("[2] Search for '{term}' matched {}", matches.len());
    assert!(matches.ids().any(|id| id == &first.id));
    assert!(matches.len() <= all.len());
}

#[test]
fn test_hooks_and_collaborators_of_first_project() {
    let Some(client) = live_client() else { return };
    let catalog = Catalog::new(&client);
    let Some(first) = catalog.list_projects().into_iter().next() else {
        return;
    };

    let hooks = catalog.try_list_hooks(&first.id).unwrap();
    let collaborators = catalog.try_list_collaborators(&first.id).unwrap();
    println!(
        "[3] Project '{}' has {} hooks and {} collaborators",
        first.name,
        hooks.len(),
        collaborators.len()
    );
}

#[test]
fn test_bad_credential_is_rejected() {
    if live_client().is_none() {
        return;
    }
    let base = Config::from_env().unwrap();
    let client = EnvoyerClient::new(&Config::new("not-a-real-token").with_base_url(base.base_url))
        .unwrap();
    match client.projects().list() {
        Err(EnvoyerApiError::Authentication { message }) => {
            println!("[4] Rejected as expected: {message}")
        }
        other => panic!("expected an authentication error, got {other:?}"),
    }
}
