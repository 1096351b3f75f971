//! Search-then-act scenarios through the public API, backed by the
//! in-memory fake.

use pretty_assertions::assert_eq;
use std::collections::BTreeMap;

use envoyer_client::testing::{FakeApi, Operation};
use envoyer_client::{Catalog, ConfirmedAction, Orchestrator, ProjectId, DEFAULT_BRANCH};

fn alpha_alphabet_beta() -> FakeApi {
    FakeApi::with_projects([(1, "Alpha"), (2, "Alphabet"), (3, "Beta")])
}

fn ids(raw: &[&str]) -> Vec<ProjectId> {
    raw.iter().map(|id| ProjectId::new(*id)).collect()
}

#[test]
fn alpha_scenario_resolves_and_deploys_two_projects() {
    let api = alpha_alphabet_beta();
    let orchestrator = Orchestrator::new(&api);

    let expected: BTreeMap<String, String> = [("Alpha", "1"), ("Alphabet", "2")]
        .into_iter()
        .map(|(n, i)| (n.to_string(), i.to_string()))
        .collect();
    assert_eq!(orchestrator.resolve_matches("alpha").to_map(), expected);

    let result = orchestrator.deploy_matches("alpha", DEFAULT_BRANCH, |_| true);
    assert_eq!(api.calls_to(Operation::CreateDeployment), ids(&["1", "2"]));
    assert!(result.report().unwrap().all_succeeded());
}

#[test]
fn listing_envelope_round_trip_matches_any_case() {
    let project: envoyer_client::Project =
        serde_json::from_value(serde_json::json!({"id": 7, "name": "Foo"})).unwrap();
    assert_eq!(project.id, ProjectId::new("7"));
    assert_eq!(project.name, "Foo");

    let api = FakeApi::new();
    api.add_project(project);
    let orchestrator = Orchestrator::new(&api);
    for term in ["foo", "FOO", "Foo", "fO"] {
        assert_eq!(orchestrator.resolve_matches(term).len(), 1, "{term}");
    }
}

#[test]
fn invite_call_count_equals_match_count_under_failure() {
    let api = alpha_alphabet_beta()
        .fail_for(Operation::InviteCollaborator, ProjectId::new("1"))
        .fail_for(Operation::InviteCollaborator, ProjectId::new("3"));
    let report = Orchestrator::new(&api).invite_to_matches("dev@example.com", "");

    assert_eq!(api.count(Operation::InviteCollaborator), 3);
    assert_eq!(report.items.len(), 3);
    assert_eq!(report.failed(), 2);
}

#[test]
fn delete_declined_then_affirmed() {
    let api = alpha_alphabet_beta();
    let orchestrator = Orchestrator::new(&api);

    let declined = orchestrator.delete_matches("alpha", |_| false);
    assert!(matches!(declined, ConfirmedAction::Cancelled { .. }));
    assert_eq!(api.count(Operation::DeleteProject), 0);

    let affirmed = orchestrator.delete_matches("alpha", |_| true);
    assert_eq!(affirmed.report().unwrap().items.len(), 2);
    assert_eq!(api.calls_to(Operation::DeleteProject), ids(&["1", "2"]));

    // The listing is re-fetched, so the deleted projects are gone.
    assert_eq!(
        orchestrator.delete_matches("alpha", |_| true),
        ConfirmedAction::NothingToDo
    );
}

#[test]
fn create_project_reports_only_the_failed_step() {
    let api = FakeApi::new().fail(Operation::UpdateSource);
    let created = Catalog::new(&api).create_project("Shop", "acme/shop", None);

    assert_eq!(created.id, Some(ProjectId::new("1")));
    assert!(created.creation.is_success());
    assert!(!created.source_update.unwrap().is_success());
}
