use tracing::{debug, info, warn};

use crate::api::EnvoyerApi;
use crate::catalog::Catalog;
use crate::error::Result;
use crate::models::Project;
use crate::report::{CollaboratorListing, ConfirmedAction, FanOutReport, Match, MatchSet, Outcome};

/// Whether `name` contains `term`, ignoring case. An empty term matches
/// every name.
pub fn name_matches(name: &str, term: &str) -> bool {
    name.to_lowercase().contains(&term.to_lowercase())
}

/// The projects whose name contains `term`, in listing order.
pub fn filter_matches(projects: &[Project], term: &str) -> MatchSet {
    projects
        .iter()
        .filter(|p| name_matches(&p.name, term))
        .map(Match::from)
        .collect()
}

/// Search-then-act on top of a [`Catalog`].
///
/// Every method re-fetches the project list, filters it by name and applies
/// one call per match. A failing match never stops the others; each one
/// gets its own entry in the returned report.
pub struct Orchestrator<A> {
    catalog: Catalog<A>,
}

impl<A: EnvoyerApi> Orchestrator<A> {
    pub fn new(api: A) -> Self {
        Self::from_catalog(Catalog::new(api))
    }

    pub fn from_catalog(catalog: Catalog<A>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Catalog<A> {
        &self.catalog
    }

    /// Projects whose name contains `term` case-insensitively.
    ///
    /// An empty set means there is nothing to do. A failed listing also
    /// yields an empty set (it is logged by the catalog); use
    /// [`try_resolve_matches`](Self::try_resolve_matches) to tell the two apart.
    pub fn resolve_matches(&self, term: &str) -> MatchSet {
        let matches = filter_matches(&self.catalog.list_projects(), term);
        debug!(term, matches = matches.len(), "resolved search term");
        matches
    }

    /// Like [`resolve_matches`](Self::resolve_matches), but a failed listing
    /// is returned instead of being read as "no match".
    pub fn try_resolve_matches(&self, term: &str) -> Result<MatchSet> {
        let projects = self.catalog.try_list_projects().map_err(|e| {
            warn!(term, error = %e, "listing projects failed");
            e
        })?;
        let matches = filter_matches(&projects, term);
        debug!(term, matches = matches.len(), "resolved search term");
        Ok(matches)
    }

    /// Names of the matching projects.
    pub fn search(&self, term: &str) -> Result<Vec<String>> {
        Ok(self
            .try_resolve_matches(term)?
            .names()
            .map(str::to_string)
            .collect())
    }

    /// Invite `email` to every matching project.
    ///
    /// A failed listing comes back as a report with `listing_error` set and
    /// no items.
    pub fn invite_to_matches(&self, email: &str, term: &str) -> FanOutReport {
        match self.try_resolve_matches(term) {
            Ok(matches) => {
                self.fan_out(&matches, |m| self.catalog.invite_collaborator(email, &m.id))
            }
            Err(e) => FanOutReport::listing_failed(format!("Failed to list projects: {e}")),
        }
    }

    /// Delete every matching project once `confirm` approves the set.
    ///
    /// `confirm` is not called when nothing matches or the listing fails.
    pub fn delete_matches<F>(&self, term: &str, confirm: F) -> ConfirmedAction
    where
        F: FnOnce(&MatchSet) -> bool,
    {
        self.confirmed(term, confirm, |matches| self.delete_all(matches))
    }

    /// Deploy `branch` on every matching project once `confirm` approves.
    pub fn deploy_matches<F>(&self, term: &str, branch: &str, confirm: F) -> ConfirmedAction
    where
        F: FnOnce(&MatchSet) -> bool,
    {
        self.confirmed(term, confirm, |matches| self.deploy_all(matches, branch))
    }

    /// Delete an already resolved set without asking.
    pub fn delete_all(&self, matches: &MatchSet) -> FanOutReport {
        self.fan_out(matches, |m| self.catalog.delete_project(&m.id))
    }

    /// Deploy an already resolved set without asking.
    pub fn deploy_all(&self, matches: &MatchSet, branch: &str) -> FanOutReport {
        self.fan_out(matches, |m| self.catalog.deploy_project(&m.id, branch))
    }

    /// Collaborators of every matching project, each listed independently.
    pub fn list_collaborators_of_matches(&self, term: &str) -> Result<Vec<CollaboratorListing>> {
        let listings = self
            .try_resolve_matches(term)?
            .iter()
            .map(|m| {
                let collaborators = self
                    .catalog
                    .try_list_collaborators(&m.id)
                    .map_err(|e| {
                        warn!(project = %m.id, error = %e, "listing collaborators failed");
                        format!("Failed to retrieve collaborators for project {}: {e}", m.id)
                    });
                CollaboratorListing {
                    project: m.clone(),
                    collaborators,
                }
            })
            .collect();
        Ok(listings)
    }

    fn confirmed<F, G>(&self, term: &str, confirm: F, act: G) -> ConfirmedAction
    where
        F: FnOnce(&MatchSet) -> bool,
        G: FnOnce(&MatchSet) -> FanOutReport,
    {
        let matches = match self.try_resolve_matches(term) {
            Ok(matches) => matches,
            Err(e) => {
                return ConfirmedAction::ListingFailed {
                    message: format!("Failed to list projects: {e}"),
                }
            }
        };
        if matches.is_empty() {
            return ConfirmedAction::NothingToDo;
        }
        if !confirm(&matches) {
            info!(term, matches = matches.len(), "cancelled by caller");
            return ConfirmedAction::Cancelled { matches };
        }
        ConfirmedAction::Completed {
            report: act(&matches),
        }
    }

    fn fan_out<F>(&self, matches: &MatchSet, mut action: F) -> FanOutReport
    where
        F: FnMut(&Match) -> Outcome,
    {
        let mut report = FanOutReport::default();
        for m in matches {
            let outcome = action(m);
            report.push(m.clone(), outcome);
        }
        report
    }
}
