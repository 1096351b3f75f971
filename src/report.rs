use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::models::{Collaborator, Project, ProjectId};

/// Result of a single remote write, carried back to the caller instead of
/// being printed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum Outcome {
    Succeeded(String),
    Failed(String),
}

impl Outcome {
    pub fn succeeded(message: impl Into<String>) -> Self {
        Outcome::Succeeded(message.into())
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Outcome::Failed(message.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Succeeded(_))
    }

    pub fn message(&self) -> &str {
        match self {
            Outcome::Succeeded(m) | Outcome::Failed(m) => m,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Succeeded(m) => write!(f, "ok: {m}"),
            Outcome::Failed(m) => write!(f, "failed: {m}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Match sets
// ---------------------------------------------------------------------------

/// A project whose name matched a search term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Match {
    pub name: String,
    pub id: ProjectId,
}

impl From<&Project> for Match {
    fn from(project: &Project) -> Self {
        Self {
            name: project.name.clone(),
            id: project.id.clone(),
        }
    }
}

/// Projects matching a search term, in listing order.
///
/// Names are not unique, so two entries may share a name; every one of them
/// is a separate target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MatchSet(Vec<Match>);

impl MatchSet {
    pub fn new(matches: Vec<Match>) -> Self {
        Self(matches)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Match> {
        self.0.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|m| m.name.as_str())
    }

    pub fn ids(&self) -> impl Iterator<Item = &ProjectId> {
        self.0.iter().map(|m| &m.id)
    }

    /// Name → id view. A repeated name keeps its last id.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.0
            .iter()
            .map(|m| (m.name.clone(), m.id.to_string()))
            .collect()
    }
}

impl<'a> IntoIterator for &'a MatchSet {
    type Item = &'a Match;
    type IntoIter = std::slice::Iter<'a, Match>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<Match> for MatchSet {
    fn from_iter<I: IntoIterator<Item = Match>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ---------------------------------------------------------------------------
// Fan-out reports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemOutcome {
    pub project: Match,
    pub outcome: Outcome,
}

/// Per-project outcomes of a fan-out, in the order they were attempted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FanOutReport {
    pub items: Vec<ItemOutcome>,
    /// Set when the project listing failed, so no project was attempted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing_error: Option<String>,
}

impl FanOutReport {
    pub fn listing_failed(message: impl Into<String>) -> Self {
        Self {
            items: Vec::new(),
            listing_error: Some(message.into()),
        }
    }

    pub fn push(&mut self, project: Match, outcome: Outcome) {
        self.items.push(ItemOutcome { project, outcome });
    }

    pub fn succeeded(&self) -> usize {
        self.items.iter().filter(|i| i.outcome.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.items.len() - self.succeeded()
    }

    pub fn all_succeeded(&self) -> bool {
        self.listing_error.is_none() && self.failed() == 0
    }
}

/// Result of a fan-out that needs confirmation first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ConfirmedAction {
    /// The search term matched nothing.
    NothingToDo,
    /// The project listing failed; nothing was asked or attempted.
    ListingFailed { message: String },
    /// The caller declined; no remote call was made.
    Cancelled { matches: MatchSet },
    Completed { report: FanOutReport },
}

impl ConfirmedAction {
    pub fn report(&self) -> Option<&FanOutReport> {
        match self {
            ConfirmedAction::Completed { report } => Some(report),
            _ => None,
        }
    }

    /// False when the listing failed or any attempted item failed.
    pub fn succeeded(&self) -> bool {
        match self {
            ConfirmedAction::ListingFailed { .. } => false,
            ConfirmedAction::Completed { report } => report.all_succeeded(),
            ConfirmedAction::NothingToDo | ConfirmedAction::Cancelled { .. } => true,
        }
    }
}

/// Collaborators of one matched project, or why they could not be listed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollaboratorListing {
    pub project: Match,
    pub collaborators: Result<Vec<Collaborator>, String>,
}

/// Both steps of project creation. Creation is not rolled back when the
/// source update fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedProject {
    pub id: Option<ProjectId>,
    pub creation: Outcome,
    /// `None` when creation did not get far enough to attempt it.
    pub source_update: Option<Outcome>,
}

impl CreatedProject {
    pub fn fully_configured(&self) -> bool {
        self.creation.is_success()
            && self
                .source_update
                .as_ref()
                .is_some_and(Outcome::is_success)
    }
}
