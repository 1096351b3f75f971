use envoyer_client::{
    filter_matches, Collaborator, EnvoyerApi, FanOutReport, Hook, Match, MatchSet, Orchestrator,
    Project,
};

/// Bulk action waiting for, or running after, confirmation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum BulkAction {
    Deploy,
    Delete,
}

impl BulkAction {
    pub(crate) fn verb(&self) -> &'static str {
        match self {
            BulkAction::Deploy => "deploy",
            BulkAction::Delete => "delete",
        }
    }
}

/// Represents the current screen being displayed.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum AppScreen {
    /// Loading the project list from the API.
    LoadingProjects,
    /// Project table filtered by the current search term.
    ProjectTable,
    /// Editing the search term.
    FilterInput,
    /// Loading collaborators and hooks of the selected project.
    LoadingDetails,
    /// Collaborators and hooks of the selected project.
    ProjectDetails,
    /// Asking whether to apply an action to every visible project.
    Confirm(BulkAction),
    /// Applying a confirmed action.
    Running(BulkAction),
    /// Per-project outcomes of the last action.
    Results(BulkAction),
}

/// Collaborators and hooks of one project; each half may fail on its own.
pub(crate) struct ProjectDetails {
    pub(crate) project: Match,
    pub(crate) collaborators: Result<Vec<Collaborator>, String>,
    pub(crate) hooks: Result<Vec<Hook>, String>,
}

/// Main application state.
pub struct AppState<A> {
    /// Current screen being displayed.
    pub(crate) screen: AppScreen,
    /// API root shown in the status bar.
    pub(crate) api_url: String,
    pub(crate) orchestrator: Orchestrator<A>,
    /// Last fetched project list.
    pub(crate) projects: Vec<Project>,
    /// Search term; matched case-insensitively against project names.
    pub(crate) filter: String,
    /// Cursor position in the search term, in characters.
    pub(crate) cursor_position: usize,
    /// Projects matching `filter`, i.e. the targets of bulk actions.
    pub(crate) visible: MatchSet,
    /// Currently selected row in the table.
    pub(crate) selected_row: usize,
    pub(crate) details: Option<ProjectDetails>,
    pub(crate) last_report: Option<FanOutReport>,
    /// Error message to display.
    pub(crate) error_message: Option<String>,
    /// Informational message to display.
    pub(crate) status_message: Option<String>,
    /// Should the application quit?
    pub should_quit: bool,
}

impl<A: EnvoyerApi> AppState<A> {
    pub fn new(orchestrator: Orchestrator<A>, api_url: impl Into<String>) -> Self {
        Self {
            screen: AppScreen::LoadingProjects,
            api_url: api_url.into(),
            orchestrator,
            projects: Vec::new(),
            filter: String::new(),
            cursor_position: 0,
            visible: MatchSet::default(),
            selected_row: 0,
            details: None,
            last_report: None,
            error_message: None,
            status_message: None,
            should_quit: false,
        }
    }

    /// Fetch the project list and re-apply the filter.
    pub(crate) fn fetch_projects(&mut self) -> Result<(), String> {
        self.projects = self
            .orchestrator
            .catalog()
            .try_list_projects()
            .map_err(|e| format!("Failed to fetch projects: {e}"))?;
        self.apply_filter();
        Ok(())
    }

    /// Fetch collaborators and hooks of the selected project.
    pub(crate) fn fetch_selected_details(&mut self) -> Result<(), String> {
        let project = self
            .selected_match()
            .cloned()
            .ok_or("No project selected")?;
        let catalog = self.orchestrator.catalog();
        let collaborators = catalog
            .try_list_collaborators(&project.id)
            .map_err(|e| e.to_string());
        let hooks = catalog.try_list_hooks(&project.id).map_err(|e| e.to_string());
        self.details = Some(ProjectDetails {
            project,
            collaborators,
            hooks,
        });
        Ok(())
    }

    /// Apply `action` to every visible project.
    pub(crate) fn run_bulk_action(&mut self, action: BulkAction) {
        let report = match action {
            BulkAction::Deploy => self
                .orchestrator
                .deploy_all(&self.visible, envoyer_client::DEFAULT_BRANCH),
            BulkAction::Delete => self.orchestrator.delete_all(&self.visible),
        };
        self.status_message = Some(format!(
            "{}: {} succeeded, {} failed",
            action.verb(),
            report.succeeded(),
            report.failed()
        ));
        self.last_report = Some(report);
    }

    pub(crate) fn apply_filter(&mut self) {
        self.visible = filter_matches(&self.projects, &self.filter);
        if self.selected_row >= self.visible.len() {
            self.selected_row = self.visible.len().saturating_sub(1);
        }
    }

    pub(crate) fn selected_match(&self) -> Option<&Match> {
        self.visible.iter().nth(self.selected_row)
    }

    pub(crate) fn select_previous(&mut self) {
        self.selected_row = self.selected_row.saturating_sub(1);
    }

    pub(crate) fn select_next(&mut self) {
        if self.selected_row + 1 < self.visible.len() {
            self.selected_row += 1;
        }
    }

    /// Byte offset of the character cursor inside `filter`.
    pub(crate) fn cursor_byte_offset(&self) -> usize {
        self.filter
            .char_indices()
            .nth(self.cursor_position)
            .map_or(self.filter.len(), |(i, _)| i)
    }

    /// Clear any error message
    pub(crate) fn clear_error(&mut self) {
        self.error_message = None;
    }

    /// Set an error message
    pub(crate) fn set_error(&mut self, message: String) {
        self.error_message = Some(message);
    }
}
