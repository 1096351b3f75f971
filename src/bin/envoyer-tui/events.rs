use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use envoyer_client::EnvoyerApi;

use super::state::{AppScreen, AppState, BulkAction};

/// Main event handler that dispatches to the appropriate screen handler.
pub fn handle_event<A: EnvoyerApi>(event: Event, state: &mut AppState<A>) {
    if let Event::Key(key_event) = event {
        if key_event.kind != KeyEventKind::Press {
            return;
        }

        // 'q' is a literal character while typing a search term.
        if key_event.code == KeyCode::Char('q')
            && state.screen != AppScreen::FilterInput
            && key_event.modifiers == KeyModifiers::NONE
        {
            state.should_quit = true;
            return;
        }

        match state.screen {
            AppScreen::ProjectTable => handle_project_table(key_event, state),
            AppScreen::FilterInput => handle_filter_input(key_event, state),
            AppScreen::ProjectDetails => handle_project_details(key_event, state),
            AppScreen::Confirm(action) => handle_confirm(key_event, action, state),
            AppScreen::Results(_) => handle_results(key_event, state),
            _ => {} // Loading and running screens don't handle input
        }
    }
}

fn handle_project_table<A: EnvoyerApi>(event: KeyEvent, state: &mut AppState<A>) {
    match event.code {
        KeyCode::Up => state.select_previous(),
        KeyCode::Down => state.select_next(),
        KeyCode::Char('/') => {
            state.cursor_position = state.filter.chars().count();
            state.screen = AppScreen::FilterInput;
        }
        KeyCode::Enter => {
            if state.selected_match().is_some() {
                state.screen = AppScreen::LoadingDetails;
            }
        }
        KeyCode::Char('d') => request_confirmation(state, BulkAction::Deploy),
        KeyCode::Char('x') => request_confirmation(state, BulkAction::Delete),
        KeyCode::Char('r') => {
            state.clear_error();
            state.screen = AppScreen::LoadingProjects;
        }
        KeyCode::Esc => {
            state.filter.clear();
            state.cursor_position = 0;
            state.apply_filter();
        }
        _ => {}
    }
}

fn request_confirmation<A: EnvoyerApi>(state: &mut AppState<A>, action: BulkAction) {
    if state.visible.is_empty() {
        state.status_message = Some(format!("No projects match; nothing to {}.", action.verb()));
        return;
    }
    state.status_message = None;
    state.screen = AppScreen::Confirm(action);
}

fn handle_filter_input<A: EnvoyerApi>(event: KeyEvent, state: &mut AppState<A>) {
    let len = state.filter.chars().count();
    match event.code {
        KeyCode::Char(c) => {
            let at = state.cursor_byte_offset();
            state.filter.insert(at, c);
            state.cursor_position += 1;
            state.apply_filter();
        }
        KeyCode::Backspace => {
            if state.cursor_position > 0 {
                state.cursor_position -= 1;
                let at = state.cursor_byte_offset();
                state.filter.remove(at);
                state.apply_filter();
            }
        }
        KeyCode::Delete => {
            if state.cursor_position < len {
                let at = state.cursor_byte_offset();
                state.filter.remove(at);
                state.apply_filter();
            }
        }
        KeyCode::Left => {
            state.cursor_position = state.cursor_position.saturating_sub(1);
        }
        KeyCode::Right => {
            if state.cursor_position < len {
                state.cursor_position += 1;
            }
        }
        KeyCode::Home => {
            state.cursor_position = 0;
        }
        KeyCode::End => {
            state.cursor_position = len;
        }
        KeyCode::Enter | KeyCode::Esc => {
            state.screen = AppScreen::ProjectTable;
        }
        _ => {}
    }
}

fn handle_project_details<A: EnvoyerApi>(event: KeyEvent, state: &mut AppState<A>) {
    if matches!(event.code, KeyCode::Esc | KeyCode::Backspace | KeyCode::Enter) {
        state.details = None;
        state.screen = AppScreen::ProjectTable;
    }
}

fn handle_confirm<A: EnvoyerApi>(event: KeyEvent, action: BulkAction, state: &mut AppState<A>) {
    match event.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            state.screen = AppScreen::Running(action);
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            state.status_message = Some(format!("Cancelled; nothing to {}.", action.verb()));
            state.screen = AppScreen::ProjectTable;
        }
        _ => {}
    }
}

fn handle_results<A: EnvoyerApi>(event: KeyEvent, state: &mut AppState<A>) {
    if matches!(event.code, KeyCode::Esc | KeyCode::Enter) {
        // Deletions change the listing; always refresh.
        state.screen = AppScreen::LoadingProjects;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::process_state;
    use envoyer_client::testing::{FakeApi, Operation};
    use envoyer_client::Orchestrator;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn loaded(api: &FakeApi) -> AppState<&FakeApi> {
        let mut state = AppState::new(Orchestrator::new(api), "http://test");
        process_state(&mut state);
        assert_eq!(state.screen, AppScreen::ProjectTable);
        state
    }

    fn type_text(state: &mut AppState<&FakeApi>, text: &str) {
        handle_event(key(KeyCode::Char('/')), state);
        for c in text.chars() {
            handle_event(key(KeyCode::Char(c)), state);
        }
        handle_event(key(KeyCode::Enter), state);
    }

    #[test]
    fn typing_narrows_the_visible_set() {
        let api = FakeApi::with_projects([(1, "Alpha"), (2, "Alphabet"), (3, "Beta")]);
        let mut state = loaded(&api);
        assert_eq!(state.visible.len(), 3);

        type_text(&mut state, "ALPHA");
        assert_eq!(state.filter, "ALPHA");
        assert_eq!(state.visible.names().collect::<Vec<_>>(), ["Alpha", "Alphabet"]);

        handle_event(key(KeyCode::Esc), &mut state);
        assert_eq!(state.visible.len(), 3);
    }

    #[test]
    fn q_is_text_inside_the_filter() {
        let api = FakeApi::with_projects([(1, "Quartz")]);
        let mut state = loaded(&api);
        type_text(&mut state, "q");
        assert!(!state.should_quit);
        assert_eq!(state.visible.len(), 1);

        handle_event(key(KeyCode::Char('q')), &mut state);
        assert!(state.should_quit);
    }

    #[test]
    fn editing_handles_multibyte_characters() {
        let api = FakeApi::with_projects([(1, "Café")]);
        let mut state = loaded(&api);
        handle_event(key(KeyCode::Char('/')), &mut state);
        for c in "cafés".chars() {
            handle_event(key(KeyCode::Char(c)), &mut state);
        }
        handle_event(key(KeyCode::Backspace), &mut state);
        handle_event(key(KeyCode::Left), &mut state);
        handle_event(key(KeyCode::Delete), &mut state);
        assert_eq!(state.filter, "caf");
    }

    #[test]
    fn declining_makes_no_calls() {
        let api = FakeApi::with_projects([(1, "Alpha"), (2, "Beta")]);
        let mut state = loaded(&api);

        handle_event(key(KeyCode::Char('x')), &mut state);
        assert_eq!(state.screen, AppScreen::Confirm(BulkAction::Delete));
        handle_event(key(KeyCode::Char('n')), &mut state);
        process_state(&mut state);

        assert_eq!(state.screen, AppScreen::ProjectTable);
        assert_eq!(api.count(Operation::DeleteProject), 0);
    }

    #[test]
    fn confirmed_deploy_targets_visible_projects() {
        let api = FakeApi::with_projects([(1, "Alpha"), (2, "Alphabet"), (3, "Beta")])
            .fail_for(Operation::CreateDeployment, envoyer_client::ProjectId::from(1u64));
        let mut state = loaded(&api);
        type_text(&mut state, "alpha");

        handle_event(key(KeyCode::Char('d')), &mut state);
        handle_event(key(KeyCode::Char('y')), &mut state);
        process_state(&mut state);

        assert_eq!(state.screen, AppScreen::Results(BulkAction::Deploy));
        let report = state.last_report.as_ref().unwrap();
        assert_eq!(report.items.len(), 2);
        assert_eq!(report.failed(), 1);
        assert_eq!(api.count(Operation::CreateDeployment), 2);
    }

    #[test]
    fn bulk_action_on_empty_filter_result_is_refused() {
        let api = FakeApi::with_projects([(1, "Alpha")]);
        let mut state = loaded(&api);
        type_text(&mut state, "zzz");

        handle_event(key(KeyCode::Char('x')), &mut state);
        assert_eq!(state.screen, AppScreen::ProjectTable);
        assert!(state.status_message.is_some());
    }

    #[test]
    fn enter_loads_details_of_selection() {
        let api = FakeApi::with_projects([(1, "Alpha"), (2, "Beta")]);
        api.add_collaborator(envoyer_client::ProjectId::from(2u64), "b@example.com");
        let mut state = loaded(&api);

        handle_event(key(KeyCode::Down), &mut state);
        handle_event(key(KeyCode::Enter), &mut state);
        process_state(&mut state);

        assert_eq!(state.screen, AppScreen::ProjectDetails);
        let details = state.details.as_ref().unwrap();
        assert_eq!(details.project.name, "Beta");
        assert_eq!(details.collaborators.as_ref().unwrap()[0].email, "b@example.com");
        assert!(details.hooks.as_ref().unwrap().is_empty());
    }

    #[test]
    fn key_release_events_are_ignored_by_screens() {
        let api = FakeApi::with_projects([(1, "Alpha")]);
        let mut state = loaded(&api);
        let mut release = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        handle_event(Event::Key(release), &mut state);
        assert_eq!(state.screen, AppScreen::ProjectTable);
    }
}
