use envoyer_client::EnvoyerApi;

use super::state::{AppScreen, AppState};

/// Process the current state (e.g., fetch data during loading screens).
pub fn process_state<A: EnvoyerApi>(state: &mut AppState<A>) {
    match state.screen {
        AppScreen::LoadingProjects => {
            match state.fetch_projects() {
                Ok(()) => state.clear_error(),
                Err(e) => state.set_error(e),
            }
            state.screen = AppScreen::ProjectTable;
        }
        AppScreen::LoadingDetails => match state.fetch_selected_details() {
            Ok(()) => {
                state.screen = AppScreen::ProjectDetails;
            }
            Err(e) => {
                state.set_error(e);
                state.screen = AppScreen::ProjectTable;
            }
        },
        AppScreen::Running(action) => {
            state.run_bulk_action(action);
            state.screen = AppScreen::Results(action);
        }
        _ => {}
    }
}
