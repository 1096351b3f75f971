use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use envoyer_client::{EnvoyerApi, Outcome};

use super::state::{AppScreen, AppState, BulkAction};

/// Main render function that dispatches to the appropriate screen renderer.
pub fn render<A: EnvoyerApi>(f: &mut Frame, state: &AppState<A>) {
    match state.screen {
        AppScreen::LoadingProjects => render_loading(f, state, "Loading projects"),
        AppScreen::ProjectTable | AppScreen::FilterInput => render_project_table(f, state),
        AppScreen::LoadingDetails => render_loading(f, state, "Loading collaborators and hooks"),
        AppScreen::ProjectDetails => render_project_details(f, state),
        AppScreen::Confirm(action) => render_confirm(f, state, action),
        AppScreen::Running(action) => render_loading(f, state, running_message(action)),
        AppScreen::Results(action) => render_results(f, state, action),
    }
}

fn running_message(action: BulkAction) -> &'static str {
    match action {
        BulkAction::Deploy => "Deploying",
        BulkAction::Delete => "Deleting",
    }
}

fn title(text: String) -> Paragraph<'static> {
    Paragraph::new(text)
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL))
}

fn help(text: &'static str) -> Paragraph<'static> {
    Paragraph::new(text)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center)
}

fn selected_style() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
}

fn header(cells: Vec<&'static str>) -> Row<'static> {
    Row::new(cells)
        .style(Style::default().add_modifier(Modifier::BOLD))
        .bottom_margin(1)
}

/// Render the loading screen
fn render_loading<A: EnvoyerApi>(f: &mut Frame, state: &AppState<A>, message: &str) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Length(3), // Loading message
            Constraint::Min(1),    // Spacer
            Constraint::Length(2), // Status bar
        ])
        .split(f.area());

    f.render_widget(title("Envoyer Projects".into()), chunks[0]);

    let loading = Paragraph::new(format!("{message}..."))
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(loading, chunks[1]);

    render_status_bar(f, chunks[3], state);
}

/// Render the filterable project table
fn render_project_table<A: EnvoyerApi>(f: &mut Frame, state: &AppState<A>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Length(3), // Filter
            Constraint::Min(5),    // Project table
            Constraint::Length(2), // Help
            Constraint::Length(2), // Status bar
        ])
        .split(f.area());

    f.render_widget(
        title(format!(
            "Envoyer Projects | {} of {} shown",
            state.visible.len(),
            state.projects.len()
        )),
        chunks[0],
    );

    let editing = state.screen == AppScreen::FilterInput;
    let filter_block = Block::default()
        .title(" Search ")
        .borders(Borders::ALL)
        .border_style(if editing {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        });
    let filter = Paragraph::new(state.filter.as_str())
        .style(Style::default().fg(Color::White))
        .block(filter_block);
    f.render_widget(filter, chunks[1]);
    if editing {
        let inner_width = chunks[1].width.saturating_sub(2);
        let column = cursor_column(&state.filter[..state.cursor_byte_offset()]).min(inner_width);
        let cursor_x = chunks[1].x + column + 1;
        let cursor_y = chunks[1].y + 1;
        f.set_cursor_position((cursor_x, cursor_y));
    }

    let rows: Vec<Row> = state
        .visible
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let style = if i == state.selected_row {
                selected_style()
            } else {
                Style::default()
            };
            let project = state.projects.iter().find(|p| p.id == m.id);
            let branch = project.and_then(|p| p.branch.clone()).unwrap_or_default();
            let status = project.and_then(|p| p.status.clone()).unwrap_or_default();
            Row::new(vec![
                Cell::from(m.id.to_string()),
                Cell::from(truncate(&m.name, 40)),
                Cell::from(branch),
                Cell::from(status),
            ])
            .style(style)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Min(20),
            Constraint::Length(12),
            Constraint::Length(12),
        ],
    )
    .header(header(vec!["Id", "Name", "Branch", "Status"]))
    .block(Block::default().borders(Borders::ALL).title(" Projects "));
    f.render_widget(table, chunks[2]);

    f.render_widget(
        help(if editing {
            "Type to filter | Enter/Esc: Done"
        } else {
            "/: Search | Enter: Details | d: Deploy all | x: Delete all | r: Reload | q: Quit"
        }),
        chunks[3],
    );

    render_status_bar(f, chunks[4], state);
}

/// Render collaborators and hooks of the selected project
fn render_project_details<A: EnvoyerApi>(f: &mut Frame, state: &AppState<A>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3),      // Title
            Constraint::Percentage(40), // Collaborators
            Constraint::Min(5),         // Hooks
            Constraint::Length(2),      // Help
            Constraint::Length(2),      // Status bar
        ])
        .split(f.area());

    let Some(details) = &state.details else {
        render_status_bar(f, chunks[4], state);
        return;
    };

    f.render_widget(
        title(format!("{} ({})", details.project.name, details.project.id)),
        chunks[0],
    );

    let collaborator_rows: Vec<Row> = match &details.collaborators {
        Ok(list) if list.is_empty() => vec![Row::new(vec!["(none)"])],
        Ok(list) => list
            .iter()
            .map(|c| {
                Row::new(vec![
                    c.email.clone(),
                    c.name.clone().unwrap_or_default(),
                ])
            })
            .collect(),
        Err(e) => vec![Row::new(vec![e.clone()]).style(Style::default().fg(Color::Red))],
    };
    let collaborators = Table::new(
        collaborator_rows,
        [Constraint::Percentage(60), Constraint::Percentage(40)],
    )
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Collaborators "),
    );
    f.render_widget(collaborators, chunks[1]);

    let hook_rows: Vec<Row> = match &details.hooks {
        Ok(list) if list.is_empty() => vec![Row::new(vec!["(none)"])],
        Ok(list) => list
            .iter()
            .map(|h| {
                Row::new(vec![
                    h.timing.clone().unwrap_or_default(),
                    h.name.clone(),
                    truncate(h.run.as_deref().unwrap_or(""), 60),
                ])
            })
            .collect(),
        Err(e) => vec![Row::new(vec![e.clone()]).style(Style::default().fg(Color::Red))],
    };
    let hooks = Table::new(
        hook_rows,
        [
            Constraint::Length(8),
            Constraint::Length(24),
            Constraint::Min(20),
        ],
    )
    .header(header(vec!["Timing", "Name", "Script"]))
    .block(Block::default().borders(Borders::ALL).title(" Hooks "));
    f.render_widget(hooks, chunks[2]);

    f.render_widget(help("Esc: Back | q: Quit"), chunks[3]);
    render_status_bar(f, chunks[4], state);
}

/// Render the confirmation prompt listing every target
fn render_confirm<A: EnvoyerApi>(f: &mut Frame, state: &AppState<A>, action: BulkAction) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(5),    // Targets
            Constraint::Length(2), // Help
            Constraint::Length(2), // Status bar
        ])
        .split(f.area());

    let question = match action {
        BulkAction::Deploy => format!(
            "Deploy {} project(s) from '{}'?",
            state.visible.len(),
            envoyer_client::DEFAULT_BRANCH
        ),
        BulkAction::Delete => format!("Delete {} project(s)?", state.visible.len()),
    };
    let question = Paragraph::new(question)
        .style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(question, chunks[0]);

    let rows: Vec<Row> = state
        .visible
        .iter()
        .map(|m| Row::new(vec![m.id.to_string(), m.name.clone()]))
        .collect();
    let table = Table::new(rows, [Constraint::Length(10), Constraint::Min(20)])
        .header(header(vec!["Id", "Name"]))
        .block(Block::default().borders(Borders::ALL).title(" Targets "));
    f.render_widget(table, chunks[1]);

    f.render_widget(help("y: Yes | n/Esc: Cancel"), chunks[2]);
    render_status_bar(f, chunks[3], state);
}

/// Render per-project outcomes of the last action
fn render_results<A: EnvoyerApi>(f: &mut Frame, state: &AppState<A>, action: BulkAction) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(5),    // Outcomes
            Constraint::Length(2), // Help
            Constraint::Length(2), // Status bar
        ])
        .split(f.area());

    f.render_widget(title(format!("Results: {}", action.verb())), chunks[0]);

    let rows: Vec<Row> = state
        .last_report
        .iter()
        .flat_map(|r| r.items.iter())
        .map(|item| {
            let (mark, color) = match item.outcome {
                Outcome::Succeeded(_) => ("ok", Color::Green),
                Outcome::Failed(_) => ("failed", Color::Red),
            };
            Row::new(vec![
                Cell::from(item.project.name.clone()),
                Cell::from(mark),
                Cell::from(item.outcome.message().to_string()),
            ])
            .style(Style::default().fg(color))
        })
        .collect();
    let table = Table::new(
        rows,
        [
            Constraint::Length(24),
            Constraint::Length(8),
            Constraint::Min(20),
        ],
    )
    .header(header(vec!["Project", "Result", "Message"]))
    .block(Block::default().borders(Borders::ALL).title(" Outcomes "));
    f.render_widget(table, chunks[1]);

    f.render_widget(help("Enter: Reload projects | q: Quit"), chunks[2]);
    render_status_bar(f, chunks[3], state);
}

/// Render the status bar at the bottom
fn render_status_bar<A: EnvoyerApi>(f: &mut Frame, area: Rect, state: &AppState<A>) {
    let (status_text, style) = if let Some(ref error) = state.error_message {
        (format!(" Error: {error}"), Style::default().fg(Color::Red))
    } else if let Some(ref message) = state.status_message {
        (format!(" {message}"), Style::default().fg(Color::Yellow))
    } else {
        (
            format!(" Connected to: {}", state.api_url),
            Style::default().fg(Color::Green),
        )
    };

    let status = Paragraph::new(status_text)
        .style(style)
        .alignment(Alignment::Left)
        .block(Block::default().borders(Borders::TOP));
    f.render_widget(status, area);
}

/// Display width of the text left of the cursor; wide characters take two
/// columns.
fn cursor_column(before_cursor: &str) -> u16 {
    u16::try_from(Span::raw(before_cursor).width()).unwrap_or(u16::MAX)
}

/// Shorten `s` to at most `max` characters, marking the cut with "...".
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::process_state;
    use envoyer_client::testing::FakeApi;
    use envoyer_client::Orchestrator;
    use ratatui::{backend::TestBackend, Terminal};

    fn screen_text<A: EnvoyerApi>(state: &AppState<A>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| render(f, state)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn truncate_respects_character_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("ééééééééééé", 6), "ééé...");
    }

    #[test]
    fn cursor_column_counts_display_width() {
        assert_eq!(cursor_column(""), 0);
        assert_eq!(cursor_column("shop"), 4);
        assert_eq!(cursor_column("café"), 4);
        assert_eq!(cursor_column("日本"), 4);
    }

    #[test]
    fn confirm_screen_lists_every_target() {
        let api = FakeApi::with_projects([(1, "Alpha"), (2, "Alphabet")]);
        let mut state = AppState::new(Orchestrator::new(&api), "http://test");
        process_state(&mut state);
        state.screen = AppScreen::Confirm(BulkAction::Delete);

        let text = screen_text(&state);
        assert!(text.contains("Delete 2 project(s)?"));
        assert!(text.contains("Alpha"));
        assert!(text.contains("Alphabet"));
    }

    #[test]
    fn table_shows_status_bar_error() {
        let api = FakeApi::new();
        let mut state = AppState::new(Orchestrator::new(&api), "http://test");
        process_state(&mut state);
        state.set_error("boom".into());

        assert!(screen_text(&state).contains("Error: boom"));
    }
}
