//! Envoyer TUI Application
//!
//! A terminal user interface for searching Envoyer projects and deploying
//! or deleting every project that matches.
//!
//! Logs are discarded unless `ENVOYER_LOG_FILE` names a file to append to.

use std::fs::OpenOptions;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use envoyer_client::{Config, EnvoyerClient, Orchestrator};

use crate::actions::process_state;
use crate::events::handle_event;
use crate::state::AppState;
use crate::terminal::{restore_terminal, setup_terminal};
use crate::ui::render;

mod actions;
mod events;
mod state;
mod terminal;
mod ui;

const LOG_FILE_VAR: &str = "ENVOYER_LOG_FILE";

fn init_logging() -> Result<()> {
    let Ok(path) = std::env::var(LOG_FILE_VAR) else {
        return Ok(());
    };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Cannot open log file {path}"))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "envoyer_client=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();
    Ok(())
}

fn main() -> Result<()> {
    init_logging()?;

    // Fail before touching the terminal when the key is missing.
    let config = Config::from_env().context("Cannot start without an API key")?;
    let client = EnvoyerClient::new(&config).context("Failed to build HTTP client")?;

    let mut terminal = setup_terminal()?;
    let mut state = AppState::new(Orchestrator::new(client), config.base_url.clone());

    let result = run(&mut terminal, &mut state);

    restore_terminal(&mut terminal)?;
    result
}

fn run(
    terminal: &mut ratatui::Terminal<ratatui::backend::CrosstermBackend<std::io::Stdout>>,
    state: &mut AppState<EnvoyerClient>,
) -> Result<()> {
    loop {
        terminal.draw(|f| render(f, state))?;

        // Process any state transitions (e.g., loading -> loaded)
        process_state(state);

        if state.should_quit {
            return Ok(());
        }

        if event::poll(Duration::from_millis(100))? {
            let event = event::read()?;
            handle_event(event, state);
        }
    }
}
