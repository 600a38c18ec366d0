pub mod app;
pub mod event;
pub mod theme;
pub mod ui;

pub use app::App;
pub use theme::{resolve_theme, ThemeColors, ThemeMode};

use std::time::Duration;

use anyhow::Context;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use event::{Event, EventHandler};
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::data::LoadedData;

const LOAD_TIMEOUT: Duration = Duration::from_secs(30);

type LoadResult = Result<Result<LoadedData, tokio::task::JoinError>, tokio::time::error::Elapsed>;

/// Read every data file on a blocking thread, giving up after a timeout.
fn spawn_load(config: Config) -> JoinHandle<LoadResult> {
    tokio::spawn(async move {
        tokio::time::timeout(
            LOAD_TIMEOUT,
            tokio::task::spawn_blocking(move || LoadedData::load(&config)),
        )
        .await
    })
}

pub async fn run_tui(mut app: App) -> anyhow::Result<()> {
    // Buffer stderr while TUI is active to prevent output corrupting the display
    crate::stderr_buffer::activate();

    // Init terminal (sets up panic hooks automatically)
    let mut terminal = ratatui::init();

    let mut events = EventHandler::new(250);

    let mut pending_load: Option<JoinHandle<LoadResult>> = Some(spawn_load(app.config.clone()));
    app.is_loading = true;

    let result = loop {
        if let Err(e) = terminal.draw(|frame| ui::draw(frame, &mut app)) {
            break Err(e).context("Failed to draw terminal");
        }

        match events.next().await {
            Event::Key(key) => handle_key_event(&mut app, key),
            Event::Resize => {}
            Event::Tick => {
                app.update_flash();
                app.advance_spinner();
            }
        }

        // Check if the background load has completed
        if pending_load.as_ref().is_some_and(|h| h.is_finished()) {
            if let Some(handle) = pending_load.take() {
                match handle.await {
                    Ok(Ok(Ok(data))) => app.set_data(data),
                    Ok(Ok(Err(e))) => app.show_flash(format!("Failed to load data: {}", e)),
                    Ok(Err(_elapsed)) => app.show_flash(format!(
                        "Failed to load data: timed out after {}s",
                        LOAD_TIMEOUT.as_secs()
                    )),
                    Err(e) => app.show_flash(format!("Failed to load data: {}", e)),
                }
                app.is_loading = false;
            }
        }

        // Start a reload if requested and nothing is in flight
        if app.needs_reload && pending_load.is_none() {
            app.needs_reload = false;
            pending_load = Some(spawn_load(app.config.clone()));
            app.is_loading = true;
        }

        if app.should_quit {
            break Ok(());
        }
    };

    // Restore terminal
    ratatui::restore();

    // Flush buffered stderr messages now that the terminal is restored
    for msg in crate::stderr_buffer::drain() {
        eprintln!("{}", msg);
    }

    result
}

fn handle_key_event(app: &mut App, key: KeyEvent) {
    match app.input_mode {
        app::InputMode::Normal => handle_normal_key(app, key),
        app::InputMode::ScoreBreakdown => match key.code {
            KeyCode::Esc | KeyCode::Char('b') => app.dismiss_score_breakdown(),
            KeyCode::Char('j') | KeyCode::Down => app.next_row(),
            KeyCode::Char('k') | KeyCode::Up => app.previous_row(),
            _ => {}
        },
        app::InputMode::Help => {
            // Any key exits help
            app.dismiss_help();
        }
    }
}

fn handle_normal_key(app: &mut App, key: KeyEvent) {
    let weights_focused = app.focus == app::Focus::Weights;
    let weight_tab = app.current_tab.uses_weights();

    match key.code {
        // Quit
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.should_quit = true,

        // Tabs
        KeyCode::Tab => app.next_tab(),
        KeyCode::BackTab => app.previous_tab(),
        KeyCode::Char(c @ '1'..='6') => {
            let index = c as usize - '1' as usize;
            app.select_tab(app::Tab::ALL[index]);
        }

        // Navigation
        KeyCode::Char('j') | KeyCode::Down if weights_focused => app.next_weight(),
        KeyCode::Char('k') | KeyCode::Up if weights_focused => app.previous_weight(),
        KeyCode::Char('j') | KeyCode::Down => app.next_row(),
        KeyCode::Char('k') | KeyCode::Up => app.previous_row(),
        KeyCode::Char('f') => app.toggle_focus(),

        // Weights
        KeyCode::Char('h') | KeyCode::Left | KeyCode::Char('-') if weight_tab => app.adjust_weight(-1),
        KeyCode::Char('l') | KeyCode::Right | KeyCode::Char('+') | KeyCode::Char('=') if weight_tab => {
            app.adjust_weight(1)
        }
        KeyCode::Char('d') => app.reset_weights(),
        KeyCode::Char('z') => app.undo_last(),
        KeyCode::Char('w') => app.save_weights(),

        // View options
        KeyCode::Char('s') if app.current_tab == app::Tab::NetRisk => app.toggle_sort(),
        KeyCode::Char('b') => app.show_score_breakdown(),
        KeyCode::Char('[') => app.previous_factor(),
        KeyCode::Char(']') => app.next_factor(),
        KeyCode::Char('p') if app.current_tab == app::Tab::Population => app.toggle_population_sort(),

        // Reload data files
        KeyCode::Char('r') => app.request_reload(),

        // Help
        KeyCode::Char('?') => app.show_help(),

        _ => {}
    }
}
