//! Terminal User Interface (TUI) for the live progress view
//!
//! Redraws the chart and title lines on every refresh tick while the
//! shared [`ClockState`](crate::clock::ClockState) reports running.

mod app;
mod constants;
mod helpers;
pub mod log_capture;
mod ui;

pub use app::TuiApp;
pub use log_capture::{LogBuffer, LogMakeWriter};
pub use ui::render_ui;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::time::Duration;
use tokio::time::Instant;
use tracing::info;

use constants::KEY_POLL;

/// Setup the terminal for TUI rendering
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    Ok(terminal)
}

/// Restore the terminal to its original state
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    // Clear the terminal first to prevent escape sequences leaking to shell
    terminal.clear()?;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    Ok(())
}

/// What a key press asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyAction {
    Quit,
    ToggleLogs,
}

fn key_action(code: KeyCode, modifiers: KeyModifiers) -> Option<KeyAction> {
    match code {
        KeyCode::Char('q') | KeyCode::Esc => Some(KeyAction::Quit),
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Some(KeyAction::Quit),
        KeyCode::Char('l') => Some(KeyAction::ToggleLogs),
        _ => None,
    }
}

/// Run the TUI event loop
///
/// Runs until the clock stops, either from a key press here or from a
/// signal or sampler failure elsewhere. Quitting from the keyboard stops the
/// clock so the sampler winds down too.
///
/// The terminal is restored on return and on panic.
pub async fn run_tui(mut app: TuiApp, refresh: Duration) -> Result<()> {
    let mut terminal = setup_terminal()?;

    // Setup panic hook to ensure terminal cleanup
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_app(&mut terminal, &mut app, refresh).await;

    restore_terminal(&mut terminal)?;

    result
}

/// Main TUI event loop
async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut TuiApp,
    refresh: Duration,
) -> Result<()> {
    while app.clock().is_running() {
        app.update().await;
        terminal.draw(|f| ui::render_ui(f, app))?;

        // Keys are checked between redraws so quitting stays responsive
        let next_refresh = Instant::now() + refresh;
        while Instant::now() < next_refresh && app.clock().is_running() {
            if event::poll(Duration::ZERO)?
                && let Event::Key(key) = event::read()?
                && key.kind == KeyEventKind::Press
            {
                match key_action(key.code, key.modifiers) {
                    Some(KeyAction::Quit) => {
                        if app.clock().stop() {
                            info!("Stopped from keyboard");
                        }
                        break;
                    }
                    Some(KeyAction::ToggleLogs) => {
                        app.toggle_log_fullscreen();
                        terminal.draw(|f| ui::render_ui(f, app))?;
                    }
                    None => {}
                }
            }
            tokio::time::sleep(KEY_POLL).await;
        }
    }

    Ok(())
}
