//! Application controller.
//!
//! This module orchestrates the workbench loop:
//! - Terminal initialization and cleanup
//! - Event polling and handling
//! - State updates and rendering

use std::io::{self, Stdout};
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::event::{apply_action, handle_event, poll_event};
use crate::model::AppState;
use crate::tables::CodonTables;
use crate::ui::render;

/// The main application controller.
pub struct App<'t> {
    /// Terminal backend
    terminal: Terminal<CrosstermBackend<Stdout>>,
    /// Application state
    state: AppState<'t>,
    /// Event poll timeout
    tick_rate: Duration,
}

impl<'t> App<'t> {
    /// Creates a new application with the given state.
    pub fn new(state: AppState<'t>) -> Result<Self> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            state,
            tick_rate: Duration::from_millis(50),
        })
    }

    /// Runs the main application loop.
    pub fn run(&mut self) -> Result<()> {
        loop {
            self.terminal.draw(|frame| {
                render(frame, &self.state);
            })?;

            if let Some(event) = poll_event(self.tick_rate) {
                let action = handle_event(event, &self.state.mode);
                if !apply_action(&mut self.state, action) {
                    break;
                }
            }
        }

        Ok(())
    }
}

impl Drop for App<'_> {
    fn drop(&mut self) {
        // Restore terminal
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Runs the workbench over the loaded tables.
pub fn run_app(tables: &CodonTables) -> Result<()> {
    let mut app = App::new(AppState::new(tables))?;
    app.run()
}
