//! Keyboard event handling.
//!
//! Normal mode:
//! - `Tab` / `Shift+Tab`: cycle focus (tables, protein, forced codons)
//! - `j` / `k` (or arrows): select next / previous codon table
//! - `i` or `Enter`: edit the focused input
//! - `:`: enter command mode
//!   - `:q` or `:quit`: quit the application
//!   - `:w <path>`: write the RNA as FASTA
//!   - `:clear`: clear both inputs
//!   - `:<table>`: select a table by name
//! - `Ctrl+C`: quit
//!
//! Editing mode: typed characters go to the focused input, `Enter` inserts a
//! newline, `Esc` returns to normal mode.

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use std::time::Duration;

use crate::model::{AppMode, AppState};

/// Actions that can be triggered by keyboard input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// No action (key not recognized)
    None,
    /// Quit the application
    Quit,
    /// Select the next codon table
    SelectNext,
    /// Select the previous codon table
    SelectPrevious,
    /// Move focus to the next panel
    FocusNext,
    /// Move focus to the previous panel
    FocusPrevious,
    /// Start editing the focused input
    StartEditing,
    /// Leave editing mode
    StopEditing,
    /// Add character to the focused input
    InputChar(char),
    /// Backspace in the focused input
    InputBackspace,
    /// Enter command mode
    EnterCommandMode,
    /// Add character to command buffer
    CommandChar(char),
    /// Execute current command
    ExecuteCommand,
    /// Cancel command mode
    CancelCommand,
    /// Backspace in command mode
    CommandBackspace,
    /// Resize event (terminal resized)
    Resize(u16, u16),
}

/// Polls for keyboard events with a timeout.
///
/// Returns `None` if no event occurred within the timeout.
pub fn poll_event(timeout: Duration) -> Option<Event> {
    if event::poll(timeout).ok()? {
        event::read().ok()
    } else {
        None
    }
}

/// Converts a crossterm event to an Action based on current app mode.
pub fn handle_event(event: Event, mode: &AppMode) -> Action {
    match event {
        Event::Key(key_event) => handle_key_event(key_event, mode),
        Event::Resize(width, height) => Action::Resize(width, height),
        _ => Action::None,
    }
}

/// Handles a key event based on the current application mode.
fn handle_key_event(key: KeyEvent, mode: &AppMode) -> Action {
    // Ctrl+C quits from any mode
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Action::Quit;
    }

    match mode {
        AppMode::Normal => handle_normal_mode(key),
        AppMode::Editing => handle_editing_mode(key),
        AppMode::Command(_) => handle_command_mode(key),
    }
}

/// Handles key events in normal mode.
fn handle_normal_mode(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => Action::SelectNext,
        KeyCode::Char('k') | KeyCode::Up => Action::SelectPrevious,
        KeyCode::Tab => Action::FocusNext,
        KeyCode::BackTab => Action::FocusPrevious,
        KeyCode::Char('i') | KeyCode::Enter => Action::StartEditing,
        KeyCode::Char(':') => Action::EnterCommandMode,
        _ => Action::None,
    }
}

/// Handles key events while typing into an input.
fn handle_editing_mode(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Esc => Action::StopEditing,
        KeyCode::Enter => Action::InputChar('\n'),
        KeyCode::Backspace => Action::InputBackspace,
        KeyCode::Char(c) => Action::InputChar(c),
        _ => Action::None,
    }
}

/// Handles key events in command mode.
fn handle_command_mode(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Enter => Action::ExecuteCommand,
        KeyCode::Esc => Action::CancelCommand,
        KeyCode::Backspace => Action::CommandBackspace,
        KeyCode::Char(c) => Action::CommandChar(c),
        _ => Action::None,
    }
}

/// Applies an action to the application state.
///
/// Returns `true` if the application should continue, `false` if it should quit.
pub fn apply_action(state: &mut AppState, action: Action) -> bool {
    match action {
        Action::None => {}
        Action::Quit => {
            state.should_quit = true;
        }
        Action::SelectNext => {
            state.select_next();
        }
        Action::SelectPrevious => {
            state.select_previous();
        }
        Action::FocusNext => {
            state.focus_next();
        }
        Action::FocusPrevious => {
            state.focus_previous();
        }
        Action::StartEditing => {
            state.start_editing();
        }
        Action::StopEditing => {
            state.stop_editing();
        }
        Action::InputChar(c) => {
            state.input_char(c);
        }
        Action::InputBackspace => {
            state.input_backspace();
        }
        Action::EnterCommandMode => {
            state.enter_command_mode();
        }
        Action::CommandChar(c) => {
            state.command_input(c);
        }
        Action::ExecuteCommand => {
            state.execute_command();
        }
        Action::CancelCommand => {
            state.cancel_command();
        }
        Action::CommandBackspace => {
            state.command_backspace();
        }
        Action::Resize(_, _) => {
            // Layout is recomputed from the frame on every draw
        }
    }

    !state.should_quit
}
