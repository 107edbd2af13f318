//! TUI rendering module.
//!
//! Layout:
//! - codon tables list on the left
//! - protein input, forced codon input and RNA output stacked on the right
//! - status bar with mode, messages and codon counts

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::formats::fasta::wrap_sequence;
use crate::model::{AppMode, AppState, Focus};

/// Width reserved for the table list (including border).
const TABLES_PANEL_WIDTH: u16 = 28;
/// Height of the status bar.
const STATUS_BAR_HEIGHT: u16 = 1;

/// Color scheme for RNA nucleotides.
pub fn nucleotide_color(c: char) -> Color {
    match c.to_ascii_uppercase() {
        'A' => Color::Red,
        'C' => Color::Green,
        'G' => Color::Yellow,
        'U' | 'T' => Color::Blue,
        _ => Color::DarkGray,
    }
}

/// Widest line, in characters, that holds whole codons within `inner_width`.
pub fn codon_line_width(inner_width: u16) -> usize {
    let width = inner_width as usize;
    (width - width % 3).max(3)
}

/// Renders the complete UI.
pub fn render(frame: &mut Frame, state: &AppState) {
    let area = frame.area();

    // Main layout: content area + status bar
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(STATUS_BAR_HEIGHT)])
        .split(area);

    let content_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(TABLES_PANEL_WIDTH), Constraint::Min(10)])
        .split(main_layout[0]);

    let io_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Percentage(20),
            Constraint::Min(3),
        ])
        .split(content_layout[1]);

    render_tables_panel(frame, state, content_layout[0]);
    render_input(frame, state, io_layout[0], Focus::Protein, "Protein", &state.protein);
    render_input(frame, state, io_layout[1], Focus::Forced, "Forced codons (AA CODON)", &state.forced);
    render_output(frame, state, io_layout[2]);
    render_status_bar(frame, state, main_layout[1]);
}

fn panel_block(state: &AppState, panel: Focus, title: String) -> Block<'static> {
    let border_style = match (&state.mode, state.focus == panel) {
        (AppMode::Editing, true) => Style::default().fg(Color::Yellow),
        (_, true) => Style::default().fg(Color::Cyan),
        _ => Style::default(),
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title)
}

/// Renders the list of loaded codon tables.
fn render_tables_panel(frame: &mut Frame, state: &AppState, area: Rect) {
    let max_name_len = (TABLES_PANEL_WIDTH.saturating_sub(4)) as usize;
    let visible_rows = area.height.saturating_sub(2) as usize;
    // Keep the selection in view
    let first_row = (state.selected + 1).saturating_sub(visible_rows);

    let lines: Vec<Line> = state
        .tables
        .iter()
        .enumerate()
        .skip(first_row)
        .take(visible_rows)
        .map(|(idx, table)| {
            let marker = if table.is_failed() { "!" } else { " " };
            let name = if table.name.chars().count() > max_name_len {
                let truncated: String = table.name.chars().take(max_name_len - 1).collect();
                format!("{}{}…", marker, truncated)
            } else {
                format!("{}{}", marker, table.name)
            };

            let style = if idx == state.selected {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::White)
                    .add_modifier(Modifier::BOLD)
            } else if table.is_failed() {
                Style::default().fg(Color::Red)
            } else {
                Style::default().fg(Color::White)
            };
            Line::from(Span::styled(name, style))
        })
        .collect();

    let title = format!("Codon tables ({})", state.tables.len());
    let paragraph = Paragraph::new(lines).block(panel_block(state, Focus::Tables, title));
    frame.render_widget(paragraph, area);
}

/// Renders an editable text input.
fn render_input(frame: &mut Frame, state: &AppState, area: Rect, panel: Focus, title: &str, text: &str) {
    let mut content = text.to_string();
    if state.mode == AppMode::Editing && state.focus == panel {
        content.push('▏');
    }
    let paragraph = Paragraph::new(content)
        .wrap(Wrap { trim: false })
        .block(panel_block(state, panel, title.to_string()));
    frame.render_widget(paragraph, area);
}

/// Renders the RNA output, wrapped on codon boundaries.
fn render_output(frame: &mut Frame, state: &AppState, area: Rect) {
    let width = codon_line_width(area.width.saturating_sub(2));
    let lines: Vec<Line> = wrap_sequence(&state.output.rna, width)
        .into_iter()
        .map(|line| {
            let spans: Vec<Span> = line
                .chars()
                .map(|c| Span::styled(c.to_string(), Style::default().fg(nucleotide_color(c))))
                .collect();
            Line::from(spans)
        })
        .collect();

    let title = match state.selected_table() {
        Some(table) => format!("RNA [{} | {} codons]", table.name, state.output.codons),
        None => format!("RNA [no table | {} codons]", state.output.codons),
    };
    let block = Block::default().borders(Borders::ALL).title(title);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Renders the status bar at the bottom.
fn render_status_bar(frame: &mut Frame, state: &AppState, area: Rect) {
    let (mode_str, command_str) = match &state.mode {
        AppMode::Normal => ("NORMAL", String::new()),
        AppMode::Editing => ("EDIT", String::new()),
        AppMode::Command(cmd) => ("COMMAND", format!(":{}", cmd)),
    };

    let notes = state.translation_notes();
    let message = state
        .status_message
        .as_deref()
        .or(notes.as_deref())
        .unwrap_or("");

    let left_content = if command_str.is_empty() {
        format!(" {} | {} ", mode_str, message)
    } else {
        format!(" {} | {} ", mode_str, command_str)
    };
    let right_content = format!(
        "{} aa | {} nt ",
        state.output.codons,
        state.output.codons * 3
    );

    let padding = (area.width as usize)
        .saturating_sub(left_content.chars().count() + right_content.chars().count());
    let status_line = Line::from(vec![
        Span::styled(left_content, Style::default().fg(Color::Black).bg(Color::Cyan)),
        Span::styled(" ".repeat(padding), Style::default().bg(Color::Cyan)),
        Span::styled(
            right_content,
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
    ]);

    frame.render_widget(Paragraph::new(status_line), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nucleotide_colors() {
        assert_eq!(nucleotide_color('A'), Color::Red);
        assert_eq!(nucleotide_color('a'), Color::Red); // Case insensitive
        assert_eq!(nucleotide_color('C'), Color::Green);
        assert_eq!(nucleotide_color('G'), Color::Yellow);
        assert_eq!(nucleotide_color('U'), Color::Blue);
        assert_eq!(nucleotide_color('E'), Color::DarkGray);
    }

    #[test]
    fn test_codon_line_width() {
        assert_eq!(codon_line_width(80), 78);
        assert_eq!(codon_line_width(9), 9);
        assert_eq!(codon_line_width(1), 3);
    }
}
