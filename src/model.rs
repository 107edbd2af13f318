//! Data model for the reverse translation workbench.
//!
//! This module contains:
//! - `Sequence`: a named protein or RNA sequence
//! - `AppState`: the interactive state (selected table, inputs, output)
//!
//! The output is recomputed from the inputs after every change, so the
//! state never holds a stale translation.

use std::fs::File;
use std::io::{BufWriter, Write};

use crate::codon::ForcedCodonTable;
use crate::formats::fasta::write_fasta;
use crate::tables::{CodonTables, LoadedTable};
use crate::translate::{parse_forced_codons, translate_or_placeholder, Translation};

/// Line width used when the workbench writes FASTA output.
pub const OUTPUT_LINE_WIDTH: usize = 60;

/// Represents a single sequence with its identifier and data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    /// The sequence identifier (from FASTA header, without '>')
    pub id: String,
    /// The sequence data (amino acids or nucleotides)
    pub data: String,
}

impl Sequence {
    /// Creates a new sequence.
    pub fn new(id: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            data: data.into(),
        }
    }

    /// Returns the length of the sequence.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Which panel receives navigation and edit keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Tables,
    Protein,
    Forced,
}

impl Focus {
    /// The next panel in Tab order.
    pub fn next(self) -> Self {
        match self {
            Focus::Tables => Focus::Protein,
            Focus::Protein => Focus::Forced,
            Focus::Forced => Focus::Tables,
        }
    }

    /// The previous panel in Tab order.
    pub fn previous(self) -> Self {
        match self {
            Focus::Tables => Focus::Forced,
            Focus::Protein => Focus::Tables,
            Focus::Forced => Focus::Protein,
        }
    }
}

/// Application mode for handling different input states.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AppMode {
    /// Normal navigation mode
    #[default]
    Normal,
    /// Typing into the focused input
    Editing,
    /// Command input mode (after pressing ':')
    Command(String),
}

/// The complete application state.
#[derive(Debug)]
pub struct AppState<'t> {
    /// The reference tables, loaded at startup
    pub tables: &'t CodonTables,
    /// Index of the selected table in `tables.names()`
    pub selected: usize,
    /// Protein input
    pub protein: String,
    /// Forced codon input (`AMINO_ACID TRIPLET` lines)
    pub forced: String,
    /// Current reverse translation of `protein`
    pub output: Translation,
    /// Number of forced codon lines that were skipped
    pub skipped_forced_lines: usize,
    /// Panel with keyboard focus
    pub focus: Focus,
    /// Current application mode
    pub mode: AppMode,
    /// Whether the application should quit
    pub should_quit: bool,
    /// Status message to display
    pub status_message: Option<String>,
}

impl<'t> AppState<'t> {
    /// Creates a new application state over the loaded tables.
    pub fn new(tables: &'t CodonTables) -> Self {
        let status_message = match tables.failures().count() {
            0 if tables.is_empty() => Some("No codon tables loaded".to_string()),
            0 => None,
            n => Some(format!("{} table(s) failed to load", n)),
        };
        let mut state = Self {
            tables,
            selected: 0,
            protein: String::new(),
            forced: String::new(),
            output: Translation::default(),
            skipped_forced_lines: 0,
            focus: Focus::default(),
            mode: AppMode::Normal,
            should_quit: false,
            status_message,
        };
        state.retranslate();
        state
    }

    /// Returns the selected table, if any table is loaded.
    pub fn selected_table(&self) -> Option<&'t LoadedTable> {
        let name = *self.tables.names().get(self.selected)?;
        self.tables.get(name)
    }

    /// Recomputes the output from the current inputs and selection.
    pub fn retranslate(&mut self) {
        let (forced, errors) = parse_forced_codons(&self.forced);
        self.skipped_forced_lines = errors.len();

        self.output = match self.selected_table() {
            Some(table) => translate_or_placeholder(&self.protein, &table.max_frequency, &forced),
            None => translate_or_placeholder(&self.protein, &ForcedCodonTable::new(), &forced),
        };
    }

    /// Summary of what the last translation ignored.
    pub fn translation_notes(&self) -> Option<String> {
        let mut notes = Vec::new();
        if !self.output.dropped.is_empty() {
            notes.push(format!("{} character(s) dropped", self.output.dropped.len()));
        }
        if self.skipped_forced_lines > 0 {
            notes.push(format!("{} forced line(s) skipped", self.skipped_forced_lines));
        }
        (!notes.is_empty()).then(|| notes.join(", "))
    }

    /// Switches to the table at `idx`. A message about the previous
    /// table no longer applies, so it gives way to the translation notes.
    fn change_table(&mut self, idx: usize) {
        self.selected = idx;
        self.status_message = None;
        self.retranslate();
    }

    /// Selects the next table.
    pub fn select_next(&mut self) {
        if self.selected + 1 < self.tables.len() {
            self.change_table(self.selected + 1);
        }
    }

    /// Selects the previous table.
    pub fn select_previous(&mut self) {
        if self.selected > 0 {
            self.change_table(self.selected - 1);
        }
    }

    /// Selects a table by name.
    pub fn select_by_name(&mut self, name: &str) -> bool {
        match self.tables.names().iter().position(|n| *n == name) {
            Some(idx) => {
                self.change_table(idx);
                true
            }
            None => false,
        }
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_previous(&mut self) {
        self.focus = self.focus.previous();
    }

    /// Starts editing the focused input. The table list is not editable.
    pub fn start_editing(&mut self) {
        if self.focus != Focus::Tables {
            self.mode = AppMode::Editing;
            self.status_message = None;
        }
    }

    pub fn stop_editing(&mut self) {
        self.mode = AppMode::Normal;
    }

    fn focused_input(&mut self) -> Option<&mut String> {
        match self.focus {
            Focus::Tables => None,
            Focus::Protein => Some(&mut self.protein),
            Focus::Forced => Some(&mut self.forced),
        }
    }

    /// Appends a character to the focused input.
    pub fn input_char(&mut self, c: char) {
        if let Some(input) = self.focused_input() {
            input.push(c);
            self.retranslate();
        }
    }

    /// Removes the last character of the focused input.
    pub fn input_backspace(&mut self) {
        if let Some(input) = self.focused_input() {
            if input.pop().is_some() {
                self.retranslate();
            }
        }
    }

    /// Clears both inputs.
    pub fn clear_inputs(&mut self) {
        self.protein.clear();
        self.forced.clear();
        self.retranslate();
    }

    /// Enters command mode.
    pub fn enter_command_mode(&mut self) {
        self.mode = AppMode::Command(String::new());
    }

    /// Handles a character input in command mode.
    pub fn command_input(&mut self, c: char) {
        if let AppMode::Command(ref mut cmd) = self.mode {
            cmd.push(c);
        }
    }

    /// Handles backspace in command mode.
    pub fn command_backspace(&mut self) {
        if let AppMode::Command(ref mut cmd) = self.mode {
            cmd.pop();
            if cmd.is_empty() {
                self.mode = AppMode::Normal;
            }
        }
    }

    /// Executes the current command.
    pub fn execute_command(&mut self) {
        if let AppMode::Command(cmd) = std::mem::take(&mut self.mode) {
            let cmd = cmd.trim();
            match cmd.split_once(char::is_whitespace) {
                _ if cmd == "q" || cmd == "quit" => self.should_quit = true,
                _ if cmd == "clear" => self.clear_inputs(),
                Some(("w", path)) => self.write_output(path.trim()),
                None if cmd == "w" => {
                    self.status_message = Some("Usage: :w <path>".to_string());
                }
                _ => {
                    if !self.select_by_name(cmd) {
                        self.status_message = Some(format!("Unknown command or table: {}", cmd));
                    }
                }
            }
        }
        self.mode = AppMode::Normal;
    }

    /// Cancels command mode and returns to normal mode.
    pub fn cancel_command(&mut self) {
        self.mode = AppMode::Normal;
    }

    /// Writes the current RNA as FASTA.
    fn write_output(&mut self, path: &str) {
        let id = self
            .selected_table()
            .map_or_else(|| "reverse_translation".to_string(), |t| format!("reverse_translation_{}", t.name));
        let record = [Sequence::new(id, self.output.rna.clone())];

        let result = File::create(path).and_then(|file| {
            let mut writer = BufWriter::new(file);
            write_fasta(&mut writer, &record, OUTPUT_LINE_WIDTH)?;
            writer.flush()
        });
        self.status_message = Some(match result {
            Ok(()) => format!("Wrote {} codons to {}", self.output.codons, path),
            Err(e) => format!("Failed to write {}: {}", path, e),
        });
    }
}
