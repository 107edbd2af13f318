//! Protein input parsing.
//!
//! Protein input is either:
//! - FASTA (first non-empty line starts with `>`), one sequence per record
//! - raw text, taken as a single sequence named `sequence`
//!
//! Raw text is kept verbatim; filtering non amino-acid characters is left to
//! the reverse translator.

pub mod fasta;

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::model::Sequence;

/// Identifier given to raw (non-FASTA) protein input.
pub const RAW_SEQUENCE_ID: &str = "sequence";

/// Detected protein input format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Fasta,
    Raw,
}

impl std::fmt::Display for InputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputFormat::Fasta => write!(f, "FASTA"),
            InputFormat::Raw => write!(f, "raw"),
        }
    }
}

/// Errors that can occur while reading protein input.
#[derive(Error, Debug)]
pub enum InputError {
    #[error("Failed to read input: {0}")]
    IoError(#[from] std::io::Error),

    #[error("FASTA error: {0}")]
    FastaError(#[from] fasta::FastaError),
}

/// Result type for input parsing.
pub type InputResult<T> = Result<T, InputError>;

/// Detects the input format from the first non-empty line.
pub fn detect_format(content: &str) -> InputFormat {
    match content.lines().map(str::trim).find(|line| !line.is_empty()) {
        Some(line) if line.starts_with('>') => InputFormat::Fasta,
        _ => InputFormat::Raw,
    }
}

/// Parses protein input text into sequences.
pub fn parse_protein_str(content: &str) -> InputResult<Vec<Sequence>> {
    match detect_format(content) {
        InputFormat::Fasta => Ok(fasta::parse_fasta_str(content)?),
        InputFormat::Raw => Ok(vec![Sequence::new(RAW_SEQUENCE_ID, content)]),
    }
}

/// Reads and parses a protein input file.
pub fn parse_protein_file<P: AsRef<Path>>(path: P) -> InputResult<Vec<Sequence>> {
    let content = fs::read_to_string(path)?;
    parse_protein_str(&content)
}
