//! FASTA reading and writing.
//!
//! ## FASTA Format
//!
//! ```text
//! >sequence_identifier optional description
//! MKTAYIAKQRQISFVKSHFSRQ...
//! >another_sequence
//! MSDNELLK...
//! ```

use std::io::{self, Write};

use thiserror::Error;

use crate::model::Sequence;

/// Errors that can occur during FASTA parsing.
#[derive(Error, Debug)]
pub enum FastaError {
    #[error("Empty FASTA input")]
    EmptyFile,

    #[error("Invalid FASTA format: {0}")]
    InvalidFormat(String),

    #[error("Sequence without header at line {0}")]
    SequenceWithoutHeader(usize),
}

/// Result type for FASTA operations.
pub type FastaResult<T> = Result<T, FastaError>;

/// Parses FASTA content from a string.
///
/// Multi-line sequences are joined; whitespace inside sequence lines is
/// removed. Records without sequence data are kept with an empty sequence.
pub fn parse_fasta_str(content: &str) -> FastaResult<Vec<Sequence>> {
    let mut sequences = Vec::new();
    let mut current: Option<Sequence> = None;

    for (idx, line) in content.lines().enumerate() {
        let line_number = idx + 1;
        let line = line.trim();

        // Skip empty lines
        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix('>') {
            if let Some(seq) = current.take() {
                sequences.push(seq);
            }

            // Take everything before first space as ID
            let id = header.split_whitespace().next().unwrap_or("");
            if id.is_empty() {
                return Err(FastaError::InvalidFormat(format!(
                    "Empty sequence identifier at line {}",
                    line_number
                )));
            }
            current = Some(Sequence::new(id, String::new()));
        } else {
            let seq = current
                .as_mut()
                .ok_or(FastaError::SequenceWithoutHeader(line_number))?;
            seq.data.extend(line.chars().filter(|c| !c.is_whitespace()));
        }
    }

    // Don't forget the last sequence
    sequences.extend(current);

    if sequences.is_empty() {
        return Err(FastaError::EmptyFile);
    }
    Ok(sequences)
}

/// Writes sequences as FASTA, wrapping data lines at `line_width` characters.
///
/// A width of 0 writes each sequence on a single line.
pub fn write_fasta<W: Write>(writer: &mut W, sequences: &[Sequence], line_width: usize) -> io::Result<()> {
    for seq in sequences {
        writeln!(writer, ">{}", seq.id)?;
        for line in wrap_sequence(&seq.data, line_width) {
            writeln!(writer, "{}", line)?;
        }
    }
    Ok(())
}

/// Splits sequence data into lines of at most `width` characters.
pub fn wrap_sequence(data: &str, width: usize) -> Vec<String> {
    if data.is_empty() {
        return Vec::new();
    }
    if width == 0 {
        return vec![data.to_string()];
    }
    let options = textwrap::Options::new(width).break_words(true);
    textwrap::wrap(data, options)
        .into_iter()
        .map(|line| line.into_owned())
        .collect()
}
