//! Conversion of raw codon usage text into table files.
//!
//! The input is the plain-text table published by the Kazusa codon usage
//! database:
//!
//! ```text
//! Homo sapiens [gbpri]: 93487 CDS's (40662582 codons)
//!
//! UUU F 0.46 17.6 (714298)  UCU S 0.19 15.2 (618711)  UAU Y 0.44 12.2 (495699)
//! UUC F 0.54 20.3 (824692)  UCC S 0.22 17.7 (718892)  UAC Y 0.56 15.3 (622407)
//! ```
//!
//! The species is taken from the first line (text before the first colon).
//! Every `TRIPLET AA FRACTION FREQUENCY (COUNT)` group on any line becomes
//! one record; a later group for the same triplet replaces an earlier one.

use log::{debug, warn};

use crate::codon::{Codon, CodonFrequencyTable, CodonRecord};
use crate::table_file::{to_table_string, TableFileResult};

/// Species name used when the first line has no `species:` prefix.
pub const DEFAULT_SPECIES: &str = "unknown_species";

/// Prefix of the file names of converted tables.
pub const ARTIFACT_PREFIX: &str = "Kazusa_codon_frequency_table_";

/// A converted table and the species it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedTable {
    pub species: String,
    pub table: CodonFrequencyTable,
}

impl ConvertedTable {
    /// File name of the converted table, e.g.
    /// `Kazusa_codon_frequency_table_Homo_sapiens_[gbpri].json`.
    pub fn artifact_name(&self) -> String {
        format!("{}{}.json", ARTIFACT_PREFIX, self.species)
    }

    /// Renders the table file content.
    pub fn to_json(&self) -> TableFileResult<String> {
        to_table_string(&self.table)
    }
}

/// Converts raw codon usage text into a table.
pub fn convert(raw: &str) -> ConvertedTable {
    let species = species_name(raw);
    let mut table = CodonFrequencyTable::new();

    for (line_idx, line) in raw.lines().enumerate() {
        for group in scan_line(line) {
            match group.to_record() {
                Some(record) => {
                    table.insert(record);
                }
                None => warn!(
                    "Skipping unparsable codon entry at line {}: '{}'",
                    line_idx + 1,
                    group.text
                ),
            }
        }
    }

    debug!("Converted {} codons for species {}", table.len(), species);
    ConvertedTable { species, table }
}

/// Extracts the species name from the first line.
///
/// Spaces and path separators are replaced by underscores so that the name
/// can be embedded in a file name.
pub fn species_name(raw: &str) -> String {
    let first_line = raw.lines().next().unwrap_or("").trim();
    match first_line.split_once(':') {
        Some((species, _)) if !species.trim().is_empty() => species
            .chars()
            .map(|c| if matches!(c, ' ' | '/' | '\\') { '_' } else { c })
            .collect(),
        _ => DEFAULT_SPECIES.to_string(),
    }
}

/// One `TRIPLET AA FRACTION FREQUENCY (COUNT)` group as found in the text.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CodonGroup<'a> {
    text: &'a str,
    triplet: &'a str,
    amino_acid: char,
    fraction: &'a str,
    frequency: &'a str,
    count: &'a str,
}

impl CodonGroup<'_> {
    fn to_record(&self) -> Option<CodonRecord> {
        Some(CodonRecord::new(
            Codon::parse(self.triplet).ok()?,
            self.amino_acid,
            self.fraction.parse().ok()?,
            self.frequency.parse().ok()?,
            self.count.parse().ok()?,
        ))
    }
}

/// Finds all non-overlapping codon groups of a line, left to right.
fn scan_line(line: &str) -> Vec<CodonGroup<'_>> {
    let mut groups = Vec::new();
    let mut pos = 0;

    while pos < line.len() {
        match match_group(line, pos) {
            Some((group, end)) => {
                groups.push(group);
                pos = end;
            }
            None => pos += 1,
        }
    }

    groups
}

/// Matches a codon group starting exactly at byte `start`.
fn match_group(line: &str, start: usize) -> Option<(CodonGroup<'_>, usize)> {
    let bytes = line.as_bytes();

    let triplet_end = start + 3;
    let triplet = bytes.get(start..triplet_end)?;
    if !triplet.iter().all(|b| matches!(b, b'A' | b'U' | b'G' | b'C')) {
        return None;
    }

    let mut pos = skip_whitespace(bytes, triplet_end, 1)?;
    let amino_acid = line[pos..].chars().next().filter(|c| !c.is_whitespace())?;
    pos += amino_acid.len_utf8();

    pos = skip_whitespace(bytes, pos, 1)?;
    let fraction_start = pos;
    pos = take_while(bytes, pos, |b| b.is_ascii_digit() || b == b'.')?;
    let fraction = &line[fraction_start..pos];

    pos = skip_whitespace(bytes, pos, 1)?;
    let frequency_start = pos;
    pos = take_while(bytes, pos, |b| b.is_ascii_digit() || b == b'.')?;
    let frequency = &line[frequency_start..pos];

    pos = skip_whitespace(bytes, pos, 1)?;
    if bytes.get(pos) != Some(&b'(') {
        return None;
    }
    pos = skip_whitespace(bytes, pos + 1, 0)?;
    let count_start = pos;
    pos = take_while(bytes, pos, |b| b.is_ascii_digit())?;
    let count = &line[count_start..pos];
    if bytes.get(pos) != Some(&b')') {
        return None;
    }
    let end = pos + 1;

    let group = CodonGroup {
        text: &line[start..end],
        triplet: &line[start..triplet_end],
        amino_acid,
        fraction,
        frequency,
        count,
    };
    Some((group, end))
}

/// Skips ASCII whitespace, requiring at least `min` bytes of it.
fn skip_whitespace(bytes: &[u8], pos: usize, min: usize) -> Option<usize> {
    let end = bytes[pos..]
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .map_or(bytes.len(), |n| pos + n);
    (end - pos >= min).then_some(end)
}

/// Consumes at least one byte matching `pred`.
fn take_while(bytes: &[u8], pos: usize, pred: impl Fn(u8) -> bool) -> Option<usize> {
    let end = bytes[pos..]
        .iter()
        .position(|&b| !pred(b))
        .map_or(bytes.len(), |n| pos + n);
    (end > pos).then_some(end)
}
