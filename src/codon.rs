//! Codon usage tables and their derived lookups.
//!
//! This module provides:
//! - `Codon`: a validated RNA triplet
//! - `CodonRecord` / `CodonFrequencyTable`: per-triplet usage statistics
//! - `CodonUsageTable`: synonymous codons grouped by amino acid
//! - `MaxFrequencyCodonTable` / `ForcedCodonTable`: amino acid to codon lookups

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Symbol used for translation stops in codon usage tables.
pub const STOP_SYMBOL: char = '*';

/// Errors raised while validating codons and amino-acid symbols.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodonError {
    #[error("Invalid codon '{0}': expected 3 nucleotides from A, U, G, C")]
    InvalidCodon(String),

    #[error("Invalid amino acid symbol '{0}': expected a single character")]
    InvalidAminoAcid(String),
}

/// An RNA triplet over the alphabet {A, U, G, C}.
///
/// Parsing is case-insensitive and accepts `T` in place of `U`, so DNA-style
/// codons can be used anywhere a codon is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Codon([u8; 3]);

impl Codon {
    /// Parses a codon from text.
    pub fn parse(text: &str) -> Result<Self, CodonError> {
        let bytes = text.as_bytes();
        if bytes.len() != 3 {
            return Err(CodonError::InvalidCodon(text.to_string()));
        }

        let mut codon = [0u8; 3];
        for (slot, &b) in codon.iter_mut().zip(bytes) {
            *slot = match b.to_ascii_uppercase() {
                b'T' | b'U' => b'U',
                n @ (b'A' | b'C' | b'G') => n,
                _ => return Err(CodonError::InvalidCodon(text.to_string())),
            };
        }
        Ok(Self(codon))
    }

    /// Returns the codon as an uppercase RNA string slice.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).expect("codon bytes are always ASCII nucleotides")
    }
}

impl FromStr for Codon {
    type Err = CodonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Codon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses an amino-acid symbol: exactly one non-whitespace character.
///
/// The symbol is uppercased so that user-provided overrides line up with the
/// uppercased protein sequence.
pub fn parse_amino_acid(text: &str) -> Result<char, CodonError> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if !c.is_whitespace() => Ok(c.to_ascii_uppercase()),
        _ => Err(CodonError::InvalidAminoAcid(text.to_string())),
    }
}

/// Usage statistics for a single codon.
#[derive(Debug, Clone, PartialEq)]
pub struct CodonRecord {
    pub triplet: Codon,
    /// One-letter amino acid, or `*` for stop codons
    pub amino_acid: char,
    /// Share of this codon among its synonymous codons (0.0 - 1.0)
    pub fraction: f64,
    /// Occurrences per thousand codons
    pub frequency: f64,
    /// Absolute number of occurrences
    pub count: u64,
}

impl CodonRecord {
    pub fn new(triplet: Codon, amino_acid: char, fraction: f64, frequency: f64, count: u64) -> Self {
        Self {
            triplet,
            amino_acid,
            fraction,
            frequency,
            count,
        }
    }
}

/// Codon usage records keyed by triplet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CodonFrequencyTable {
    records: BTreeMap<Codon, CodonRecord>,
}

impl CodonFrequencyTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record, replacing any previous record for the same triplet.
    pub fn insert(&mut self, record: CodonRecord) -> Option<CodonRecord> {
        self.records.insert(record.triplet, record)
    }

    /// Gets the record of a triplet.
    pub fn get(&self, triplet: &Codon) -> Option<&CodonRecord> {
        self.records.get(triplet)
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the table has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates records in triplet order.
    pub fn records(&self) -> impl Iterator<Item = &CodonRecord> {
        self.records.values()
    }

    /// Returns the records ordered by amino acid, then triplet.
    pub fn records_by_amino_acid(&self) -> Vec<&CodonRecord> {
        let mut records: Vec<&CodonRecord> = self.records.values().collect();
        records.sort_by(|a, b| {
            a.amino_acid
                .cmp(&b.amino_acid)
                .then_with(|| a.triplet.cmp(&b.triplet))
        });
        records
    }
}

impl FromIterator<CodonRecord> for CodonFrequencyTable {
    fn from_iter<I: IntoIterator<Item = CodonRecord>>(iter: I) -> Self {
        let mut table = Self::new();
        for record in iter {
            table.insert(record);
        }
        table
    }
}

/// Synonymous codons and their fractions, grouped by amino acid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CodonUsageTable {
    usage: BTreeMap<char, Vec<(Codon, f64)>>,
}

impl CodonUsageTable {
    /// Gets the (codon, fraction) pairs for an amino acid, in triplet order.
    pub fn codons(&self, amino_acid: char) -> Option<&[(Codon, f64)]> {
        self.usage.get(&amino_acid).map(Vec::as_slice)
    }

    /// Iterates amino acids with their synonymous codons.
    pub fn iter(&self) -> impl Iterator<Item = (char, &[(Codon, f64)])> {
        self.usage.iter().map(|(&aa, codons)| (aa, codons.as_slice()))
    }

    /// Returns the number of amino acids in the table.
    pub fn len(&self) -> usize {
        self.usage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.usage.is_empty()
    }
}

/// Amino acid to codon lookup used by reverse translation.
///
/// Both the frequency-optimal table and the user overrides share this shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodonAssignment {
    codons: BTreeMap<char, Codon>,
}

/// The most frequent codon of every amino acid in a table.
pub type MaxFrequencyCodonTable = CodonAssignment;

/// User overrides taking precedence over the frequency-optimal codons.
pub type ForcedCodonTable = CodonAssignment;

impl CodonAssignment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns a codon to an amino acid, returning the previous assignment.
    pub fn insert(&mut self, amino_acid: char, codon: Codon) -> Option<Codon> {
        self.codons.insert(amino_acid, codon)
    }

    pub fn get(&self, amino_acid: char) -> Option<Codon> {
        self.codons.get(&amino_acid).copied()
    }

    pub fn contains(&self, amino_acid: char) -> bool {
        self.codons.contains_key(&amino_acid)
    }

    pub fn len(&self) -> usize {
        self.codons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codons.is_empty()
    }

    /// Iterates assignments in amino-acid order.
    pub fn iter(&self) -> impl Iterator<Item = (char, Codon)> + '_ {
        self.codons.iter().map(|(&aa, &codon)| (aa, codon))
    }
}

impl FromIterator<(char, Codon)> for CodonAssignment {
    fn from_iter<I: IntoIterator<Item = (char, Codon)>>(iter: I) -> Self {
        Self {
            codons: iter.into_iter().collect(),
        }
    }
}

/// Groups the records of a frequency table by amino acid.
pub fn derive_usage_table(table: &CodonFrequencyTable) -> CodonUsageTable {
    let mut usage: BTreeMap<char, Vec<(Codon, f64)>> = BTreeMap::new();
    for record in table.records() {
        usage
            .entry(record.amino_acid)
            .or_default()
            .push((record.triplet, record.fraction));
    }
    CodonUsageTable { usage }
}

/// Selects the codon with the largest fraction for every amino acid.
///
/// Ties go to the lexicographically smallest triplet.
pub fn derive_max_frequency_table(usage: &CodonUsageTable) -> MaxFrequencyCodonTable {
    usage
        .iter()
        .filter_map(|(aa, codons)| {
            let mut best: Option<(Codon, f64)> = None;
            for &(codon, fraction) in codons {
                best = match best {
                    Some((best_codon, best_fraction))
                        if best_fraction > fraction
                            || (best_fraction == fraction && best_codon <= codon) =>
                    {
                        Some((best_codon, best_fraction))
                    }
                    _ => Some((codon, fraction)),
                };
            }
            best.map(|(codon, _)| (aa, codon))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codon(s: &str) -> Codon {
        Codon::parse(s).unwrap()
    }

    fn record(triplet: &str, aa: char, fraction: f64) -> CodonRecord {
        CodonRecord::new(codon(triplet), aa, fraction, 0.0, 0)
    }

    #[test]
    fn test_codon_parse() {
        assert_eq!(codon("AUG").as_str(), "AUG");
        assert_eq!(codon("aug").as_str(), "AUG");
        // DNA-style input is converted to RNA
        assert_eq!(codon("ATG").as_str(), "AUG");
        assert_eq!(codon("ttt").to_string(), "UUU");
    }

    #[test]
    fn test_codon_parse_invalid() {
        assert!(matches!(Codon::parse("AU"), Err(CodonError::InvalidCodon(_))));
        assert!(matches!(Codon::parse("AUGC"), Err(CodonError::InvalidCodon(_))));
        assert!(matches!(Codon::parse("AUN"), Err(CodonError::InvalidCodon(_))));
        assert!(matches!(Codon::parse(""), Err(CodonError::InvalidCodon(_))));
    }

    #[test]
    fn test_parse_amino_acid() {
        assert_eq!(parse_amino_acid("M"), Ok('M'));
        assert_eq!(parse_amino_acid("m"), Ok('M'));
        assert_eq!(parse_amino_acid("*"), Ok('*'));
        assert!(parse_amino_acid("Met").is_err());
        assert!(parse_amino_acid("").is_err());
        assert!(parse_amino_acid(" ").is_err());
    }

    #[test]
    fn test_frequency_table_overwrites_triplet() {
        let mut table = CodonFrequencyTable::new();
        table.insert(record("AUG", 'M', 0.5));
        let previous = table.insert(record("AUG", 'M', 1.0));

        assert_eq!(previous.map(|r| r.fraction), Some(0.5));
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(&codon("AUG")).unwrap().fraction, 1.0);
    }

    #[test]
    fn test_records_by_amino_acid() {
        let table: CodonFrequencyTable = [
            record("UAA", '*', 0.3),
            record("GCU", 'A', 0.2),
            record("AUG", 'M', 1.0),
            record("GCC", 'A', 0.4),
        ]
        .into_iter()
        .collect();

        let order: Vec<&str> = table
            .records_by_amino_acid()
            .iter()
            .map(|r| r.triplet.as_str())
            .collect();
        assert_eq!(order, vec!["UAA", "GCC", "GCU", "AUG"]);
    }

    #[test]
    fn test_usage_table_grouping() {
        let table: CodonFrequencyTable = [
            record("GCU", 'A', 0.26),
            record("GCC", 'A', 0.40),
            record("AUG", 'M', 1.00),
        ]
        .into_iter()
        .collect();

        let usage = derive_usage_table(&table);
        assert_eq!(usage.len(), 2);
        assert_eq!(
            usage.codons('A').unwrap(),
            &[(codon("GCC"), 0.40), (codon("GCU"), 0.26)]
        );
        assert_eq!(usage.codons('M').unwrap(), &[(codon("AUG"), 1.00)]);
        assert!(usage.codons('W').is_none());
    }

    #[test]
    fn test_max_frequency_selection() {
        let table: CodonFrequencyTable = [
            record("GCA", 'A', 0.23),
            record("GCC", 'A', 0.40),
            record("GCG", 'A', 0.11),
            record("GCU", 'A', 0.26),
            record("UAA", '*', 0.30),
            record("UAG", '*', 0.24),
            record("UGA", '*', 0.47),
        ]
        .into_iter()
        .collect();

        let max = derive_max_frequency_table(&derive_usage_table(&table));
        assert_eq!(max.get('A'), Some(codon("GCC")));
        assert_eq!(max.get('*'), Some(codon("UGA")));
        assert_eq!(max.len(), 2);
    }

    #[test]
    fn test_max_frequency_tie_breaks_to_smallest_triplet() {
        let table: CodonFrequencyTable = [
            record("UUU", 'F', 0.5),
            record("UUC", 'F', 0.5),
        ]
        .into_iter()
        .collect();

        let max = derive_max_frequency_table(&derive_usage_table(&table));
        assert_eq!(max.get('F'), Some(codon("UUC")));
    }

    #[test]
    fn test_max_frequency_empty_table() {
        let max = derive_max_frequency_table(&derive_usage_table(&CodonFrequencyTable::new()));
        assert!(max.is_empty());
    }
}
