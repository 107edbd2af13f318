//! Reverse translation of protein sequences.
//!
//! Each amino acid is replaced by its forced codon if one was given,
//! otherwise by the most frequent codon of the selected table. Characters
//! that neither table knows are filtered out before translation.

use log::{error, warn};
use thiserror::Error;

use crate::codon::{parse_amino_acid, Codon, CodonError, ForcedCodonTable, MaxFrequencyCodonTable};

/// Text shown in place of the RNA when translation fails.
pub const ERROR_PLACEHOLDER: &str = "Error: Invalid input";

/// Errors that can occur during reverse translation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslateError {
    #[error("Invalid amino acid: {symbol} at position {position}")]
    InvalidAminoAcid { symbol: char, position: usize },
}

/// A malformed line of forced codon input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ForcedCodonError {
    #[error("Invalid format in forced codons at line {line}: '{text}'")]
    InvalidFormat { line: usize, text: String },

    #[error("Invalid forced codon at line {line}: {source}")]
    InvalidCodon {
        line: usize,
        #[source]
        source: CodonError,
    },
}

/// A character removed from the protein before translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DroppedChar {
    /// 0-based character position in the original input
    pub position: usize,
    pub symbol: char,
}

/// Result of a reverse translation, with the characters that were filtered out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Translation {
    pub rna: String,
    /// Number of amino acids translated
    pub codons: usize,
    /// Non-whitespace characters absent from both tables
    pub dropped: Vec<DroppedChar>,
}

/// Parses forced codons from `AMINO_ACID TRIPLET` lines.
///
/// Blank lines are ignored. Malformed lines are logged and skipped; they are
/// also returned so that interactive callers can report them.
pub fn parse_forced_codons(text: &str) -> (ForcedCodonTable, Vec<ForcedCodonError>) {
    let mut forced = ForcedCodonTable::new();
    let mut errors = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_forced_line(idx + 1, line) {
            Ok((aa, codon)) => {
                forced.insert(aa, codon);
            }
            Err(e) => {
                warn!("{}", e);
                errors.push(e);
            }
        }
    }

    (forced, errors)
}

fn parse_forced_line(line_number: usize, line: &str) -> Result<(char, Codon), ForcedCodonError> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let [aa, codon] = parts.as_slice() else {
        return Err(ForcedCodonError::InvalidFormat {
            line: line_number,
            text: line.trim().to_string(),
        });
    };

    let invalid = |source| ForcedCodonError::InvalidCodon {
        line: line_number,
        source,
    };
    let aa = parse_amino_acid(aa).map_err(invalid)?;
    let codon = Codon::parse(codon).map_err(invalid)?;
    Ok((aa, codon))
}

/// Reverse-translates a protein and reports the characters it dropped.
pub fn translate_detailed(
    protein: &str,
    primary: &MaxFrequencyCodonTable,
    forced: &ForcedCodonTable,
) -> Result<Translation, TranslateError> {
    let mut translation = Translation::default();

    let kept: Vec<(usize, char)> = protein
        .chars()
        .map(|c| c.to_ascii_uppercase())
        .enumerate()
        .filter(|&(position, c)| {
            let known = primary.contains(c) || forced.contains(c);
            if !known && !c.is_whitespace() {
                translation.dropped.push(DroppedChar { position, symbol: c });
            }
            known
        })
        .collect();

    translation.rna.reserve(kept.len() * 3);
    for (position, aa) in kept {
        let codon = forced
            .get(aa)
            .or_else(|| primary.get(aa))
            .ok_or(TranslateError::InvalidAminoAcid { symbol: aa, position })?;
        translation.rna.push_str(codon.as_str());
        translation.codons += 1;
    }

    Ok(translation)
}

/// Reverse-translates a protein into RNA.
///
/// # Examples
///
/// ```
/// use revtrans::codon::{Codon, ForcedCodonTable, MaxFrequencyCodonTable};
/// use revtrans::translate::translate;
///
/// let primary: MaxFrequencyCodonTable = [
///     ('M', Codon::parse("AUG").unwrap()),
///     ('*', Codon::parse("UAA").unwrap()),
/// ]
/// .into_iter()
/// .collect();
///
/// let rna = translate("M*", &primary, &ForcedCodonTable::new()).unwrap();
/// assert_eq!(rna, "AUGUAA");
/// ```
pub fn translate(
    protein: &str,
    primary: &MaxFrequencyCodonTable,
    forced: &ForcedCodonTable,
) -> Result<String, TranslateError> {
    translate_detailed(protein, primary, forced).map(|t| t.rna)
}

/// Reverse-translates a protein, replacing any failure by `ERROR_PLACEHOLDER`.
pub fn translate_or_placeholder(
    protein: &str,
    primary: &MaxFrequencyCodonTable,
    forced: &ForcedCodonTable,
) -> Translation {
    translate_detailed(protein, primary, forced).unwrap_or_else(|e| {
        error!("{}", e);
        Translation {
            rna: ERROR_PLACEHOLDER.to_string(),
            ..Translation::default()
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(pairs: &[(char, &str)]) -> MaxFrequencyCodonTable {
        pairs
            .iter()
            .map(|&(aa, codon)| (aa, Codon::parse(codon).unwrap()))
            .collect()
    }

    #[test]
    fn test_empty_protein() {
        let primary = table(&[('M', "AUG")]);
        assert_eq!(translate("", &primary, &ForcedCodonTable::new()).unwrap(), "");
    }

    #[test]
    fn test_stop_codon() {
        let primary = table(&[('M', "AUG"), ('*', "UAA")]);
        assert_eq!(translate("M*", &primary, &ForcedCodonTable::new()).unwrap(), "AUGUAA");
    }

    #[test]
    fn test_forced_codon_wins() {
        let primary = table(&[('A', "GCU")]);
        let forced = table(&[('A', "GCC")]);
        assert_eq!(translate("A", &primary, &forced).unwrap(), "GCC");
    }

    #[test]
    fn test_forced_only_amino_acid() {
        // Amino acids known only to the forced table still translate
        let primary = table(&[('M', "AUG")]);
        let forced = table(&[('W', "UGG")]);
        assert_eq!(translate("MW", &primary, &forced).unwrap(), "AUGUGG");
    }

    #[test]
    fn test_lowercase_input() {
        let primary = table(&[('M', "AUG"), ('K', "AAG")]);
        assert_eq!(translate("mk", &primary, &ForcedCodonTable::new()).unwrap(), "AUGAAG");
    }

    #[test]
    fn test_unknown_characters_are_dropped() {
        let primary = table(&[('M', "AUG"), ('K', "AAG")]);
        let result = translate_detailed("M-K1\n K", &primary, &ForcedCodonTable::new()).unwrap();

        assert_eq!(result.rna, "AUGAAGAAG");
        assert_eq!(result.codons, 3);
        assert_eq!(
            result.dropped,
            vec![
                DroppedChar { position: 1, symbol: '-' },
                DroppedChar { position: 3, symbol: '1' },
            ]
        );
    }

    #[test]
    fn test_output_length_matches_kept_characters() {
        let primary = table(&[('A', "GCC"), ('G', "GGC"), ('*', "UGA")]);
        let protein = "AGXZ*GA  B";
        let result = translate_detailed(protein, &primary, &ForcedCodonTable::new()).unwrap();
        let kept = protein.chars().filter(|c| primary.contains(*c)).count();
        assert_eq!(result.rna.len(), kept * 3);
        assert_eq!(result.codons, kept);
    }

    #[test]
    fn test_placeholder_is_not_used_on_success() {
        let primary = table(&[('M', "AUG")]);
        let result = translate_or_placeholder("M", &primary, &ForcedCodonTable::new());
        assert_eq!(result.rna, "AUG");
    }

    #[test]
    fn test_parse_forced_codons() {
        let (forced, errors) = parse_forced_codons("A GCC\n\nm aug\n  L   CUG  \n");
        assert!(errors.is_empty());
        assert_eq!(forced.len(), 3);
        assert_eq!(forced.get('A'), Some(Codon::parse("GCC").unwrap()));
        assert_eq!(forced.get('M'), Some(Codon::parse("AUG").unwrap()));
        assert_eq!(forced.get('L'), Some(Codon::parse("CUG").unwrap()));
    }

    #[test]
    fn test_parse_forced_codons_skips_malformed_lines() {
        let (forced, errors) = parse_forced_codons("A GCC\nA\nK AAG extra\nMet AUG\nW UXG\nK AAA");
        assert_eq!(forced.len(), 2);
        assert_eq!(forced.get('K'), Some(Codon::parse("AAA").unwrap()));
        assert_eq!(errors.len(), 4);
        assert!(matches!(errors[0], ForcedCodonError::InvalidFormat { line: 2, .. }));
        assert!(matches!(errors[1], ForcedCodonError::InvalidFormat { line: 3, .. }));
        assert!(matches!(errors[2], ForcedCodonError::InvalidCodon { line: 4, .. }));
        assert!(matches!(errors[3], ForcedCodonError::InvalidCodon { line: 5, .. }));
    }

    #[test]
    fn test_later_forced_line_overrides() {
        let (forced, _) = parse_forced_codons("A GCC\nA GCA");
        assert_eq!(forced.get('A'), Some(Codon::parse("GCA").unwrap()));
    }
}
