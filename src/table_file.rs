//! Codon frequency table files.
//!
//! One JSON document per table:
//!
//! ```text
//! {
//!   "triplet": {
//!     "GCC": ["A", 0.4, 27.7, 1127679],
//!     ...
//!   }
//! }
//! ```
//!
//! Records are written ordered by amino acid, then triplet. Numeric fields
//! are read either as JSON numbers or as numeric strings.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::ser::{SerializeMap, SerializeTuple};
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

use crate::codon::{parse_amino_acid, Codon, CodonError, CodonFrequencyTable, CodonRecord};

/// Errors that can occur while reading or writing a table file.
#[derive(Error, Debug)]
pub enum TableFileError {
    #[error("Failed to read table file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid record for triplet '{triplet}': {source}")]
    InvalidRecord {
        triplet: String,
        #[source]
        source: CodonError,
    },

    #[error("Triplets '{first}' and '{second}' both denote codon {codon}")]
    DuplicateCodon {
        codon: Codon,
        first: String,
        second: String,
    },

    #[error("Invalid {field} for triplet '{triplet}': '{value}'")]
    InvalidNumber {
        triplet: String,
        field: &'static str,
        value: String,
    },
}

/// Result type for table file operations.
pub type TableFileResult<T> = Result<T, TableFileError>;

/// A numeric field as it may appear in hand-written files.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Numeric {
    Number(serde_json::Number),
    Text(String),
}

impl Numeric {
    fn as_f64(&self) -> Option<f64> {
        let value: Option<f64> = match self {
            Numeric::Number(n) => n.as_f64(),
            Numeric::Text(s) => s.trim().parse().ok(),
        };
        value.filter(|v| v.is_finite() && *v >= 0.0)
    }

    fn as_u64(&self) -> Option<u64> {
        match self {
            Numeric::Number(n) => n.as_u64(),
            Numeric::Text(s) => s.trim().parse().ok(),
        }
    }

    fn describe(&self) -> String {
        match self {
            Numeric::Number(n) => n.to_string(),
            Numeric::Text(s) => s.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawRecord(String, Numeric, Numeric, Numeric);

#[derive(Debug, Deserialize)]
struct RawDocument {
    triplet: BTreeMap<String, RawRecord>,
}

impl RawRecord {
    fn into_record(self, key: &str) -> TableFileResult<CodonRecord> {
        let invalid_record = |source| TableFileError::InvalidRecord {
            triplet: key.to_string(),
            source,
        };
        let triplet = Codon::parse(key).map_err(invalid_record)?;
        let amino_acid = parse_amino_acid(&self.0).map_err(invalid_record)?;

        let invalid_number = |field: &'static str, value: &Numeric| TableFileError::InvalidNumber {
            triplet: key.to_string(),
            field,
            value: value.describe(),
        };
        let fraction = self.1.as_f64().ok_or_else(|| invalid_number("fraction", &self.1))?;
        let frequency = self.2.as_f64().ok_or_else(|| invalid_number("frequency", &self.2))?;
        let count = self.3.as_u64().ok_or_else(|| invalid_number("count", &self.3))?;

        Ok(CodonRecord::new(triplet, amino_acid, fraction, frequency, count))
    }
}

/// Parses a table document from JSON text.
///
/// Keys are normalised (`ATG` and `aug` read as `AUG`), two keys that end
/// up as the same codon are rejected.
pub fn parse_table_str(content: &str) -> TableFileResult<CodonFrequencyTable> {
    let document: RawDocument = serde_json::from_str(content)?;
    let mut table = CodonFrequencyTable::new();
    let mut keys: BTreeMap<Codon, String> = BTreeMap::new();
    for (key, raw) in document.triplet {
        let record = raw.into_record(&key)?;
        if let Some(first) = keys.insert(record.triplet, key.clone()) {
            return Err(TableFileError::DuplicateCodon {
                codon: record.triplet,
                first,
                second: key,
            });
        }
        table.insert(record);
    }
    Ok(table)
}

/// Reads and parses a table file.
pub fn read_table_file<P: AsRef<Path>>(path: P) -> TableFileResult<CodonFrequencyTable> {
    let content = fs::read_to_string(path)?;
    parse_table_str(&content)
}

struct RecordFields<'a>(&'a CodonRecord);

impl Serialize for RecordFields<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut fields = serializer.serialize_tuple(4)?;
        fields.serialize_element(&self.0.amino_acid)?;
        fields.serialize_element(&self.0.fraction)?;
        fields.serialize_element(&self.0.frequency)?;
        fields.serialize_element(&self.0.count)?;
        fields.end()
    }
}

struct OrderedRecords<'a>(&'a CodonFrequencyTable);

impl Serialize for OrderedRecords<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let records = self.0.records_by_amino_acid();
        let mut map = serializer.serialize_map(Some(records.len()))?;
        for record in records {
            map.serialize_entry(record.triplet.as_str(), &RecordFields(record))?;
        }
        map.end()
    }
}

#[derive(Serialize)]
struct Document<'a> {
    triplet: OrderedRecords<'a>,
}

/// Renders a table as pretty-printed JSON (2-space indent).
pub fn to_table_string(table: &CodonFrequencyTable) -> TableFileResult<String> {
    let document = Document {
        triplet: OrderedRecords(table),
    };
    Ok(serde_json::to_string_pretty(&document)?)
}
