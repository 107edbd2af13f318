//! Loading of the reference codon tables.
//!
//! Every `*.json` file in the tables directory becomes one named table
//! (the file stem). The resulting `CodonTables` is built once at startup
//! and shared by reference afterwards.

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use thiserror::Error;

use crate::codon::{
    derive_max_frequency_table, derive_usage_table, CodonFrequencyTable, CodonUsageTable,
    MaxFrequencyCodonTable,
};
use crate::table_file::read_table_file;

/// Extension of table files in the tables directory.
pub const TABLE_EXTENSION: &str = "json";

/// Errors that prevent the table directory from being read at all.
#[derive(Error, Debug)]
pub enum TableError {
    #[error("Cannot read tables directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A table together with its derived lookups.
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub name: String,
    pub frequencies: CodonFrequencyTable,
    pub usage: CodonUsageTable,
    pub max_frequency: MaxFrequencyCodonTable,
    /// Why the file could not be used, if it was malformed or unreadable
    pub diagnostic: Option<String>,
}

impl LoadedTable {
    /// Builds a table and its derived lookups.
    pub fn new(name: impl Into<String>, frequencies: CodonFrequencyTable) -> Self {
        let usage = derive_usage_table(&frequencies);
        let max_frequency = derive_max_frequency_table(&usage);
        Self {
            name: name.into(),
            frequencies,
            usage,
            max_frequency,
            diagnostic: None,
        }
    }

    /// An empty table standing in for a file that failed to load.
    fn failed(name: impl Into<String>, diagnostic: String) -> Self {
        let mut table = Self::new(name, CodonFrequencyTable::new());
        table.diagnostic = Some(diagnostic);
        table
    }

    pub fn is_failed(&self) -> bool {
        self.diagnostic.is_some()
    }
}

/// All reference tables, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct CodonTables {
    tables: BTreeMap<String, LoadedTable>,
}

impl CodonTables {
    /// Loads every table file of a directory.
    ///
    /// Files that cannot be read or parsed are kept as empty tables with a
    /// diagnostic; only an unreadable directory is an error.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self, TableError> {
        let dir = dir.as_ref();
        let directory_error = |source| TableError::Directory {
            path: dir.to_path_buf(),
            source,
        };

        let mut tables = BTreeMap::new();
        for entry in fs::read_dir(dir).map_err(directory_error)? {
            let path = entry.map_err(directory_error)?.path();
            if !path.is_file() || path.extension().and_then(OsStr::to_str) != Some(TABLE_EXTENSION) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(OsStr::to_str).map(str::to_string) else {
                warn!("Skipping table file with a non UTF-8 name: {}", path.display());
                continue;
            };

            let table = match read_table_file(&path) {
                Ok(frequencies) => {
                    debug!("Read {} codons from {}", frequencies.len(), path.display());
                    LoadedTable::new(name.clone(), frequencies)
                }
                Err(e) => {
                    warn!("Table {} loaded as empty: {}", path.display(), e);
                    LoadedTable::failed(name.clone(), e.to_string())
                }
            };
            tables.insert(name, table);
        }

        info!("Loaded {} codon tables from {}", tables.len(), dir.display());
        Ok(Self { tables })
    }

    /// Gets a table by name.
    pub fn get(&self, name: &str) -> Option<&LoadedTable> {
        self.tables.get(name)
    }

    /// Returns the table names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }

    /// Iterates tables in name order.
    pub fn iter(&self) -> impl Iterator<Item = &LoadedTable> {
        self.tables.values()
    }

    /// Tables that failed to load, with their diagnostics.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tables
            .values()
            .filter_map(|t| t.diagnostic.as_deref().map(|d| (t.name.as_str(), d)))
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl FromIterator<LoadedTable> for CodonTables {
    fn from_iter<I: IntoIterator<Item = LoadedTable>>(iter: I) -> Self {
        Self {
            tables: iter.into_iter().map(|t| (t.name.clone(), t)).collect(),
        }
    }
}
