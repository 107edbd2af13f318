//! # revtrans - Codon-usage reverse translation
//!
//! Reverse-translates protein sequences into RNA using the most frequent
//! codon of each amino acid in a codon usage table, with optional per
//! amino acid overrides. Also converts raw Kazusa codon usage text into
//! the JSON table files the translator reads.
//!
//! ## Architecture
//!
//! - `codon`: codons, usage records and the derived lookup tables
//! - `table_file`: JSON table file format
//! - `tables`: loading of the reference tables directory
//! - `translate`: reverse translation and forced codon parsing
//! - `convert`: Kazusa text to table conversion
//! - `artifacts`: directory of generated table files
//! - `formats`: protein input (raw text or FASTA) and FASTA output
//! - `model`, `event`, `ui`, `controller`: the terminal workbench

pub mod artifacts;
pub mod codon;
pub mod controller;
pub mod convert;
pub mod event;
pub mod formats;
pub mod model;
pub mod table_file;
pub mod tables;
pub mod translate;
pub mod ui;
