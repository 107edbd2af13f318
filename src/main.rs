//! revtrans - codon-usage reverse translation
//!
//! ## Usage
//!
//! ```bash
//! revtrans translate -t Homo_sapiens -s MKVLA*      # Reverse-translate a protein
//! revtrans translate -t Homo_sapiens -i prot.fa -f 'L CUG' -f 'K AAG'
//! revtrans tables                                 # List reference tables
//! revtrans convert -i kazusa.txt                  # Convert a Kazusa table
//! revtrans files                                  # List converted tables
//! revtrans export <name> -o table.json            # Export a converted table
//! revtrans                                        # Interactive workbench
//! ```

// Use jemalloc for better memory management (returns memory to OS)
#[cfg(not(windows))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use log::{info, warn, Level};

use revtrans::artifacts::ArtifactStore;
use revtrans::controller::run_app;
use revtrans::convert::convert;
use revtrans::formats::fasta::write_fasta;
use revtrans::formats::{parse_protein_file, parse_protein_str};
use revtrans::model::Sequence;
use revtrans::tables::CodonTables;
use revtrans::translate::{parse_forced_codons, translate_or_placeholder};

/// Reads text from a file, or from stdin when the path is "-".
fn read_text(path: &str) -> Result<String> {
    if path == "-" {
        let mut content = String::new();
        io::stdin()
            .read_to_string(&mut content)
            .context("Failed to read stdin")?;
        Ok(content)
    } else {
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))
    }
}

/// Opens a file for writing, or stdout when the path is "-".
fn open_output(path: &str) -> Result<Box<dyn Write>> {
    if path == "-" {
        Ok(Box::new(io::stdout().lock()))
    } else {
        let file = File::create(path).with_context(|| format!("Failed to create {}", path))?;
        Ok(Box::new(BufWriter::new(file)))
    }
}

fn load_tables(dir: &Path) -> Result<CodonTables> {
    let tables = CodonTables::load(dir)?;
    if tables.is_empty() {
        warn!("No codon tables found in {}", dir.display());
    }
    Ok(tables)
}

/// Runs the `translate` subcommand.
fn run_translate(tables: &CodonTables, args: TranslateArgs) -> Result<()> {
    let table = tables.get(&args.table).ok_or_else(|| {
        anyhow::anyhow!(
            "Unknown codon table: {} (available: {})",
            args.table,
            tables.names().join(", ")
        )
    })?;
    if let Some(diagnostic) = &table.diagnostic {
        warn!("Table {} is empty, only forced codons apply: {}", table.name, diagnostic);
    }

    let sequences = match (&args.sequence, &args.input) {
        (Some(sequence), _) => parse_protein_str(sequence)?,
        (None, Some(path)) if path.as_os_str() != "-" => parse_protein_file(path)
            .with_context(|| format!("Failed to read protein input {}", path.display()))?,
        (None, _) => parse_protein_str(&read_text("-")?)?,
    };

    let forced_text = match &args.forced_file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read forced codons {}", path.display()))?,
        None => args.forced.join("\n"),
    };
    let (forced, _skipped) = parse_forced_codons(&forced_text);
    info!(
        "Reverse-translating {} sequence(s) with table {} ({} forced codon(s))",
        sequences.len(),
        table.name,
        forced.len()
    );

    let translated: Vec<Sequence> = sequences
        .iter()
        .map(|seq| {
            let translation = translate_or_placeholder(&seq.data, &table.max_frequency, &forced);
            if !translation.dropped.is_empty() {
                let symbols: String = translation.dropped.iter().map(|d| d.symbol).take(20).collect();
                warn!(
                    "{}: dropped {} character(s) unknown to table {}: {}",
                    seq.id,
                    translation.dropped.len(),
                    table.name,
                    symbols
                );
            }
            Sequence::new(seq.id.clone(), translation.rna)
        })
        .collect();

    let mut writer = open_output(&args.output)?;
    write_fasta(&mut writer, &translated, args.line_width)?;
    writer.flush()?;
    Ok(())
}

/// Runs the `tables` subcommand.
fn run_tables(tables: &CodonTables) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    for table in tables.iter() {
        match &table.diagnostic {
            Some(diagnostic) => writeln!(handle, "{}\tFAILED\t{}", table.name, diagnostic)?,
            None => writeln!(
                handle,
                "{}\t{} codons\t{} amino acids",
                table.name,
                table.frequencies.len(),
                table.max_frequency.len()
            )?,
        }
    }
    Ok(())
}

fn print_artifacts(store: &ArtifactStore) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    for name in store.list()? {
        writeln!(handle, "{}", name)?;
    }
    Ok(())
}

/// Runs the `convert` subcommand: convert, save, then list all artifacts.
fn run_convert(store: &ArtifactStore, input: &str) -> Result<()> {
    let raw = read_text(input)?;
    let converted = convert(&raw);
    if converted.table.is_empty() {
        warn!("No codon entries found in {}", input);
    }

    let json = converted.to_json()?;
    let name = converted.artifact_name();
    store.save(&name, json.as_bytes())?;
    info!(
        "Converted {} codons for {} into {}",
        converted.table.len(),
        converted.species,
        name
    );

    print_artifacts(store)
}

/// Runs the `export` subcommand.
fn run_export(store: &ArtifactStore, name: &str, output: &str) -> Result<()> {
    // Resolve first, a bad name must leave the output file untouched
    store.path_of(name)?;
    let mut writer = open_output(output)?;
    let bytes = store.export(name, &mut writer)?;
    writer.flush()?;
    info!("Exported {} ({} bytes)", name, bytes);
    Ok(())
}

/// Options of the `translate` subcommand.
#[derive(ClapArgs, Debug)]
struct TranslateArgs {
    /// Name of the codon table (see `revtrans tables`)
    #[arg(short = 't', long)]
    table: String,

    /// Protein sequence given on the command line
    #[arg(short = 's', long, conflicts_with = "input")]
    sequence: Option<String>,

    /// Protein input file, raw or FASTA ("-" or absent: stdin)
    #[arg(short = 'i', long)]
    input: Option<PathBuf>,

    /// Forced codon as "AMINO_ACID TRIPLET" (repeatable)
    #[arg(short = 'f', long = "force", conflicts_with = "forced_file")]
    forced: Vec<String>,

    /// File with forced codons, one "AMINO_ACID TRIPLET" pair per line
    #[arg(short = 'F', long)]
    forced_file: Option<PathBuf>,

    /// Output file. Use "-" for stdout.
    #[arg(short = 'o', long, default_value = "-")]
    output: String,

    /// FASTA line width (0: no wrapping)
    #[arg(short = 'w', long, default_value = "60")]
    line_width: usize,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reverse-translate protein sequences into RNA
    Translate(TranslateArgs),

    /// List the reference codon tables
    Tables,

    /// Convert a raw Kazusa codon usage table into a table file
    Convert {
        /// Raw table text file. Use "-" for stdin.
        #[arg(short = 'i', long, default_value = "-")]
        input: String,
    },

    /// List converted table files
    Files,

    /// Export a converted table file
    Export {
        /// File name as shown by `revtrans files`
        name: String,

        /// Output file. Use "-" for stdout.
        #[arg(short = 'o', long, default_value = "-")]
        output: String,
    },

    /// Interactive reverse translation workbench (default)
    Tui,
}

/// revtrans - reverse translation with codon usage tables
///
/// Without a subcommand, opens the interactive workbench.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory of reference codon tables (*.json)
    #[arg(short = 'T', long, env = "REVTRANS_TABLES_DIR", default_value = "json_files", global = true)]
    tables_dir: PathBuf,

    /// Directory of converted table files
    #[arg(short = 'G', long, env = "REVTRANS_GENERATED_DIR", default_value = "generated_files", global = true)]
    generated_dir: PathBuf,

    /// Logging verbosity level
    #[arg(short = 'L', long, default_value = "info", global = true)]
    level: Level,

    #[command(subcommand)]
    command: Option<Command>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let command = args.command.unwrap_or(Command::Tui);

    // The workbench owns the terminal, log lines would corrupt the screen
    if !matches!(command, Command::Tui) {
        simple_logger::init_with_level(args.level)?;
    }

    match command {
        Command::Translate(translate_args) => {
            let tables = load_tables(&args.tables_dir)?;
            run_translate(&tables, translate_args)?;
        }
        Command::Tables => {
            let tables = load_tables(&args.tables_dir)?;
            run_tables(&tables)?;
        }
        Command::Convert { input } => {
            let store = ArtifactStore::open(&args.generated_dir)?;
            run_convert(&store, &input)?;
        }
        Command::Files => {
            let store = ArtifactStore::open(&args.generated_dir)?;
            print_artifacts(&store)?;
        }
        Command::Export { name, output } => {
            let store = ArtifactStore::open(&args.generated_dir)?;
            run_export(&store, &name, &output)?;
        }
        Command::Tui => {
            let tables = load_tables(&args.tables_dir)?;
            run_app(&tables)?;
        }
    }

    Ok(())
}
