use std::fs;

use tempfile::TempDir;

use revtrans::artifacts::ArtifactStore;
use revtrans::codon::{Codon, ForcedCodonTable};
use revtrans::convert::convert;
use revtrans::formats::parse_protein_str;
use revtrans::tables::CodonTables;
use revtrans::translate::{parse_forced_codons, translate, translate_detailed};

const ECOLI_RAW: &str = "\
Escherichia coli K12 [gbbct]: 5122 CDS's (1609283 codons)
fields: [triplet] [amino acid] [fraction] [frequency: per thousand] ([number])

UUU F 0.57 22.1 (35587)  UCU S 0.15  8.5 (13706)  UAU Y 0.57 16.2 (26104)  UGU C 0.45  5.2 ( 8398)
UUC F 0.43 16.6 (26763)  UCC S 0.15  8.6 (13870)  UAC Y 0.43 12.2 (19597)  UGC C 0.55  6.5 (10393)
UUA L 0.13 13.8 (22210)  UCA S 0.12  7.2 (11591)  UAA * 0.64  2.0 ( 3246)  UGA * 0.29  0.9 ( 1468)
UUG L 0.13 13.7 (22088)  UCG S 0.15  8.9 (14340)  UAG * 0.07  0.2 (  393)  UGG W 1.00 15.3 (24651)

AUG M 1.00 27.8 (44741)  ACG T 0.27 14.4 (23197)  AAA K 0.76 33.6 (54150)  AAG K 0.24 10.3 (16613)
CUG L 0.50 52.6 (84668)  GCG A 0.36 33.7 (54200)  GCC A 0.27 25.5 (41090)  GGC G 0.40 29.6 (47650)
";

/// Converts raw text and saves it where the table loader will find it.
fn convert_into(store: &ArtifactStore, raw: &str) -> String {
    let converted = convert(raw);
    let name = converted.artifact_name();
    store.save(&name, converted.to_json().unwrap().as_bytes()).unwrap();
    name
}

#[test]
fn converted_table_drives_translation() {
    let temp = TempDir::new().expect("failed to create temporary directory");
    let store = ArtifactStore::open(temp.path().join("generated")).unwrap();

    let name = convert_into(&store, ECOLI_RAW);
    assert_eq!(name, "Kazusa_codon_frequency_table_Escherichia_coli_K12_[gbbct].json");
    assert_eq!(store.list().unwrap(), vec![name.clone()]);

    let tables = CodonTables::load(store.dir()).unwrap();
    let table = tables
        .get("Kazusa_codon_frequency_table_Escherichia_coli_K12_[gbbct]")
        .expect("converted table should be loaded");
    assert!(!table.is_failed());
    assert_eq!(table.frequencies.len(), 24);

    let rna = translate("MKLW*", &table.max_frequency, &ForcedCodonTable::new()).unwrap();
    assert_eq!(rna, "AUGAAACUGUGGUAA");

    let (forced, errors) = parse_forced_codons("K AAG\nL UUA\n");
    assert!(errors.is_empty());
    let rna = translate("MKLW*", &table.max_frequency, &forced).unwrap();
    assert_eq!(rna, "AUGAAGUUAUGGUAA");
}

#[test]
fn one_record_per_amino_acid_round_trips() {
    let raw = "Test organism: 1 CDS\nAUG M 1.00 25.5 (  120)  UGG W 1.00 10.0 (50)\nGCA A 1.00 12.0 (60)  UAG * 1.00 1.0 (5)";
    let temp = TempDir::new().unwrap();
    let store = ArtifactStore::open(temp.path()).unwrap();
    convert_into(&store, raw);

    let tables = CodonTables::load(temp.path()).unwrap();
    let table = tables.get("Kazusa_codon_frequency_table_Test_organism").unwrap();

    let expected = [('M', "AUG"), ('W', "UGG"), ('A', "GCA"), ('*', "UAG")];
    assert_eq!(table.max_frequency.len(), expected.len());
    for (aa, triplet) in expected {
        assert_eq!(table.max_frequency.get(aa), Some(Codon::parse(triplet).unwrap()));
    }
}

#[test]
fn fasta_records_translate_independently() {
    let temp = TempDir::new().unwrap();
    let store = ArtifactStore::open(temp.path()).unwrap();
    convert_into(&store, ECOLI_RAW);
    let tables = CodonTables::load(temp.path()).unwrap();
    let table = tables.iter().next().unwrap();

    let proteins = parse_protein_str(">p1 first\nMK\n>p2\nMW-X\n").unwrap();
    let results: Vec<_> = proteins
        .iter()
        .map(|p| translate_detailed(&p.data, &table.max_frequency, &ForcedCodonTable::new()).unwrap())
        .collect();

    assert_eq!(results[0].rna, "AUGAAA");
    assert!(results[0].dropped.is_empty());
    assert_eq!(results[1].rna, "AUGUGG");
    assert_eq!(results[1].dropped.len(), 2);
}

#[test]
fn broken_table_does_not_hide_others() {
    let temp = TempDir::new().unwrap();
    let store = ArtifactStore::open(temp.path()).unwrap();
    convert_into(&store, ECOLI_RAW);
    fs::write(temp.path().join("broken.json"), r#"{"triplet": {"AUG": "M"}}"#).unwrap();

    let tables = CodonTables::load(temp.path()).unwrap();
    assert_eq!(tables.len(), 2);
    assert_eq!(tables.failures().count(), 1);

    // An empty table only translates forced amino acids
    let broken = tables.get("broken").unwrap();
    let (forced, _) = parse_forced_codons("M AUG");
    assert_eq!(translate("MK", &broken.max_frequency, &forced).unwrap(), "AUG");
}

#[test]
fn export_serves_saved_artifact() {
    let temp = TempDir::new().unwrap();
    let store = ArtifactStore::open(temp.path()).unwrap();
    let name = convert_into(&store, ECOLI_RAW);

    let mut exported = Vec::new();
    store.export(&name, &mut exported).unwrap();
    let on_disk = fs::read(store.path_of(&name).unwrap()).unwrap();
    assert_eq!(exported, on_disk);
    assert!(String::from_utf8(exported).unwrap().starts_with("{\n  \"triplet\": {\n    \"UAA\""));
}

#[test]
fn species_with_double_dot_is_saved() {
    let temp = TempDir::new().unwrap();
    let store = ArtifactStore::open(temp.path()).unwrap();

    let name = convert_into(&store, "Strain A..B [gbbct]: 10 CDS's\nAUG M 1.00 25.5 (  120)");
    assert_eq!(name, "Kazusa_codon_frequency_table_Strain_A..B_[gbbct].json");
    assert_eq!(store.list().unwrap(), vec![name]);

    let tables = CodonTables::load(temp.path()).unwrap();
    let table = tables.get("Kazusa_codon_frequency_table_Strain_A..B_[gbbct]").unwrap();
    assert_eq!(table.frequencies.len(), 1);
}
