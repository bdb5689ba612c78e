use std::fs::File;
use std::io::{
    BufReader,
    Read,
};
use std::path::Path;

use anyhow::Context;
use bio::io::fasta::Reader as FastaReader;
use log::info;

/// Reads every record of a FASTA stream as `(name, residues)`.
pub fn read_sequences<R: Read>(reader: R) -> anyhow::Result<Vec<(String, Vec<u8>)>> {
    let reader = FastaReader::new(reader);
    let mut sequences = Vec::new();
    for record in reader.records() {
        let record = record.context("Failed to read FASTA record")?;
        record
            .check()
            .map_err(|e| anyhow::anyhow!("Invalid FASTA record {}: {}", record.id(), e))?;
        sequences.push((record.id().to_string(), record.seq().to_vec()));
    }
    Ok(sequences)
}

/// Opens and reads a FASTA file.
pub fn read_sequences_from_path<P: AsRef<Path>>(
    path: P
) -> anyhow::Result<Vec<(String, Vec<u8>)>> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open FASTA file {}", path.display()))?;
    let sequences = read_sequences(BufReader::new(file))?;
    info!(
        "Read {} sequences from {}",
        sequences.len(),
        path.display()
    );
    Ok(sequences)
}
