//! FASTA reading and writing.

use std::io::{Cursor, Write};
use std::path::Path;

use margay_core::{MargayError, Result};
use needletail::parse_fastx_reader;

/// Width of wrapped sequence lines in FASTA output.
const LINE_WIDTH: usize = 60;

/// Read all records of a FASTA file as `(name, sequence)` pairs.
///
/// Legacy `;` comment lines are stripped before parsing. The record name is
/// the full header line after `>`.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be read and a parse error for
/// malformed FASTA content.
pub fn read_fasta(path: impl AsRef<Path>) -> Result<Vec<(String, String)>> {
    let raw = std::fs::read_to_string(path.as_ref())?;
    let filtered: String = raw
        .lines()
        .filter(|line| !line.starts_with(';'))
        .collect::<Vec<_>>()
        .join("\n");

    let mut reader = parse_fastx_reader(Cursor::new(filtered.into_bytes()))
        .map_err(|e| MargayError::Parse(format!("{}: {}", path.as_ref().display(), e)))?;

    let mut records = Vec::new();
    while let Some(record) = reader.next() {
        let record = record.map_err(|e| MargayError::Parse(e.to_string()))?;
        let name = String::from_utf8_lossy(record.id()).into_owned();
        let seq = String::from_utf8_lossy(&record.seq()).into_owned();
        records.push((name, seq));
    }
    Ok(records)
}

/// Write records as FASTA, wrapping sequence lines at 60 columns.
///
/// # Errors
///
/// Returns an I/O error if writing fails.
pub fn write_fasta<W: Write>(out: &mut W, records: &[(String, String)]) -> Result<()> {
    for (name, seq) in records {
        writeln!(out, ">{}", name)?;
        let bytes = seq.as_bytes();
        for chunk in bytes.chunks(LINE_WIDTH) {
            out.write_all(chunk)?;
            writeln!(out)?;
        }
    }
    Ok(())
}
