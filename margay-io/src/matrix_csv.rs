//! User-supplied codon rate matrix tables.
//!
//! The format is a branch length on the first line followed by exactly one
//! `codon,codon,rate` row per ordered codon pair (64 × 64 = 4096 rows),
//! using the three-letter codon alphabet. Any other row count is a parse
//! error.

use std::path::Path;

use csv::ReaderBuilder;
use margay_core::{MargayError, Result};
use margay_seq::codon::codon_index;

/// Required number of codon-pair rows.
const EXPECTED_ROWS: usize = 64 * 64;

/// Parse a rate-matrix file into its branch length and the 64×64 rate
/// matrix.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be read and a parse error for a
/// malformed branch length, malformed rows, unknown codons, or a row count
/// other than 4096.
pub fn read_rate_matrix(path: impl AsRef<Path>) -> Result<(f64, Vec<Vec<f64>>)> {
    let content = std::fs::read_to_string(path.as_ref())?;
    let mut lines = content.splitn(2, '\n');

    let header = lines.next().unwrap_or("").trim();
    let branch_length: f64 = header.parse().map_err(|_| {
        MargayError::Parse(format!(
            "rate matrix file must start with a branch length, found {:?}",
            header
        ))
    })?;
    let body = lines.next().unwrap_or("");

    let mut matrix = vec![vec![0.0f64; 64]; 64];
    let mut rows = 0usize;

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .from_reader(body.as_bytes());
    for record in reader.records() {
        let record = record.map_err(|e| MargayError::Parse(e.to_string()))?;
        if record.len() != 3 {
            return Err(MargayError::Parse(format!(
                "rate matrix rows must be codon,codon,rate, found {} fields",
                record.len()
            )));
        }
        let from = codon_index(record[0].as_bytes()).ok_or_else(|| {
            MargayError::Parse(format!("unknown codon {:?}", &record[0]))
        })?;
        let to = codon_index(record[1].as_bytes()).ok_or_else(|| {
            MargayError::Parse(format!("unknown codon {:?}", &record[1]))
        })?;
        let rate: f64 = record[2]
            .trim()
            .parse()
            .map_err(|_| MargayError::Parse(format!("malformed rate {:?}", &record[2])))?;
        matrix[from][to] = rate;
        rows += 1;
    }

    if rows != EXPECTED_ROWS {
        return Err(MargayError::Parse(format!(
            "rate matrix file must have {} codon pair rows, found {}",
            EXPECTED_ROWS, rows
        )));
    }

    Ok((branch_length, matrix))
}
