//! PHYLIP alignment reading and writing.
//!
//! Uses the fixed-width convention: a `n_taxa n_sites` header, a first
//! block of 10-character names followed by sequence data, then interleaved
//! continuation blocks separated by blank lines. Output lines are 60
//! columns wide (10 name + 50 data in the first block).

use std::io::Write;

use margay_core::{MargayError, Result};

const NAME_WIDTH: usize = 10;
const LINE_WIDTH: usize = 60;

/// Parse a PHYLIP alignment into `(name, sequence)` pairs.
///
/// # Errors
///
/// Returns a parse error for a malformed header, missing taxa lines, or
/// sequences whose length disagrees with the header.
pub fn read_phylip(input: &str) -> Result<Vec<(String, String)>> {
    let mut lines = input.lines();

    let header = lines
        .next()
        .ok_or_else(|| MargayError::Parse("empty PHYLIP input".into()))?;
    let mut parts = header.split_whitespace();
    let n_taxa: usize = parts
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| MargayError::Parse("PHYLIP header must start with the taxa count".into()))?;
    let n_sites: usize = parts
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| MargayError::Parse("PHYLIP header must give the site count".into()))?;

    let mut names: Vec<String> = Vec::with_capacity(n_taxa);
    let mut seqs: Vec<String> = Vec::with_capacity(n_taxa);

    // first block: fixed-width names followed by data
    let mut read = 0;
    for line in lines.by_ref() {
        if line.trim().is_empty() {
            continue;
        }
        if line.len() < NAME_WIDTH {
            return Err(MargayError::Parse(format!(
                "PHYLIP taxa line shorter than the {}-character name field: {:?}",
                NAME_WIDTH, line
            )));
        }
        names.push(line[..NAME_WIDTH].trim().to_string());
        seqs.push(line[NAME_WIDTH..].split_whitespace().collect());
        read += 1;
        if read == n_taxa {
            break;
        }
    }
    if read != n_taxa {
        return Err(MargayError::Parse(format!(
            "expected {} taxa, found {}",
            n_taxa, read
        )));
    }

    // continuation blocks: data only, round-robin
    let mut taxon = 0;
    for line in lines {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            taxon = 0;
            continue;
        }
        let chunk: String = trimmed.split_whitespace().collect();
        seqs[taxon % n_taxa].push_str(&chunk);
        taxon += 1;
    }

    for (name, seq) in names.iter().zip(&seqs) {
        if seq.len() != n_sites {
            return Err(MargayError::Parse(format!(
                "taxon {:?}: expected {} sites, found {}",
                name,
                n_sites,
                seq.len()
            )));
        }
    }

    Ok(names.into_iter().zip(seqs).collect())
}

/// Write an alignment in PHYLIP format.
///
/// Names are padded or truncated to 10 characters; the first block carries
/// 50 data columns per line, continuation blocks 60.
///
/// # Errors
///
/// Returns an I/O error if writing fails.
pub fn write_phylip<W: Write>(out: &mut W, records: &[(String, String)]) -> Result<()> {
    let n_sites = records.first().map_or(0, |(_, seq)| seq.len());
    writeln!(out, "{} {}", records.len(), n_sites)?;

    let first_width = LINE_WIDTH - NAME_WIDTH;
    for (name, seq) in records {
        let padded: String = name.chars().take(NAME_WIDTH).collect();
        writeln!(
            out,
            "{:<width$}{}",
            padded,
            &seq[..seq.len().min(first_width)],
            width = NAME_WIDTH
        )?;
    }

    let mut offset = first_width;
    while offset < n_sites {
        writeln!(out)?;
        let end = (offset + LINE_WIDTH).min(n_sites);
        for (_, seq) in records {
            writeln!(out, "{}", &seq[offset..end])?;
        }
        offset = end;
    }
    Ok(())
}
