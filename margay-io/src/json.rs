//! JSON sequence data and sample reports.

use std::io::Write;

use margay_align::SampledAlignment;
use margay_core::{MargayError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

#[derive(Debug, Serialize, Deserialize)]
struct JsonDocument {
    data: JsonData,
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonData {
    names: Vec<String>,
    seqs: Vec<String>,
}

/// Parse `{"data": {"names": [...], "seqs": [...]}}` into
/// `(name, sequence)` pairs.
///
/// # Errors
///
/// Returns a parse error for malformed JSON or mismatched name/sequence
/// counts.
pub fn read_json(input: &str) -> Result<Vec<(String, String)>> {
    let doc: JsonDocument =
        serde_json::from_str(input).map_err(|e| MargayError::Parse(e.to_string()))?;
    if doc.data.names.len() != doc.data.seqs.len() {
        return Err(MargayError::Parse(format!(
            "JSON data has {} names but {} sequences",
            doc.data.names.len(),
            doc.data.seqs.len()
        )));
    }
    Ok(doc.data.names.into_iter().zip(doc.data.seqs).collect())
}

/// Write `(name, sequence)` pairs as `{"data": {...}}`.
///
/// # Errors
///
/// Returns an I/O error if writing fails.
pub fn write_json<W: Write>(out: &mut W, records: &[(String, String)]) -> Result<()> {
    let doc = JsonDocument {
        data: JsonData {
            names: records.iter().map(|(n, _)| n.clone()).collect(),
            seqs: records.iter().map(|(_, s)| s.clone()).collect(),
        },
    };
    serde_json::to_writer(&mut *out, &doc).map_err(|e| MargayError::Parse(e.to_string()))?;
    writeln!(out)?;
    Ok(())
}

/// Write sampled alignments as a JSON array in draw order.
///
/// Each entry carries the aligned pair keyed by sequence name, the
/// linear-space weight, and the log-weight.
///
/// # Errors
///
/// Returns an I/O error if writing fails.
pub fn write_sample_report<W: Write>(
    out: &mut W,
    names: &[String; 2],
    samples: &[SampledAlignment],
) -> Result<()> {
    let entries: Vec<Value> = samples
        .iter()
        .map(|sample| {
            let mut aln = Map::new();
            aln.insert(names[0].clone(), Value::String(sample.seqs[0].clone()));
            aln.insert(names[1].clone(), Value::String(sample.seqs[1].clone()));
            json!({
                "aln": Value::Object(aln),
                "weight": sample.log_weight.exp(),
                "log_weight": sample.log_weight,
            })
        })
        .collect();
    serde_json::to_writer_pretty(&mut *out, &entries)
        .map_err(|e| MargayError::Parse(e.to_string()))?;
    writeln!(out)?;
    Ok(())
}
