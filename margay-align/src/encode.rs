//! Sequence pair encoding for the marginal model.
//!
//! The ancestor is encoded per position as `codon · 3 + offset`, the row
//! index of the marginal emission table; the descendant per nucleotide as a
//! symbol index covering the IUPAC ambiguity codes.

use margay_core::{MargayError, Result};
use margay_seq::alphabet::symbol_index;
use margay_seq::codon::codon_index;

/// A sequence pair encoded against the marginal table's indexing scheme.
///
/// Derived from raw sequence text and immutable afterwards.
#[derive(Debug, Clone)]
pub struct EncodedPair {
    /// Per-position ancestor codes (`codon · 3 + offset`, in `[0, 192)`).
    pub ancestor: Vec<u16>,
    /// Per-nucleotide descendant symbol codes (in `[0, 15)`).
    pub descendant: Vec<u8>,
}

/// Encode an ancestor/descendant pair, validating lengths against the
/// codon frame and the gap unit.
///
/// # Errors
///
/// Returns a validation error if either sequence is empty, the ancestor
/// length is not a multiple of 3 and of `gap_unit`, the descendant length
/// is not a multiple of `gap_unit`, the ancestor contains a non-standard
/// base, or the descendant contains a byte outside the IUPAC alphabet.
pub fn encode_pair(ancestor: &[u8], descendant: &[u8], gap_unit: usize) -> Result<EncodedPair> {
    if ancestor.is_empty() || descendant.is_empty() {
        return Err(MargayError::InvalidInput(
            "sequences must not be empty".into(),
        ));
    }
    if ancestor.len() % 3 != 0 || ancestor.len() % gap_unit != 0 {
        return Err(MargayError::InvalidInput(format!(
            "length of ancestor sequence must be a multiple of 3 (got {})",
            ancestor.len()
        )));
    }
    if descendant.len() % gap_unit != 0 {
        return Err(MargayError::InvalidInput(format!(
            "length of descendant sequence must be a multiple of {} (got {})",
            gap_unit,
            descendant.len()
        )));
    }

    let mut anc = Vec::with_capacity(ancestor.len());
    for chunk in ancestor.chunks_exact(3) {
        let cod = codon_index(chunk).ok_or_else(|| {
            MargayError::InvalidInput(format!(
                "ancestor codon {:?} contains a non-standard base",
                String::from_utf8_lossy(chunk)
            ))
        })?;
        for offset in 0..3 {
            anc.push((cod * 3 + offset) as u16);
        }
    }

    let mut desc = Vec::with_capacity(descendant.len());
    for &b in descendant {
        let code = symbol_index(b).ok_or_else(|| {
            MargayError::InvalidInput(format!(
                "descendant base {:?} is not a nucleotide or IUPAC code",
                b as char
            ))
        })?;
        desc.push(code);
    }

    Ok(EncodedPair {
        ancestor: anc,
        descendant: desc,
    })
}
