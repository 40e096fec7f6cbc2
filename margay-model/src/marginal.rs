//! Marginal emission tables.
//!
//! A codon substitution matrix scores codon-to-codon events, but the
//! alignment engine walks the descendant one nucleotide at a time. The
//! marginal table bridges the two: for every ancestor codon, codon
//! position, and descendant nucleotide it stores
//! `ln(Σ P[codon → codons matching nuc at pos] / π_nuc)` — the codon-level
//! probabilities summed ("marginalized") down to nucleotide emissions.
//! Eleven extra columns cover the IUPAC ambiguity codes, filled according
//! to the chosen [`AmbiguityPolicy`].

use margay_seq::alphabet::{compatible_bases, NUM_SYMBOLS};

use crate::mg94::NUM_CODONS;

/// Number of table rows: one per (codon, position) pair.
pub const NUM_ROWS: usize = NUM_CODONS * 3;

/// How an ambiguous descendant base is resolved during scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AmbiguityPolicy {
    /// Average the log emissions of the compatible bases.
    #[default]
    Average,
    /// Take the best (maximum) log emission among the compatible bases.
    Best,
}

/// The marginal emission table derived from a codon substitution matrix.
///
/// Rows are indexed `codon * 3 + position`; columns by descendant symbol
/// code (see [`margay_seq::alphabet`]). Immutable once built; an alignment
/// run owns exactly one.
#[derive(Debug, Clone)]
pub struct MarginalTable {
    rows: Vec<[f64; NUM_SYMBOLS]>,
    policy: AmbiguityPolicy,
}

impl MarginalTable {
    /// Derive the marginal table from a 64×64 transition probability matrix
    /// and the descendant nucleotide frequencies.
    pub fn new(p: &[Vec<f64>], pi: &[f64; 4], policy: AmbiguityPolicy) -> Self {
        let mut rows = vec![[0.0f64; NUM_SYMBOLS]; NUM_ROWS];

        for cod in 0..NUM_CODONS {
            for pos in 0..3 {
                let shift = (2 - pos) * 2;
                let row = &mut rows[cod * 3 + pos];
                for nuc in 0..4 {
                    let marg: f64 = (0..NUM_CODONS)
                        .filter(|&target| (target >> shift) & 3 == nuc)
                        .map(|target| p[cod][target])
                        .sum();
                    row[nuc] = (marg / pi[nuc]).ln();
                }
                for symbol in 4..NUM_SYMBOLS {
                    let bases = compatible_bases(symbol as u8);
                    row[symbol] = match policy {
                        AmbiguityPolicy::Average => {
                            bases.iter().map(|&b| row[b]).sum::<f64>() / bases.len() as f64
                        }
                        AmbiguityPolicy::Best => {
                            bases.iter().map(|&b| row[b]).fold(f64::NEG_INFINITY, f64::max)
                        }
                    };
                }
            }
        }

        Self { rows, policy }
    }

    /// Log emission score for an encoded ancestor position (`codon·3 + pos`)
    /// and an encoded descendant symbol.
    #[inline]
    pub fn emission(&self, anc_code: u16, desc_code: u8) -> f64 {
        self.rows[anc_code as usize][desc_code as usize]
    }

    /// The ambiguity policy this table was built with.
    pub fn policy(&self) -> AmbiguityPolicy {
        self.policy
    }
}
