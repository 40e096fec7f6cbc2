//! Scoring of existing alignments and score-only computation.
//!
//! [`score_alignment`] re-scores an already-aligned pair column by column
//! with the same transition terms the trellis uses, which makes it an
//! independent check on traceback weights. [`best_score`] computes the
//! optimal alignment score without materializing a full trellis, keeping
//! only a rolling window of `gap_unit + 1` rows.

use margay_core::{MargayError, Result};
use margay_model::MarginalTable;

use crate::encode::encode_pair;
use crate::params::GapModel;
use crate::trellis::DpState;

const GAP: u8 = b'-';

/// Score an existing alignment under the marginal model.
///
/// Both rows must have equal length; the ancestor with gaps removed must be
/// in frame. Scoring is per column regardless of the gap unit.
///
/// # Errors
///
/// Returns a validation error for mismatched lengths or malformed
/// sequences, and the dedicated model error if the alignment encodes an
/// insertion directly after a deletion, which the model does not define.
pub fn score_alignment(
    aligned_anc: &[u8],
    aligned_desc: &[u8],
    table: &MarginalTable,
    gap: &GapModel,
) -> Result<f64> {
    if aligned_anc.len() != aligned_desc.len() {
        return Err(MargayError::InvalidInput(
            "for alignment scoring both sequences must have equal length".into(),
        ));
    }
    let costs = gap.costs()?;

    let stripped: Vec<u8> = aligned_anc.iter().copied().filter(|&b| b != GAP).collect();
    let stripped_desc: Vec<u8> = aligned_desc.iter().copied().filter(|&b| b != GAP).collect();
    let pair = encode_pair(&stripped, &stripped_desc, 1)?;

    let mut weight = 0.0;
    let mut state = DpState::Match;
    // columns where the ancestor is gapped do not advance its encoding
    let mut anc_gaps = 0usize;
    let mut desc_pos = 0usize;

    for col in 0..aligned_anc.len() {
        let anc_gap = aligned_anc[col] == GAP;
        let desc_gap = aligned_desc[col] == GAP;
        match state {
            DpState::Match => {
                if anc_gap && desc_gap {
                    return Err(MargayError::InvalidInput(format!(
                        "alignment column {} has gaps in both rows",
                        col
                    )));
                } else if anc_gap {
                    weight += costs.gap_open;
                    state = DpState::Insertion;
                    anc_gaps += 1;
                    desc_pos += 1;
                } else if desc_gap {
                    weight += costs.no_gap + costs.gap_open;
                    state = DpState::Deletion;
                } else {
                    weight += 2.0 * costs.no_gap + emission_at(table, &pair, col - anc_gaps, desc_pos)?;
                    desc_pos += 1;
                }
            }
            DpState::Deletion => {
                if anc_gap {
                    return Err(MargayError::IllegalTransition(
                        "insertion after deletion is not modeled".into(),
                    ));
                } else if desc_gap {
                    weight += costs.gap_extend;
                } else {
                    weight += costs.gap_stop + emission_at(table, &pair, col - anc_gaps, desc_pos)?;
                    state = DpState::Match;
                    desc_pos += 1;
                }
            }
            DpState::Insertion => {
                if anc_gap && desc_gap {
                    return Err(MargayError::InvalidInput(format!(
                        "alignment column {} has gaps in both rows",
                        col
                    )));
                } else if anc_gap {
                    weight += costs.gap_extend;
                    anc_gaps += 1;
                    desc_pos += 1;
                } else if desc_gap {
                    weight += costs.gap_stop + costs.gap_open;
                    state = DpState::Deletion;
                } else {
                    weight += costs.gap_stop
                        + costs.no_gap
                        + emission_at(table, &pair, col - anc_gaps, desc_pos)?;
                    state = DpState::Match;
                    desc_pos += 1;
                }
            }
        }
    }

    match state {
        DpState::Match => weight += costs.no_gap,
        DpState::Insertion => weight += costs.gap_stop,
        DpState::Deletion => {}
    }
    Ok(weight)
}

fn emission_at(
    table: &MarginalTable,
    pair: &crate::encode::EncodedPair,
    anc_pos: usize,
    desc_pos: usize,
) -> Result<f64> {
    let anc_code = pair.ancestor[anc_pos];
    let desc_code = pair.descendant.get(desc_pos).copied().ok_or_else(|| {
        MargayError::InvalidInput("alignment descendant is shorter than its columns imply".into())
    })?;
    Ok(table.emission(anc_code, desc_code))
}

/// Optimal alignment score without a full trellis.
///
/// Runs the same recurrence as the trellis fill but keeps only
/// `gap_unit + 1` rows, so memory is linear in the descendant length. The
/// result is bit-identical to the terminal weight of a full fill.
///
/// # Errors
///
/// Returns a validation error for bad gap parameters or malformed
/// sequences.
pub fn best_score(ancestor: &[u8], descendant: &[u8], table: &MarginalTable, gap: &GapModel) -> Result<f64> {
    let costs = gap.costs()?;
    let pair = encode_pair(ancestor, descendant, costs.unit)?;
    let n = pair.ancestor.len();
    let m = pair.descendant.len();
    let unit = costs.unit;
    let window = unit + 1;

    // ring buffer of rows: index i % window
    let mut mch = vec![vec![f64::NEG_INFINITY; m + 1]; window];
    let mut ins = vec![vec![f64::NEG_INFINITY; m + 1]; window];
    let mut del = vec![vec![f64::NEG_INFINITY; m + 1]; window];

    for i in 0..=n {
        let row = i % window;
        // rotate: reset the row being overwritten
        for slot in [&mut mch, &mut ins, &mut del] {
            for value in slot[row].iter_mut() {
                *value = f64::NEG_INFINITY;
            }
        }
        if i == 0 {
            mch[row][0] = 0.0;
        }
        for j in 0..=m {
            if i > 0 && j > 0 {
                let prev = (i - 1) % window;
                let best = pick_best([
                    mch[prev][j - 1] + 2.0 * costs.no_gap,
                    ins[prev][j - 1] + costs.gap_stop + costs.no_gap,
                    del[prev][j - 1] + costs.gap_stop,
                ]);
                mch[row][j] = best + table.emission(pair.ancestor[i - 1], pair.descendant[j - 1]);
            }
            if j >= unit {
                let best = pick_best([
                    mch[row][j - unit] + costs.gap_open,
                    ins[row][j - unit] + costs.gap_extend,
                    f64::NEG_INFINITY,
                ]);
                ins[row][j] = best;
            }
            if i >= unit {
                let prev = (i - unit) % window;
                let best = pick_best([
                    mch[prev][j] + costs.no_gap + costs.gap_open,
                    ins[prev][j] + costs.gap_stop + costs.gap_open,
                    del[prev][j] + costs.gap_extend,
                ]);
                del[row][j] = best;
            }
        }
    }

    let last = n % window;
    let final_match = mch[last][m] + costs.no_gap;
    let final_del = del[last][m];
    Ok(if final_match >= final_del {
        final_match
    } else {
        final_del
    })
}

fn pick_best(candidates: [f64; 3]) -> f64 {
    let mut best = candidates[0];
    for &c in &candidates[1..] {
        if c > best {
            best = c;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::GapModel;
    use margay_model::{mg94_probability, yang94_rates, AmbiguityPolicy, MarginalTable};

    fn default_table() -> MarginalTable {
        let pi = [0.308, 0.185, 0.199, 0.308];
        let p = mg94_probability(0.0133, 0.2, &pi, &yang94_rates()).unwrap();
        MarginalTable::new(&p, &pi, AmbiguityPolicy::Average)
    }

    #[test]
    fn known_alignment_scores() {
        let table = default_table();
        let gap = GapModel::default();
        let cases: [(&[u8], &[u8], f64); 4] = [
            (b"CTCTGGATAGTG", b"CT----ATAGTG", 1.51294),
            (b"CTCT--AT", b"CTCTGGAT", -0.835939),
            (b"ACTCT-A", b"ACTCTG-", -8.73357),
            (b"ACTCTA-", b"ACTCTAG", -0.658564),
        ];
        for (anc, desc, expected) in cases {
            let w = score_alignment(anc, desc, &table, &gap).unwrap();
            assert!(
                (w - expected).abs() < 1e-4,
                "{} / {}: got {}, expected {}",
                String::from_utf8_lossy(anc),
                String::from_utf8_lossy(desc),
                w,
                expected
            );
        }
    }

    #[test]
    fn mismatched_lengths_fail() {
        let table = default_table();
        let err = score_alignment(b"CTC", b"CT", &table, &GapModel::default()).unwrap_err();
        assert!(matches!(err, MargayError::InvalidInput(_)));
    }

    #[test]
    fn insertion_after_deletion_is_model_error() {
        let table = default_table();
        let err =
            score_alignment(b"ATAC-GGGTC", b"ATA-GGGGTC", &table, &GapModel::default()).unwrap_err();
        assert!(matches!(err, MargayError::IllegalTransition(_)), "{:?}", err);
    }

    #[test]
    fn best_score_matches_trellis_terminal() {
        use crate::traceback::traceback;
        use crate::trellis::FullTrellis;
        let table = default_table();
        let gap = GapModel::default();
        for (anc, desc) in [
            (b"CTCTGGATAGTG".as_slice(), b"CTATAGTG".as_slice()),
            (b"CCCCCC".as_slice(), b"CCCC".as_slice()),
            (b"ATGAAACCCGGG".as_slice(), b"ATGAAATTTCCCGGG".as_slice()),
        ] {
            let pair = crate::encode::encode_pair(anc, desc, 1).unwrap();
            let trellis = FullTrellis::fill(&pair, &table, &gap).unwrap();
            let (_, _, w) = traceback(&trellis, anc, desc);
            let rolled = best_score(anc, desc, &table, &gap).unwrap();
            assert_eq!(w.to_bits(), rolled.to_bits(), "{:?}", String::from_utf8_lossy(anc));
        }
    }

    #[test]
    fn best_score_with_gap_unit_three() {
        let table = default_table();
        let gap = GapModel {
            unit: 3,
            ..GapModel::default()
        };
        let pair = crate::encode::encode_pair(b"ACGTTAAGGGGT", b"ACGAAT", 3).unwrap();
        let trellis = crate::trellis::FullTrellis::fill(&pair, &table, &gap).unwrap();
        let (_, _, w) = crate::traceback::traceback(&trellis, b"ACGTTAAGGGGT", b"ACGAAT");
        let rolled = best_score(b"ACGTTAAGGGGT", b"ACGAAT", &table, &gap).unwrap();
        assert_eq!(w.to_bits(), rolled.to_bits());
    }

    #[test]
    fn traceback_weight_matches_independent_scoring() {
        use crate::traceback::traceback;
        use crate::trellis::LeanTrellis;
        let table = default_table();
        let gap = GapModel::default();
        for (anc, desc) in [
            (b"CTCTGGATAGTG".as_slice(), b"CTATAGTG".as_slice()),
            (b"GCGACTGTT".as_slice(), b"GCGATTGCTGTT".as_slice()),
            (b"CCCCCC".as_slice(), b"CCCC".as_slice()),
            (b"ATGCAT".as_slice(), b"ATGCAT".as_slice()),
        ] {
            let pair = crate::encode::encode_pair(anc, desc, 1).unwrap();
            let trellis = LeanTrellis::fill(&pair, &table, &gap).unwrap();
            let (a, d, w) = traceback(&trellis, anc, desc);
            let rescored = score_alignment(&a, &d, &table, &gap).unwrap();
            assert!(
                (w - rescored).abs() < 1e-9,
                "traceback {} vs rescored {}",
                w,
                rescored
            );
        }
    }
}
