//! Three-state affine-gap Viterbi trellis over an encoded sequence pair.
//!
//! The trellis is a `(|anc|+1) × (|desc|+1)` grid holding, per cell, the
//! best cumulative log-score of reaching that cell in each of three states:
//!
//! - **M** — match/mismatch: both sequences advance one position
//! - **I** — insertion (gap in the ancestor): the descendant advances one
//!   gap unit
//! - **D** — deletion (gap in the descendant): the ancestor advances one
//!   gap unit
//!
//! Scores combine the affine gap costs with the marginal emission table;
//! once a cell is populated it is never mutated. Two implementations of the
//! [`Trellis`] capability are provided: [`FullTrellis`] additionally stores
//! a back-pointer per cell and state for direct traceback, while
//! [`LeanTrellis`] keeps only the score tables and re-derives each
//! predecessor on demand by re-evaluating the same candidate transitions.
//! Both run the identical fill and therefore produce bit-identical scores.

use margay_core::{MargayError, Result};
use margay_model::MarginalTable;

use crate::encode::EncodedPair;
use crate::params::{GapCosts, GapModel};

/// Practical bound on trellis size, in cells. Larger tables are rejected
/// with a resource-exhaustion error before any allocation happens.
pub const MAX_TRELLIS_CELLS: usize = 1 << 26;

/// One of the three alignment states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DpState {
    /// Both sequences emit (match or mismatch).
    Match,
    /// Gap in the ancestor; only the descendant emits.
    Insertion,
    /// Gap in the descendant; only the ancestor emits.
    Deletion,
}

/// Candidate enumeration order. Ties between equal-scoring predecessors are
/// broken toward the earlier state in this order, in the fill, in both
/// traceback variants, and in the sampler, so the implementations cannot
/// diverge.
pub(crate) const STATE_ORDER: [DpState; 3] = [DpState::Match, DpState::Insertion, DpState::Deletion];

impl DpState {
    fn as_u8(self) -> u8 {
        match self {
            DpState::Match => 0,
            DpState::Insertion => 1,
            DpState::Deletion => 2,
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            0 => DpState::Match,
            1 => DpState::Insertion,
            _ => DpState::Deletion,
        }
    }
}

/// Common capability of both trellis implementations: populated scores,
/// predecessor queries, and the gap costs the fill used.
pub trait Trellis {
    /// Ancestor length (grid rows minus one).
    fn ancestor_len(&self) -> usize;

    /// Descendant length (grid columns minus one).
    fn descendant_len(&self) -> usize;

    /// The log-space gap costs this trellis was filled with.
    fn costs(&self) -> &GapCosts;

    /// Best cumulative log-score of reaching `(i, j)` in `state`.
    fn score(&self, state: DpState, i: usize, j: usize) -> f64;

    /// The predecessor state of the best path into `(i, j)` in `state`.
    fn predecessor(&self, state: DpState, i: usize, j: usize) -> DpState;

    /// Candidate predecessor scores for entering `(i, j)` in `state`, in
    /// M, I, D order; impossible transitions are negative infinity. For
    /// the match state the emission term is excluded (it applies equally
    /// to all three candidates).
    fn candidates(&self, state: DpState, i: usize, j: usize) -> [f64; 3];
}

// ---------------------------------------------------------------------------
// Shared score storage and recurrence
// ---------------------------------------------------------------------------

/// The three score tables plus the recurrence over them.
#[derive(Debug, Clone)]
struct ScoreTables {
    mch: Vec<f64>,
    ins: Vec<f64>,
    del: Vec<f64>,
    cols: usize,
    rows: usize,
    costs: GapCosts,
}

impl ScoreTables {
    fn allocate(rows: usize, cols: usize, costs: GapCosts) -> Result<Self> {
        let cells = rows
            .checked_mul(cols)
            .filter(|&c| c <= MAX_TRELLIS_CELLS)
            .ok_or_else(|| {
                MargayError::ResourceLimit(format!(
                    "alignment table of {} x {} cells exceeds the {} cell bound",
                    rows, cols, MAX_TRELLIS_CELLS
                ))
            })?;
        Ok(Self {
            mch: vec![f64::NEG_INFINITY; cells],
            ins: vec![f64::NEG_INFINITY; cells],
            del: vec![f64::NEG_INFINITY; cells],
            cols,
            rows,
            costs,
        })
    }

    #[inline]
    fn idx(&self, i: usize, j: usize) -> usize {
        i * self.cols + j
    }

    #[inline]
    fn get(&self, state: DpState, i: usize, j: usize) -> f64 {
        let idx = self.idx(i, j);
        match state {
            DpState::Match => self.mch[idx],
            DpState::Insertion => self.ins[idx],
            DpState::Deletion => self.del[idx],
        }
    }

    /// Candidate predecessor scores for entering `(i, j)` in `state`,
    /// in M, I, D order. This single function defines the recurrence; the
    /// fill, the lean traceback, and the sampler all go through it.
    fn candidates(&self, state: DpState, i: usize, j: usize) -> [f64; 3] {
        let c = &self.costs;
        let unit = c.unit;
        match state {
            DpState::Match => {
                if i == 0 || j == 0 {
                    return [f64::NEG_INFINITY; 3];
                }
                let idx = self.idx(i - 1, j - 1);
                [
                    self.mch[idx] + 2.0 * c.no_gap,
                    self.ins[idx] + c.gap_stop + c.no_gap,
                    self.del[idx] + c.gap_stop,
                ]
            }
            DpState::Insertion => {
                if j < unit {
                    return [f64::NEG_INFINITY; 3];
                }
                let idx = self.idx(i, j - unit);
                [
                    self.mch[idx] + c.gap_open,
                    self.ins[idx] + c.gap_extend,
                    f64::NEG_INFINITY,
                ]
            }
            DpState::Deletion => {
                if i < unit {
                    return [f64::NEG_INFINITY; 3];
                }
                let idx = self.idx(i - unit, j);
                [
                    self.mch[idx] + c.no_gap + c.gap_open,
                    self.ins[idx] + c.gap_stop + c.gap_open,
                    self.del[idx] + c.gap_extend,
                ]
            }
        }
    }

    /// Best candidate and its state, ties broken toward the earlier state.
    fn best(&self, state: DpState, i: usize, j: usize) -> (f64, DpState) {
        let cand = self.candidates(state, i, j);
        let mut best = cand[0];
        let mut pred = STATE_ORDER[0];
        for (k, &value) in cand.iter().enumerate().skip(1) {
            if value > best {
                best = value;
                pred = STATE_ORDER[k];
            }
        }
        (best, pred)
    }
}

/// Run the Viterbi fill over pre-allocated tables, reporting each populated
/// cell's predecessor to `record(state, cell_index, predecessor)`.
fn run_fill(
    pair: &EncodedPair,
    table: &MarginalTable,
    t: &mut ScoreTables,
    mut record: impl FnMut(DpState, usize, DpState),
) {
    let unit = t.costs.unit;

    t.mch[0] = 0.0;

    for i in 0..t.rows {
        for j in 0..t.cols {
            let idx = t.idx(i, j);
            if i > 0 && j > 0 {
                let (best, pred) = t.best(DpState::Match, i, j);
                let emission = table.emission(pair.ancestor[i - 1], pair.descendant[j - 1]);
                t.mch[idx] = best + emission;
                record(DpState::Match, idx, pred);
            }
            if j >= unit {
                let (best, pred) = t.best(DpState::Insertion, i, j);
                t.ins[idx] = best;
                record(DpState::Insertion, idx, pred);
            }
            if i >= unit {
                let (best, pred) = t.best(DpState::Deletion, i, j);
                t.del[idx] = best;
                record(DpState::Deletion, idx, pred);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Full variant: scores plus back-pointers
// ---------------------------------------------------------------------------

/// Trellis variant that stores an explicit back-pointer per cell and state,
/// enabling direct traceback at three extra bytes per cell.
#[derive(Debug, Clone)]
pub struct FullTrellis {
    tables: ScoreTables,
    bp_mch: Vec<u8>,
    bp_ins: Vec<u8>,
    bp_del: Vec<u8>,
}

impl FullTrellis {
    /// Fill the trellis for an encoded pair.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad gap parameters and a
    /// resource-exhaustion error if the table would exceed
    /// [`MAX_TRELLIS_CELLS`].
    pub fn fill(pair: &EncodedPair, table: &MarginalTable, gap: &GapModel) -> Result<Self> {
        let costs = gap.costs()?;
        let mut tables =
            ScoreTables::allocate(pair.ancestor.len() + 1, pair.descendant.len() + 1, costs)?;
        let cells = tables.mch.len();
        let mut bp_mch = vec![0u8; cells];
        let mut bp_ins = vec![0u8; cells];
        let mut bp_del = vec![0u8; cells];
        run_fill(pair, table, &mut tables, |state, idx, pred| {
            let slot = match state {
                DpState::Match => &mut bp_mch[idx],
                DpState::Insertion => &mut bp_ins[idx],
                DpState::Deletion => &mut bp_del[idx],
            };
            *slot = pred.as_u8();
        });
        Ok(Self {
            tables,
            bp_mch,
            bp_ins,
            bp_del,
        })
    }
}

impl Trellis for FullTrellis {
    fn ancestor_len(&self) -> usize {
        self.tables.rows - 1
    }

    fn descendant_len(&self) -> usize {
        self.tables.cols - 1
    }

    fn costs(&self) -> &GapCosts {
        &self.tables.costs
    }

    fn score(&self, state: DpState, i: usize, j: usize) -> f64 {
        self.tables.get(state, i, j)
    }

    fn predecessor(&self, state: DpState, i: usize, j: usize) -> DpState {
        let idx = self.tables.idx(i, j);
        let raw = match state {
            DpState::Match => self.bp_mch[idx],
            DpState::Insertion => self.bp_ins[idx],
            DpState::Deletion => self.bp_del[idx],
        };
        DpState::from_u8(raw)
    }

    fn candidates(&self, state: DpState, i: usize, j: usize) -> [f64; 3] {
        self.tables.candidates(state, i, j)
    }
}

// ---------------------------------------------------------------------------
// Lean variant: scores only
// ---------------------------------------------------------------------------

/// Trellis variant that keeps only the three score tables. Predecessors are
/// re-derived during traceback by re-running the candidate comparison
/// against the stored neighbor scores, trading recomputation for memory.
#[derive(Debug, Clone)]
pub struct LeanTrellis {
    tables: ScoreTables,
}

impl LeanTrellis {
    /// Fill the trellis for an encoded pair.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad gap parameters and a
    /// resource-exhaustion error if the table would exceed
    /// [`MAX_TRELLIS_CELLS`].
    pub fn fill(pair: &EncodedPair, table: &MarginalTable, gap: &GapModel) -> Result<Self> {
        let costs = gap.costs()?;
        let mut tables =
            ScoreTables::allocate(pair.ancestor.len() + 1, pair.descendant.len() + 1, costs)?;
        run_fill(pair, table, &mut tables, |_, _, _| {});
        Ok(Self { tables })
    }
}

impl Trellis for LeanTrellis {
    fn ancestor_len(&self) -> usize {
        self.tables.rows - 1
    }

    fn descendant_len(&self) -> usize {
        self.tables.cols - 1
    }

    fn costs(&self) -> &GapCosts {
        &self.tables.costs
    }

    fn score(&self, state: DpState, i: usize, j: usize) -> f64 {
        self.tables.get(state, i, j)
    }

    fn predecessor(&self, state: DpState, i: usize, j: usize) -> DpState {
        self.tables.best(state, i, j).1
    }

    fn candidates(&self, state: DpState, i: usize, j: usize) -> [f64; 3] {
        self.tables.candidates(state, i, j)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::encode_pair;
    use margay_model::{mg94_probability, yang94_rates, AmbiguityPolicy, MarginalTable};

    fn default_table() -> MarginalTable {
        let pi = [0.308, 0.185, 0.199, 0.308];
        let p = mg94_probability(0.0133, 0.2, &pi, &yang94_rates()).unwrap();
        MarginalTable::new(&p, &pi, AmbiguityPolicy::Average)
    }

    #[test]
    fn variants_agree_exactly() {
        let table = default_table();
        let gap = GapModel::default();
        for (anc, desc) in [
            (b"CTCTGGATAGTG".as_slice(), b"CTATAGTG".as_slice()),
            (b"GCGACTGTT".as_slice(), b"GCGATTGCTGTT".as_slice()),
            (b"ATGCAT".as_slice(), b"ATGCAT".as_slice()),
        ] {
            let pair = encode_pair(anc, desc, 1).unwrap();
            let full = FullTrellis::fill(&pair, &table, &gap).unwrap();
            let lean = LeanTrellis::fill(&pair, &table, &gap).unwrap();
            for i in 0..=pair.ancestor.len() {
                for j in 0..=pair.descendant.len() {
                    for state in STATE_ORDER {
                        // bit-identical scores, identical predecessors
                        assert_eq!(
                            full.score(state, i, j).to_bits(),
                            lean.score(state, i, j).to_bits(),
                            "score mismatch at ({}, {}) {:?}",
                            i,
                            j,
                            state
                        );
                        if full.score(state, i, j) > f64::NEG_INFINITY && (i > 0 || j > 0) {
                            assert_eq!(
                                full.predecessor(state, i, j),
                                lean.predecessor(state, i, j),
                                "predecessor mismatch at ({}, {}) {:?}",
                                i,
                                j,
                                state
                            );
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn origin_cell_is_certain_match() {
        let table = default_table();
        let pair = encode_pair(b"ATGCAT", b"ATG", 1).unwrap();
        let t = LeanTrellis::fill(&pair, &table, &GapModel::default()).unwrap();
        assert_eq!(t.score(DpState::Match, 0, 0), 0.0);
        assert_eq!(t.score(DpState::Insertion, 0, 0), f64::NEG_INFINITY);
        assert_eq!(t.score(DpState::Deletion, 0, 0), f64::NEG_INFINITY);
    }

    #[test]
    fn first_row_is_insertion_only() {
        let table = default_table();
        let pair = encode_pair(b"ATGCAT", b"ATG", 1).unwrap();
        let t = LeanTrellis::fill(&pair, &table, &GapModel::default()).unwrap();
        for j in 1..=3 {
            assert_eq!(t.score(DpState::Match, 0, j), f64::NEG_INFINITY);
            assert!(t.score(DpState::Insertion, 0, j) > f64::NEG_INFINITY);
        }
        for i in 1..=6 {
            assert!(t.score(DpState::Deletion, i, 0) > f64::NEG_INFINITY);
        }
    }

    #[test]
    fn gap_unit_three_blocks_short_gaps() {
        let table = default_table();
        let gap = GapModel {
            unit: 3,
            ..GapModel::default()
        };
        let pair = encode_pair(b"ATGCATACG", b"ATGCAT", 3).unwrap();
        let t = LeanTrellis::fill(&pair, &table, &gap).unwrap();
        // cells closer than one unit to the margin cannot hold a gap state
        assert_eq!(t.score(DpState::Insertion, 0, 1), f64::NEG_INFINITY);
        assert_eq!(t.score(DpState::Insertion, 0, 2), f64::NEG_INFINITY);
        assert!(t.score(DpState::Insertion, 0, 3) > f64::NEG_INFINITY);
        assert_eq!(t.score(DpState::Deletion, 2, 0), f64::NEG_INFINITY);
        assert!(t.score(DpState::Deletion, 3, 0) > f64::NEG_INFINITY);
    }

    #[test]
    fn oversized_table_is_resource_error() {
        let table = default_table();
        let pair = EncodedPair {
            ancestor: vec![0; 10_000],
            descendant: vec![0; 10_000],
        };
        let err = LeanTrellis::fill(&pair, &table, &GapModel::default()).unwrap_err();
        assert!(matches!(err, MargayError::ResourceLimit(_)), "{:?}", err);
        let err = FullTrellis::fill(&pair, &table, &GapModel::default()).unwrap_err();
        assert!(matches!(err, MargayError::ResourceLimit(_)), "{:?}", err);
    }

    #[test]
    fn insertion_never_follows_deletion() {
        // the I-state candidate list has no D entry, in either variant
        let table = default_table();
        let pair = encode_pair(b"CTCTGGATAGTG", b"CTATAGTG", 1).unwrap();
        let t = FullTrellis::fill(&pair, &table, &GapModel::default()).unwrap();
        for i in 0..=pair.ancestor.len() {
            for j in 1..=pair.descendant.len() {
                assert_eq!(t.candidates(DpState::Insertion, i, j)[2], f64::NEG_INFINITY);
                if t.score(DpState::Insertion, i, j) > f64::NEG_INFINITY {
                    assert_ne!(t.predecessor(DpState::Insertion, i, j), DpState::Deletion);
                }
            }
        }
    }
}
