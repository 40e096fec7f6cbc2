//! Marginal codon-aware pairwise alignment for the Margay toolkit.
//!
//! Aligns an in-frame ancestor against a descendant under a marginalized
//! codon substitution model, using a three-state (match / insertion /
//! deletion) affine-gap Viterbi recurrence in log space. Besides the best
//! alignment the crate offers independent re-scoring of existing
//! alignments and posterior-weighted stochastic sampling over the same
//! trellis.
//!
//! # Quick start
//!
//! ```
//! use margay_align::{GapModel, ModelParams, PairAligner, SequencePair};
//! use margay_model::AmbiguityPolicy;
//!
//! let aligner = PairAligner::new(
//!     &ModelParams::default(),
//!     GapModel::default(),
//!     AmbiguityPolicy::Average,
//! )
//! .unwrap();
//! let pair = SequencePair::new(vec![
//!     ("anc".to_string(), "CTCTGGATAGTG".to_string()),
//!     ("des".to_string(), "CTATAGTG".to_string()),
//! ])
//! .unwrap();
//! let result = aligner.align(&pair).unwrap();
//! assert_eq!(result.seqs[1], "CT----ATAGTG");
//! ```

pub mod aligner;
pub mod encode;
pub mod params;
pub mod sample;
pub mod score;
pub mod traceback;
pub mod trellis;

pub use aligner::{
    PairAligner, PairAlignment, SampledAlignment, SequencePair, TrellisKind, WeightSink,
    MODEL_NAME,
};
pub use encode::{encode_pair, EncodedPair};
pub use params::{GapCosts, GapModel, ModelParams};
pub use sample::sample_path;
pub use score::{best_score, score_alignment};
pub use traceback::traceback;
pub use trellis::{DpState, FullTrellis, LeanTrellis, Trellis, MAX_TRELLIS_CELLS};

#[cfg(test)]
mod proptests {
    use super::*;
    use margay_model::{mg94_probability, yang94_rates, AmbiguityPolicy, MarginalTable};
    use proptest::prelude::*;
    use std::sync::OnceLock;

    // built once; rebuilding the substitution model per case would dominate
    // the run time of every property below
    fn default_table() -> &'static MarginalTable {
        static TABLE: OnceLock<MarginalTable> = OnceLock::new();
        TABLE.get_or_init(|| {
            let pi = [0.308, 0.185, 0.199, 0.308];
            let p = mg94_probability(0.0133, 0.2, &pi, &yang94_rates()).unwrap();
            MarginalTable::new(&p, &pi, AmbiguityPolicy::Average)
        })
    }

    fn coding_seq(max_codons: usize) -> impl Strategy<Value = Vec<u8>> {
        proptest::collection::vec(
            prop_oneof![Just(b'A'), Just(b'C'), Just(b'G'), Just(b'T')],
            3..=(max_codons * 3),
        )
        .prop_map(|v| {
            let len = v.len() - (v.len() % 3);
            v[..len].to_vec()
        })
    }

    fn dna_seq(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
        proptest::collection::vec(
            prop_oneof![Just(b'A'), Just(b'C'), Just(b'G'), Just(b'T')],
            1..=max_len,
        )
    }

    proptest! {
        #[test]
        fn trellis_variants_never_diverge(anc in coding_seq(8), desc in dna_seq(20)) {
            let table = default_table();
            let gap = GapModel::default();
            let pair = encode_pair(&anc, &desc, 1).unwrap();
            let full = FullTrellis::fill(&pair, table, &gap).unwrap();
            let lean = LeanTrellis::fill(&pair, table, &gap).unwrap();
            let (fa, fd, fw) = traceback(&full, &anc, &desc);
            let (la, ld, lw) = traceback(&lean, &anc, &desc);
            prop_assert_eq!(fa, la);
            prop_assert_eq!(fd, ld);
            prop_assert_eq!(fw.to_bits(), lw.to_bits());
        }

        #[test]
        fn traceback_weight_rescoring_agrees(anc in coding_seq(8), desc in dna_seq(20)) {
            let table = default_table();
            let gap = GapModel::default();
            let pair = encode_pair(&anc, &desc, 1).unwrap();
            let trellis = LeanTrellis::fill(&pair, table, &gap).unwrap();
            let (a, d, w) = traceback(&trellis, &anc, &desc);
            let rescored = score_alignment(&a, &d, table, &gap).unwrap();
            prop_assert!((w - rescored).abs() < 1e-9, "traceback {} vs rescored {}", w, rescored);
        }

        #[test]
        fn alignment_consumes_both_sequences(anc in coding_seq(8), desc in dna_seq(20)) {
            let table = default_table();
            let gap = GapModel::default();
            let pair = encode_pair(&anc, &desc, 1).unwrap();
            let trellis = LeanTrellis::fill(&pair, table, &gap).unwrap();
            let (a, d, _) = traceback(&trellis, &anc, &desc);
            prop_assert_eq!(a.len(), d.len());
            prop_assert_eq!(a.iter().filter(|&&b| b != b'-').count(), anc.len());
            prop_assert_eq!(d.iter().filter(|&&b| b != b'-').count(), desc.len());
        }

        #[test]
        fn rolling_score_matches_trellis(anc in coding_seq(6), desc in dna_seq(15)) {
            let table = default_table();
            let gap = GapModel::default();
            let pair = encode_pair(&anc, &desc, 1).unwrap();
            let trellis = LeanTrellis::fill(&pair, table, &gap).unwrap();
            let (_, _, w) = traceback(&trellis, &anc, &desc);
            let rolled = best_score(&anc, &desc, table, &gap).unwrap();
            prop_assert_eq!(w.to_bits(), rolled.to_bits());
        }
    }
}
