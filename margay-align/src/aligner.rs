//! Top-level pairwise alignment orchestration.
//!
//! [`PairAligner`] owns one marginal model (built from [`ModelParams`] or a
//! user-supplied rate matrix) and one gap model, and runs alignments,
//! re-scoring, and sampling over [`SequencePair`]s. Each call owns its own
//! trellis and random state; nothing is shared between runs.

use margay_core::{MargayError, Result, Xorshift64};
use margay_model::{
    gtr_rates, mg94_probability, transition_probability, yang94_rates, AmbiguityPolicy,
    MarginalTable,
};

use crate::encode::encode_pair;
use crate::params::{GapModel, ModelParams};
use crate::sample::sample_path;
use crate::score::score_alignment;
use crate::traceback::traceback;
use crate::trellis::{FullTrellis, LeanTrellis};

/// Which trellis implementation an alignment run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrellisKind {
    /// Scores plus explicit back-pointers.
    Full,
    /// Scores only; predecessors re-derived during traceback.
    #[default]
    Lean,
}

/// Exactly two named sequences, ancestor first.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SequencePair {
    names: [String; 2],
    seqs: [String; 2],
}

impl SequencePair {
    /// Build a pair from reader output.
    ///
    /// # Errors
    ///
    /// Returns a validation error unless exactly two records are supplied.
    pub fn new(records: Vec<(String, String)>) -> Result<Self> {
        let mut it = records.into_iter();
        match (it.next(), it.next(), it.next()) {
            (Some(first), Some(second), None) => Ok(Self {
                names: [first.0, second.0],
                seqs: [first.1, second.1],
            }),
            _ => Err(MargayError::InvalidInput(
                "exactly two sequences required".into(),
            )),
        }
    }

    /// Sequence names, ancestor first.
    pub fn names(&self) -> &[String; 2] {
        &self.names
    }

    /// Raw sequences, ancestor first.
    pub fn seqs(&self) -> &[String; 2] {
        &self.seqs
    }

    /// Reorder the pair so the reference (ancestor) sits first.
    ///
    /// If `reference` names the second sequence the pair is swapped; if it
    /// names the first, nothing happens. With no reference name, `reverse`
    /// swaps unconditionally.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `reference` matches neither name and
    /// `reverse` is not set.
    pub fn select_reference(&mut self, reference: Option<&str>, reverse: bool) -> Result<()> {
        match reference {
            Some(name) if self.names[0] == name => Ok(()),
            Some(name) if self.names[1] == name => {
                self.swap();
                Ok(())
            }
            None if reverse => {
                self.swap();
                Ok(())
            }
            Some(_) if reverse => {
                self.swap();
                Ok(())
            }
            Some(name) => Err(MargayError::InvalidInput(format!(
                "name of reference sequence {:?} not found",
                name
            ))),
            None => Ok(()),
        }
    }

    fn swap(&mut self) {
        self.names.swap(0, 1);
        self.seqs.swap(0, 1);
    }
}

/// An aligned sequence pair with its path log-weight.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PairAlignment {
    /// Sequence names, ancestor first.
    pub names: [String; 2],
    /// Gapped sequences, ancestor first.
    pub seqs: [String; 2],
    /// Log-weight of the alignment path.
    pub weight: f64,
}

/// One sampled alignment and its log-weight relative to the trellis.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SampledAlignment {
    /// Gapped sequences, ancestor first.
    pub seqs: [String; 2],
    /// Log of the sample's relative probability mass.
    pub log_weight: f64,
}

/// Append-only sink for per-run alignment weights.
///
/// Passed into the engine by the caller so result accumulation stays an
/// explicit collaboration rather than ambient file state. Each call appends
/// one record; the sink keeps no running totals.
pub trait WeightSink {
    /// Record one `(source, model, weight)` triple.
    fn record(&mut self, source: &str, model: &str, weight: f64) -> Result<()>;
}

/// Pairwise aligner: one substitution model plus one gap model.
#[derive(Debug, Clone)]
pub struct PairAligner {
    table: MarginalTable,
    gap: GapModel,
}

/// Model identifier written to weight logs.
pub const MODEL_NAME: &str = "marginal";

impl PairAligner {
    /// Build an aligner from substitution model parameters.
    ///
    /// Any strictly positive σ selects the GTR nucleotide rates; otherwise
    /// the Yang (1994) empirical default applies.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a non-positive branch length,
    /// out-of-range σ, or bad gap parameters.
    pub fn new(model: &ModelParams, gap: GapModel, policy: AmbiguityPolicy) -> Result<Self> {
        gap.costs()?;
        let rates = if model.sigma.iter().any(|&s| s > 0.0) {
            gtr_rates(&model.pi, &model.sigma)?
        } else {
            yang94_rates()
        };
        let p = mg94_probability(model.branch_length, model.omega, &model.pi, &rates)?;
        Ok(Self {
            table: MarginalTable::new(&p, &model.pi, policy),
            gap,
        })
    }

    /// Build an aligner from a user-supplied 64×64 codon rate matrix.
    ///
    /// The matrix is exponentiated for the branch length as given, without
    /// renormalization.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a non-positive branch length or bad
    /// gap parameters.
    pub fn from_rate_matrix(
        rate_matrix: &[Vec<f64>],
        branch_length: f64,
        pi: &[f64; 4],
        gap: GapModel,
        policy: AmbiguityPolicy,
    ) -> Result<Self> {
        gap.costs()?;
        let p = transition_probability(rate_matrix, branch_length)?;
        Ok(Self {
            table: MarginalTable::new(&p, pi, policy),
            gap,
        })
    }

    /// The marginal emission table this aligner scores against.
    pub fn table(&self) -> &MarginalTable {
        &self.table
    }

    /// The gap model this aligner was built with.
    pub fn gap(&self) -> &GapModel {
        &self.gap
    }

    /// Align a pair with the default (lean) trellis.
    pub fn align(&self, pair: &SequencePair) -> Result<PairAlignment> {
        self.align_with(pair, TrellisKind::default())
    }

    /// Align a pair with an explicitly chosen trellis implementation.
    ///
    /// # Errors
    ///
    /// Validation errors for malformed sequences; a resource-exhaustion
    /// error if the trellis would exceed the cell bound.
    pub fn align_with(&self, pair: &SequencePair, kind: TrellisKind) -> Result<PairAlignment> {
        let anc = pair.seqs[0].as_bytes();
        let desc = pair.seqs[1].as_bytes();
        let encoded = encode_pair(anc, desc, self.gap.unit)?;
        let (aligned_anc, aligned_desc, weight) = match kind {
            TrellisKind::Full => {
                let trellis = FullTrellis::fill(&encoded, &self.table, &self.gap)?;
                traceback(&trellis, anc, desc)
            }
            TrellisKind::Lean => {
                let trellis = LeanTrellis::fill(&encoded, &self.table, &self.gap)?;
                traceback(&trellis, anc, desc)
            }
        };
        Ok(PairAlignment {
            names: pair.names.clone(),
            seqs: [string_from(aligned_anc), string_from(aligned_desc)],
            weight,
        })
    }

    /// Score an already-aligned pair without realigning it.
    ///
    /// # Errors
    ///
    /// Validation errors for mismatched row lengths; the dedicated model
    /// error for an insertion directly after a deletion.
    pub fn score_aligned(&self, pair: &SequencePair) -> Result<f64> {
        score_alignment(
            pair.seqs[0].as_bytes(),
            pair.seqs[1].as_bytes(),
            &self.table,
            &self.gap,
        )
    }

    /// Draw `sample_size` alignments from the pair's trellis.
    ///
    /// The random state is exclusively borrowed for the whole call and
    /// advances deterministically; the same seed reproduces the same
    /// ordered samples.
    pub fn sample(
        &self,
        pair: &SequencePair,
        sample_size: usize,
        rng: &mut Xorshift64,
    ) -> Result<Vec<SampledAlignment>> {
        let anc = pair.seqs[0].as_bytes();
        let desc = pair.seqs[1].as_bytes();
        let encoded = encode_pair(anc, desc, self.gap.unit)?;
        let trellis = FullTrellis::fill(&encoded, &self.table, &self.gap)?;
        let mut samples = Vec::with_capacity(sample_size);
        for _ in 0..sample_size {
            let (a, d, log_weight) = sample_path(&trellis, anc, desc, rng);
            samples.push(SampledAlignment {
                seqs: [string_from(a), string_from(d)],
                log_weight,
            });
        }
        Ok(samples)
    }

    /// Align a pair and record the weight to a sink as one
    /// `(source, model, weight)` record.
    pub fn align_recorded(
        &self,
        pair: &SequencePair,
        source: &str,
        sink: &mut dyn WeightSink,
    ) -> Result<PairAlignment> {
        let alignment = self.align(pair)?;
        sink.record(source, MODEL_NAME, alignment.weight)?;
        Ok(alignment)
    }
}

fn string_from(bytes: Vec<u8>) -> String {
    // aligned rows are original sequence bytes plus ASCII gaps
    String::from_utf8_lossy(&bytes).into_owned()
}
