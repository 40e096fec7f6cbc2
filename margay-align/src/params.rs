//! Alignment parameters.

use margay_core::{MargayError, Result};

/// Affine (geometric) gap model.
///
/// `open` and `extend` are probabilities, not penalties; the engine works
/// with their logarithms. `unit` is the indel granularity: 1 for ordinary
/// alignment, 3 to force frame-preserving gaps.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GapModel {
    /// Probability of opening a gap.
    pub open: f64,
    /// Probability of extending an open gap by one unit.
    pub extend: f64,
    /// Gap unit length in nucleotides (1 or 3).
    pub unit: usize,
}

impl Default for GapModel {
    fn default() -> Self {
        Self {
            open: 0.001,
            extend: 1.0 - 1.0 / 6.0,
            unit: 1,
        }
    }
}

impl GapModel {
    /// Derive the log-space transition costs, validating the parameters.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `open`/`extend` are not in `(0, 1)`
    /// or `unit` is not 1 or 3.
    pub fn costs(&self) -> Result<GapCosts> {
        if !(self.open > 0.0 && self.open < 1.0) || !(self.extend > 0.0 && self.extend < 1.0) {
            return Err(MargayError::InvalidInput(
                "gap open and extend probabilities must be in (0, 1)".into(),
            ));
        }
        if self.unit != 1 && self.unit != 3 {
            return Err(MargayError::InvalidInput(format!(
                "gap unit length must be 1 or 3, got {}",
                self.unit
            )));
        }
        Ok(GapCosts {
            no_gap: (-self.open).ln_1p(),
            gap_stop: (-self.extend).ln_1p(),
            gap_open: self.open.ln(),
            gap_extend: self.extend.ln(),
            unit: self.unit,
        })
    }
}

/// Log-space gap transition costs derived from a [`GapModel`].
#[derive(Debug, Clone)]
pub struct GapCosts {
    /// `ln(1 − open)` — no gap opened at an opportunity.
    pub no_gap: f64,
    /// `ln(1 − extend)` — an open gap closes.
    pub gap_stop: f64,
    /// `ln(open)`.
    pub gap_open: f64,
    /// `ln(extend)`.
    pub gap_extend: f64,
    /// Gap unit length in nucleotides.
    pub unit: usize,
}

/// Substitution model parameters for an alignment run.
///
/// `sigma` holds the six GTR exchangeabilities (AC, AG, AT, CG, CT, GT);
/// any strictly positive entry switches the nucleotide rates from the
/// Yang (1994) empirical default to the GTR construction.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModelParams {
    /// Branch length separating the two sequences.
    pub branch_length: f64,
    /// Nonsynonymous/synonymous rate bias ω.
    pub omega: f64,
    /// Nucleotide equilibrium frequencies (A, C, G, T).
    pub pi: [f64; 4],
    /// GTR exchangeability parameters; all-zero selects the empirical default.
    pub sigma: [f64; 6],
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            branch_length: 0.0133,
            omega: 0.2,
            pi: [0.308, 0.185, 0.199, 0.308],
            sigma: [0.0; 6],
        }
    }
}
