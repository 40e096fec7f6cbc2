//! Muse & Gaut (1994) codon substitution matrix construction.
//!
//! The MG94 process allows only single-nucleotide codon changes. Each
//! allowed change is rated by the underlying nucleotide rate at the
//! differing position, scaled by ω when the change is nonsynonymous. The
//! generator is normalized to one expected substitution per unit time
//! (under the codon equilibrium frequencies) before being scaled by the
//! branch length and exponentiated.
//!
//! The generator is not time-reversible, so `P(t)` is computed by
//! scaling-and-squaring matrix exponentiation rather than an
//! eigendecomposition of a symmetrized form.

use margay_core::{MargayError, Result};
use margay_seq::codon::{codon_distance, is_synonymous};

use crate::rates::NucRates;

/// Number of codon states.
pub const NUM_CODONS: usize = 64;

/// Build the normalized MG94 generator matrix.
///
/// `pi` are nucleotide equilibrium frequencies (A, C, G, T); codon
/// frequencies are their per-position products. `rates` is the 4×4
/// nucleotide rate table (see [`crate::rates`]). Rows sum to zero; the
/// matrix is scaled so the mean substitution rate under the codon
/// frequencies is one, making branch lengths expected substitutions per
/// site.
pub fn mg94_generator(omega: f64, pi: &[f64; 4], rates: &NucRates) -> Vec<Vec<f64>> {
    let mut q = vec![vec![0.0f64; NUM_CODONS]; NUM_CODONS];
    let mut mean_rate = 0.0;

    for i in 0..NUM_CODONS {
        let codon_freq = pi[(i >> 4) & 3] * pi[(i >> 2) & 3] * pi[i & 3];
        let mut row_sum = 0.0;
        for j in 0..NUM_CODONS {
            if i == j || codon_distance(i, j) > 1 {
                continue;
            }
            let w = if is_synonymous(i, j) { 1.0 } else { omega };
            let (x, y) = differing_nucleotides(i, j);
            q[i][j] = w * rates[x][y];
            row_sum += q[i][j];
        }
        q[i][i] = -row_sum;
        mean_rate += codon_freq * row_sum;
    }

    for row in q.iter_mut() {
        for entry in row.iter_mut() {
            *entry /= mean_rate;
        }
    }
    q
}

/// Build the MG94 transition probability matrix `P = expm(Q·t)`.
///
/// # Errors
///
/// Returns a validation error if `branch_length ≤ 0`.
pub fn mg94_probability(
    branch_length: f64,
    omega: f64,
    pi: &[f64; 4],
    rates: &NucRates,
) -> Result<Vec<Vec<f64>>> {
    if branch_length <= 0.0 {
        return Err(MargayError::InvalidInput(
            "branch length must be positive".into(),
        ));
    }
    let q = mg94_generator(omega, pi, rates);
    transition_probability(&q, branch_length)
}

/// Exponentiate a user-supplied codon rate matrix for a branch length.
///
/// The matrix is used as given (no renormalization), matching the
/// semantics of rate matrices loaded from a table.
///
/// # Errors
///
/// Returns a validation error if `branch_length ≤ 0`.
pub fn transition_probability(rate_matrix: &[Vec<f64>], branch_length: f64) -> Result<Vec<Vec<f64>>> {
    if branch_length <= 0.0 {
        return Err(MargayError::InvalidInput(
            "branch length must be positive".into(),
        ));
    }
    let scaled: Vec<Vec<f64>> = rate_matrix
        .iter()
        .map(|row| row.iter().map(|&x| x * branch_length).collect())
        .collect();
    let mut p = expm(&scaled);
    for row in p.iter_mut() {
        for entry in row.iter_mut() {
            if *entry < 0.0 {
                *entry = 0.0;
            }
        }
    }
    Ok(p)
}

/// Nucleotide indices (from, to) at the single position where two codons
/// differ. Callers guarantee the codons differ at exactly one position.
fn differing_nucleotides(i: usize, j: usize) -> (usize, usize) {
    for shift in [4u32, 2, 0] {
        let x = (i >> shift) & 3;
        let y = (j >> shift) & 3;
        if x != y {
            return (x, y);
        }
    }
    // identical codons never reach here; fall back to position 3
    (i & 3, j & 3)
}

// ---------------------------------------------------------------------------
// Dense matrix exponential
// ---------------------------------------------------------------------------

/// Matrix exponential by scaling-and-squaring with a Taylor series.
///
/// The argument is halved until its max row sum drops below 0.25, the
/// series is summed to convergence, and the result squared back up. For
/// generator matrices scaled by short branch lengths the series converges
/// in a handful of terms.
fn expm(a: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let n = a.len();

    let mut norm = a
        .iter()
        .map(|row| row.iter().map(|x| x.abs()).sum::<f64>())
        .fold(0.0f64, f64::max);
    let mut squarings = 0u32;
    while norm > 0.25 {
        norm /= 2.0;
        squarings += 1;
    }
    let scale = 0.5f64.powi(squarings as i32);
    let s: Vec<Vec<f64>> = a
        .iter()
        .map(|row| row.iter().map(|&x| x * scale).collect())
        .collect();

    let mut result = identity(n);
    let mut term = identity(n);
    for m in 1..40 {
        term = matmul(&term, &s);
        let inv_m = 1.0 / m as f64;
        let mut max_term = 0.0f64;
        for row in term.iter_mut() {
            for entry in row.iter_mut() {
                *entry *= inv_m;
                max_term = max_term.max(entry.abs());
            }
        }
        for i in 0..n {
            for j in 0..n {
                result[i][j] += term[i][j];
            }
        }
        if max_term < 1e-19 {
            break;
        }
    }

    for _ in 0..squarings {
        result = matmul(&result, &result);
    }
    result
}

fn identity(n: usize) -> Vec<Vec<f64>> {
    let mut m = vec![vec![0.0; n]; n];
    for (i, row) in m.iter_mut().enumerate() {
        row[i] = 1.0;
    }
    m
}

fn matmul(a: &[Vec<f64>], b: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let n = a.len();
    let mut out = vec![vec![0.0; n]; n];
    for i in 0..n {
        for k in 0..n {
            let aik = a[i][k];
            if aik == 0.0 {
                continue;
            }
            for j in 0..n {
                out[i][j] += aik * b[k][j];
            }
        }
    }
    out
}
