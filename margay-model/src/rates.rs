//! Nucleotide substitution rate tables.
//!
//! The MG94 codon process is parameterized by a 4×4 instantaneous
//! nucleotide rate matrix. Two sources are provided: the Yang (1994)
//! empirical estimate used as the default, and a General Time-Reversible
//! construction from six exchangeability parameters. Either can be handed
//! to [`crate::mg94::mg94_probability`], so alternative defaults slot in
//! without touching the alignment engine.

use margay_core::{MargayError, Result};

/// A 4×4 instantaneous nucleotide rate matrix, indexed A=0, C=1, G=2, T=3.
pub type NucRates = [[f64; 4]; 4];

/// Yang (1994) empirical nucleotide substitution rates.
///
/// Rows sum to zero; this is the default rate table when no GTR
/// parameters are supplied.
pub fn yang94_rates() -> NucRates {
    [
        [-0.818, 0.132, 0.586, 0.1],
        [0.221, -1.349, 0.231, 0.897],
        [0.909, 0.215, -1.322, 0.198],
        [0.1, 0.537, 0.128, -0.765],
    ]
}

/// Build a GTR rate matrix from nucleotide frequencies and six symmetric
/// exchangeability parameters.
///
/// `sigma` is ordered (AC, AG, AT, CG, CT, GT). Off-diagonal entries are
/// `σ_pair · π_j`; diagonals make each row sum to zero.
///
/// # Errors
///
/// Returns a validation error if any σ value lies outside `[0, 1]`.
pub fn gtr_rates(pi: &[f64; 4], sigma: &[f64; 6]) -> Result<NucRates> {
    if sigma.iter().any(|&s| !(0.0..=1.0).contains(&s)) {
        return Err(MargayError::InvalidInput(
            "GTR sigma values must be in range [0, 1]".into(),
        ));
    }

    let mut q: NucRates = [[0.0; 4]; 4];
    q[0][1] = sigma[0]; // AC
    q[1][0] = sigma[0];
    q[0][2] = sigma[1]; // AG
    q[2][0] = sigma[1];
    q[0][3] = sigma[2]; // AT
    q[3][0] = sigma[2];
    q[1][2] = sigma[3]; // CG
    q[2][1] = sigma[3];
    q[1][3] = sigma[4]; // CT
    q[3][1] = sigma[4];
    q[2][3] = sigma[5]; // GT
    q[3][2] = sigma[5];

    for row in q.iter_mut() {
        for (j, entry) in row.iter_mut().enumerate() {
            *entry *= pi[j];
        }
    }
    for i in 0..4 {
        q[i][i] = -(0..4).filter(|&j| j != i).map(|j| q[i][j]).sum::<f64>();
    }

    Ok(q)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn frequencies() -> impl Strategy<Value = [f64; 4]> {
        [0.01..1.0f64, 0.01..1.0f64, 0.01..1.0f64, 0.01..1.0f64].prop_map(|raw| {
            let total: f64 = raw.iter().sum();
            [
                raw[0] / total,
                raw[1] / total,
                raw[2] / total,
                raw[3] / total,
            ]
        })
    }

    proptest! {
        #[test]
        fn gtr_rows_always_sum_to_zero(
            pi in frequencies(),
            sigma in [0.0..=1.0f64, 0.0..=1.0f64, 0.0..=1.0f64, 0.0..=1.0f64, 0.0..=1.0f64, 0.0..=1.0f64],
        ) {
            let q = gtr_rates(&pi, &sigma).unwrap();
            for row in &q {
                let sum: f64 = row.iter().sum();
                prop_assert!(sum.abs() < 1e-12, "row sums to {}", sum);
            }
        }

        #[test]
        fn gtr_satisfies_detailed_balance(
            pi in frequencies(),
            sigma in [0.0..=1.0f64, 0.0..=1.0f64, 0.0..=1.0f64, 0.0..=1.0f64, 0.0..=1.0f64, 0.0..=1.0f64],
        ) {
            // time reversibility: pi_i q_ij == pi_j q_ji
            let q = gtr_rates(&pi, &sigma).unwrap();
            for i in 0..4 {
                for j in 0..4 {
                    if i != j {
                        let forward = pi[i] * q[i][j];
                        let backward = pi[j] * q[j][i];
                        prop_assert!((forward - backward).abs() < 1e-12);
                    }
                }
            }
        }
    }
}
