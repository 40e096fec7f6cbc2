//! Log-space probability math for numerically stable scoring.
//!
//! All alignment scores in Margay are natural-log probabilities; chaining
//! them multiplies tiny numbers that underflow `f64` quickly, so sums over
//! alternatives go through [`log_sum_exp`] instead of raw `exp`/`ln`.

/// Numerically stable `ln(exp(a) + exp(b))`.
pub fn log_sum_exp(a: f64, b: f64) -> f64 {
    if a == f64::NEG_INFINITY {
        return b;
    }
    if b == f64::NEG_INFINITY {
        return a;
    }
    let (max, min) = if a >= b { (a, b) } else { (b, a) };
    max + (min - max).exp().ln_1p()
}

/// Log-sum-exp over a slice, `ln(Σ exp(x_i))`.
///
/// Returns negative infinity for an empty slice or a slice of
/// impossibilities.
pub fn log_sum_exp_slice(xs: &[f64]) -> f64 {
    let max = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max == f64::NEG_INFINITY {
        return f64::NEG_INFINITY;
    }
    max + xs.iter().map(|&x| (x - max).exp()).sum::<f64>().ln()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_sum_exp_basic() {
        let a = 2.0_f64.ln();
        let b = 3.0_f64.ln();
        let result = log_sum_exp(a, b);
        let expected = 5.0_f64.ln();
        assert!(
            (result - expected).abs() < 1e-12,
            "log_sum_exp({}, {}) = {}, expected {}",
            a,
            b,
            result,
            expected
        );
    }

    #[test]
    fn log_sum_exp_neg_infinity() {
        assert_eq!(log_sum_exp(f64::NEG_INFINITY, 0.0), 0.0);
        assert_eq!(log_sum_exp(0.0, f64::NEG_INFINITY), 0.0);
        assert_eq!(
            log_sum_exp(f64::NEG_INFINITY, f64::NEG_INFINITY),
            f64::NEG_INFINITY
        );
    }

    #[test]
    fn log_sum_exp_symmetric() {
        let a = -3.7;
        let b = -0.2;
        assert!((log_sum_exp(a, b) - log_sum_exp(b, a)).abs() < 1e-15);
    }

    #[test]
    fn slice_matches_pairwise() {
        let xs = [0.5_f64.ln(), 0.25_f64.ln(), 0.125_f64.ln()];
        let pairwise = log_sum_exp(log_sum_exp(xs[0], xs[1]), xs[2]);
        assert!((log_sum_exp_slice(&xs) - pairwise).abs() < 1e-12);
        assert!((log_sum_exp_slice(&xs) - 0.875_f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn slice_empty_is_impossible() {
        assert_eq!(log_sum_exp_slice(&[]), f64::NEG_INFINITY);
        assert_eq!(
            log_sum_exp_slice(&[f64::NEG_INFINITY, f64::NEG_INFINITY]),
            f64::NEG_INFINITY
        );
    }
}
