//! Stochastic traceback: sampling alignments from a populated trellis.
//!
//! Instead of following the best predecessor, each backward step draws a
//! predecessor from the categorical distribution obtained by exponentiating
//! and normalizing the candidate transition scores. The sum of the chosen
//! conditional log-probabilities is the sample's log-weight — the relative
//! mass of the drawn alignment among the paths the trellis represents.
//! With a fixed seed the draw sequence, and therefore the sampled
//! alignments, are fully reproducible.

use margay_core::prob::log_sum_exp_slice;
use margay_core::Xorshift64;

use crate::trellis::{DpState, Trellis, STATE_ORDER};

/// Draw one alignment from the trellis using the caller's random state.
///
/// Returns the gapped ancestor, the gapped descendant, and the sample's
/// log-weight. The terminal state is drawn from match (with its gap-close
/// term), insertion (with its extension-stop term), and deletion.
pub fn sample_path<T: Trellis>(
    trellis: &T,
    ancestor: &[u8],
    descendant: &[u8],
    rng: &mut Xorshift64,
) -> (Vec<u8>, Vec<u8>, f64) {
    let n = trellis.ancestor_len();
    let m = trellis.descendant_len();
    let unit = trellis.costs().unit;

    let terminal = [
        trellis.score(DpState::Match, n, m) + trellis.costs().no_gap,
        trellis.score(DpState::Insertion, n, m) + trellis.costs().gap_stop,
        trellis.score(DpState::Deletion, n, m),
    ];
    let (choice, mut weight) = draw_categorical(rng, &terminal);
    let mut state = STATE_ORDER[choice];

    let mut aligned_anc = Vec::with_capacity(n + m);
    let mut aligned_desc = Vec::with_capacity(n + m);
    let mut i = n;
    let mut j = m;

    while i > 0 || j > 0 {
        let candidates = trellis.candidates(state, i, j);
        match state {
            DpState::Match => {
                aligned_anc.push(ancestor[i - 1]);
                aligned_desc.push(descendant[j - 1]);
                i -= 1;
                j -= 1;
            }
            DpState::Insertion => {
                for step in 0..unit {
                    aligned_anc.push(b'-');
                    aligned_desc.push(descendant[j - 1 - step]);
                }
                j -= unit;
            }
            DpState::Deletion => {
                for step in 0..unit {
                    aligned_anc.push(ancestor[i - 1 - step]);
                    aligned_desc.push(b'-');
                }
                i -= unit;
            }
        }
        if i == 0 && j == 0 {
            // the origin is the certain match state; no draw left to make
            break;
        }
        let (choice, log_p) = draw_categorical(rng, &candidates);
        state = STATE_ORDER[choice];
        weight += log_p;
    }

    aligned_anc.reverse();
    aligned_desc.reverse();
    (aligned_anc, aligned_desc, weight)
}

/// Draw an index from a categorical distribution given in log space,
/// returning the index and the log-probability of the choice.
fn draw_categorical(rng: &mut Xorshift64, log_weights: &[f64; 3]) -> (usize, f64) {
    let total = log_sum_exp_slice(log_weights);
    let u = rng.next_f64();
    let mut acc = 0.0;
    let mut fallback = (0usize, f64::NEG_INFINITY);
    for (idx, &lw) in log_weights.iter().enumerate() {
        if lw == f64::NEG_INFINITY {
            continue;
        }
        let p = (lw - total).exp();
        acc += p;
        fallback = (idx, p.ln());
        if u < acc {
            return (idx, p.ln());
        }
    }
    // rounding can leave acc fractionally below u; take the last valid choice
    fallback
}
