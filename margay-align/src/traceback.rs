//! Best-path traceback over a populated trellis.

use crate::trellis::{DpState, Trellis};

/// Walk the best path from the terminal cell back to the origin, emitting
/// one aligned pair of characters (or a gap unit) per step.
///
/// The walk starts in whichever of the match and deletion states scores
/// higher after terminal adjustment — a match path still pays the
/// no-further-gap term, a deletion path ends as-is. Returns the gapped
/// ancestor, the gapped descendant, and the total path log-weight.
pub fn traceback<T: Trellis>(trellis: &T, ancestor: &[u8], descendant: &[u8]) -> (Vec<u8>, Vec<u8>, f64) {
    let n = trellis.ancestor_len();
    let m = trellis.descendant_len();
    let unit = trellis.costs().unit;

    let final_match = trellis.score(DpState::Match, n, m) + trellis.costs().no_gap;
    let final_del = trellis.score(DpState::Deletion, n, m);
    let (weight, mut state) = if final_match >= final_del {
        (final_match, DpState::Match)
    } else {
        (final_del, DpState::Deletion)
    };

    let mut aligned_anc = Vec::with_capacity(n + m);
    let mut aligned_desc = Vec::with_capacity(n + m);
    let mut i = n;
    let mut j = m;

    while i > 0 || j > 0 {
        let prev = trellis.predecessor(state, i, j);
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
        state = prev;
    }

    aligned_anc.reverse();
    aligned_desc.reverse();
    (aligned_anc, aligned_desc, weight)
}
