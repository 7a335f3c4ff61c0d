use super::is_improvement;
use crate::distance::DistanceMatrix;

/// Reverses interior segments while that shortens the tour, until no
/// reversal helps. Returns whether anything changed.
pub fn two_opt(seq: &mut [usize], dm: &DistanceMatrix) -> bool {
    let n = seq.len();
    if n < 4 {
        return false;
    }

    let mut current = dm.path_distance(seq);
    let mut changed = false;
    let mut improved = true;
    while improved {
        improved = false;
        for i in 1..n - 2 {
            for k in (i + 1)..n - 1 {
                seq[i..=k].reverse();
                let candidate = dm.path_distance(seq);
                if is_improvement(candidate, current) {
                    current = candidate;
                    improved = true;
                    changed = true;
                } else {
                    seq[i..=k].reverse();
                }
            }
        }
    }
    changed
}
