use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::domain::{ProblemInstance, Route, Solution};

/// `n * factor`, clamped into `[lo, hi]`. Every iteration budget in the
/// solvers is sized this way.
pub fn scaled(n: usize, factor: usize, lo: usize, hi: usize) -> usize {
    n.saturating_mul(factor).clamp(lo, hi)
}

/// Full depot-to-depot sequence of `route` with visits `i` and `j` swapped.
pub fn swapped_sequence(route: &Route, i: usize, j: usize) -> Vec<usize> {
    let mut seq = route.sequence();
    seq.swap(i + 1, j + 1);
    seq
}

/// Indices of routes with at least two visits, the only ones a swap can change.
pub fn swappable_routes(solution: &Solution) -> Vec<usize> {
    solution
        .routes
        .iter()
        .enumerate()
        .filter(|(_, r)| r.visit_count() >= 2)
        .map(|(ind, _)| ind)
        .collect()
}

/// Two distinct visit positions in `0..len`, `len >= 2`.
pub fn random_pair(rng: &mut ChaCha8Rng, len: usize) -> (usize, usize) {
    let i = rng.gen_range(0..len);
    let mut j = rng.gen_range(0..len - 1);
    if j >= i {
        j += 1;
    }
    (i, j)
}

/// Swaps two visits of `solution.routes[route]` in place.
pub fn apply_swap(solution: &mut Solution, route: usize, i: usize, j: usize, pi: &ProblemInstance) {
    let seq = swapped_sequence(&solution.routes[route], i, j);
    solution.routes[route].set_sequence(&seq, pi);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn scaled_clamps_both_ends() {
        assert_eq!(scaled(2, 3, 20, 100), 20);
        assert_eq!(scaled(10, 3, 20, 100), 30);
        assert_eq!(scaled(50, 3, 20, 100), 100);
    }

    #[test]
    fn random_pair_is_distinct() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..200 {
            let (i, j) = random_pair(&mut rng, 3);
            assert_ne!(i, j);
            assert!(i < 3 && j < 3);
        }
    }
}
