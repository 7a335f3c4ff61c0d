use super::is_improvement;
use crate::distance::DistanceMatrix;

const MAX_SEGMENT: usize = 3;

/// Relocates segments of one to three stops, taking the first improving
/// relocation each round, until none improves.
pub fn or_opt(seq: &mut Vec<usize>, dm: &DistanceMatrix) -> bool {
    let mut changed = false;
    while let Some(better) = first_relocation(seq, dm) {
        *seq = better;
        changed = true;
    }
    changed
}

fn first_relocation(seq: &[usize], dm: &DistanceMatrix) -> Option<Vec<usize>> {
    let n = seq.len();
    let current = dm.path_distance(seq);
    let mut candidate = Vec::with_capacity(n);

    for len in 1..=MAX_SEGMENT {
        // At least one other interior stop must remain to move around.
        if n < len + 3 {
            break;
        }
        for start in 1..=(n - 1 - len) {
            let segment = &seq[start..start + len];
            let rest: Vec<usize> = seq[..start].iter().chain(&seq[start + len..]).copied().collect();

            for pos in 1..rest.len() {
                if pos == start {
                    continue;
                }
                candidate.clear();
                candidate.extend_from_slice(&rest[..pos]);
                candidate.extend_from_slice(segment);
                candidate.extend_from_slice(&rest[pos..]);

                if is_improvement(dm.path_distance(&candidate), current) {
                    return Some(candidate);
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Location;

    fn line() -> DistanceMatrix {
        DistanceMatrix::build(&[
            Location::depot("d", 0.0, 0.0),
            Location::new("a", 0.0, 1.0, 1),
            Location::new("b", 0.0, 2.0, 1),
            Location::new("c", 0.0, 3.0, 1),
        ])
    }

    #[test]
    fn relocates_single_stop() {
        let dm = line();
        let mut seq = vec![0, 2, 3, 1, 0];
        let before = dm.path_distance(&seq);

        assert!(or_opt(&mut seq, &dm));
        assert!(dm.path_distance(&seq) < before);
        assert_eq!((seq[0], seq[4]), (0, 0));
        assert_eq!(seq.len(), 5);
    }

    #[test]
    fn no_move_on_optimal_tour() {
        let dm = line();
        let mut seq = vec![0, 1, 2, 3, 0];
        assert!(!or_opt(&mut seq, &dm));
    }
}
