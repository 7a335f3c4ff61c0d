use crate::domain::{ProblemInstance, Solution};
use crate::utils::swapped_sequence;

/// Swap of visits `i` and `j` inside `solution.routes[route]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapMove {
    pub route: usize,
    pub i: usize,
    pub j: usize,
}

#[derive(Debug, Clone)]
pub struct Neighbour {
    pub swap: SwapMove,
    /// Total solution distance after the swap.
    pub distance: f64,
    pub signature: Vec<Vec<usize>>,
}

/// Scores within-route swaps and returns them best first.
///
/// Routes are visited starting at `first_route` (wrapping around) so that a
/// capped enumeration does not always favour the same route. At most `cap`
/// neighbours passing `admissible` are scored.
pub fn find_neighbours(
    solution: &Solution,
    pi: &ProblemInstance,
    first_route: usize,
    cap: usize,
    admissible: impl Fn(&[Vec<usize>]) -> bool,
) -> Vec<Neighbour> {
    let route_count = solution.routes.len();
    let total = solution.total_distance();
    let mut neighbours = vec![];

    'routes: for offset in 0..route_count {
        let r = (first_route + offset) % route_count;
        let route = &solution.routes[r];
        let len = route.visit_count();

        for i in 0..len {
            for j in (i + 1)..len {
                let seq = swapped_sequence(route, i, j);
                let signature = signature_with(solution, r, &seq[1..seq.len() - 1]);
                if !admissible(&signature) {
                    continue;
                }

                let distance = total - route.distance() + pi.distance_matrix.path_distance(&seq);
                neighbours.push(Neighbour {
                    swap: SwapMove { route: r, i, j },
                    distance,
                    signature,
                });
                if neighbours.len() >= cap {
                    break 'routes;
                }
            }
        }
    }

    neighbours.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    neighbours
}

/// Signature of `solution` with route `replaced` visiting `visits` instead.
fn signature_with(solution: &Solution, replaced: usize, visits: &[usize]) -> Vec<Vec<usize>> {
    let mut sig: Vec<Vec<usize>> = solution
        .routes
        .iter()
        .enumerate()
        .map(|(ind, r)| if ind == replaced { visits.to_vec() } else { r.visits() })
        .filter(|v| !v.is_empty())
        .collect();
    sig.sort();
    sig
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Location, Route, Vehicle};

    fn instance() -> ProblemInstance {
        let depot = Location::depot("d", 0.0, 0.0);
        let locations = vec![
            depot.clone(),
            Location::new("a", 0.0, 1.0, 1),
            Location::new("b", 0.0, 2.0, 1),
            Location::new("c", 0.0, 3.0, 1),
        ];
        ProblemInstance::new(&[Vehicle::new("v", 10, 1)], &locations, &depot).unwrap()
    }

    #[test]
    fn neighbours_are_sorted_and_priced() {
        let pi = instance();
        let solution = Solution::new(vec![Route::new(&[2, 1, 3], &pi)]);

        let neighbours = find_neighbours(&solution, &pi, 0, 50, |_| true);

        assert_eq!(neighbours.len(), 3);
        assert!(neighbours.windows(2).all(|w| w[0].distance <= w[1].distance));
        let best = &neighbours[0];
        assert_eq!(best.signature, vec![vec![1, 2, 3]]);
        assert!((best.distance - pi.distance_matrix.path_distance(&[0, 1, 2, 3, 0])).abs() < 1e-9);
    }

    #[test]
    fn cap_and_admissibility_are_respected() {
        let pi = instance();
        let solution = Solution::new(vec![Route::new(&[2, 1, 3], &pi)]);

        assert_eq!(find_neighbours(&solution, &pi, 0, 2, |_| true).len(), 2);
        let forbidden = vec![vec![1, 2, 3]];
        let allowed = find_neighbours(&solution, &pi, 0, 50, |sig| sig != forbidden.as_slice());
        assert_eq!(allowed.len(), 2);
    }
}
