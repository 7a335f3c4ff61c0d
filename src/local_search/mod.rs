//! Intra-route improvement. Operators work on a full location sequence
//! (depot at both ends, never moved) and compare whole-sequence lengths via
//! [`DistanceMatrix::path_distance`].

pub mod or_opt;
pub mod three_opt;
pub mod two_opt;

use tracing::trace;

use crate::config::constant::IMPROVEMENT_EPSILON;
use crate::distance::DistanceMatrix;
use crate::domain::{ProblemInstance, Route, Solution};

pub use or_opt::or_opt;
pub use three_opt::three_opt_once;
pub use two_opt::two_opt;

/// Strictly shorter by more than the float noise floor.
pub(crate) fn is_improvement(candidate: f64, current: f64) -> bool {
    candidate + IMPROVEMENT_EPSILON < current
}

/// 2-opt to a fixed point, one bounded 3-opt move (re-polished with 2-opt),
/// then Or-opt relocation.
pub fn improve_sequence(seq: &mut Vec<usize>, dm: &DistanceMatrix) -> bool {
    let mut changed = two_opt(seq, dm);
    if three_opt_once(seq, dm) {
        two_opt(seq, dm);
        changed = true;
    }
    changed |= or_opt(seq, dm);
    changed
}

pub fn improve_route(route: &mut Route, pi: &ProblemInstance) {
    if route.visit_count() < 2 {
        return;
    }

    let before = route.distance();
    let mut seq = route.sequence();
    if improve_sequence(&mut seq, &pi.distance_matrix) {
        route.set_sequence(&seq, pi);
        trace!("Local search: {:.3} -> {:.3} km", before, route.distance());
    }
}

pub fn improve_solution(solution: &mut Solution, pi: &ProblemInstance) {
    for route in &mut solution.routes {
        improve_route(route, pi);
    }
}
