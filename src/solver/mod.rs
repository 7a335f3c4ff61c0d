//! Metaheuristics over whole solutions. Each starts from the warm start
//! (enhanced savings, vehicles assigned, routes polished by local search) and
//! never hands back anything worse than it.

pub mod ant_colony;
pub mod external;
pub mod genetic;
pub mod simulated_annealing;
pub mod tabu_search;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::assignment::assign_vehicles;
use crate::config::SavingsWeights;
use crate::construction::{EnhancedClarkeWright, RouteConstructor};
use crate::domain::{ProblemInstance, Solution};
use crate::local_search::improve_solution;

pub use ant_colony::ant_colony;
pub use external::ExternalSolver;
pub use genetic::genetic;
pub use simulated_annealing::simulated_annealing;
pub use tabu_search::tabu_search;

/// What a search did, for reproducibility checks and the best-so-far report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchStats {
    pub iterations: usize,
    pub accepted_moves: usize,
    /// `(iteration, total distance)` each time the incumbent improved.
    pub best_so_far_updates: Vec<(usize, f64)>,
}

impl SearchStats {
    pub(crate) fn record_best(&mut self, iteration: usize, distance: f64) {
        debug!("New best at iteration {}: {:.3} km", iteration, distance);
        self.best_so_far_updates.push((iteration, distance));
    }
}

/// Builds, assigns and polishes a solution with any constructor.
pub fn construct_and_improve(constructor: &dyn RouteConstructor, pi: &ProblemInstance) -> Solution {
    let draft = constructor.construct(pi);
    let mut solution = assign_vehicles(draft, pi);
    improve_solution(&mut solution, pi);
    solution
}

pub fn warm_start(pi: &ProblemInstance, weights: SavingsWeights) -> Solution {
    construct_and_improve(&EnhancedClarkeWright::new(weights), pi)
}
