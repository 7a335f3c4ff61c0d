use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, span, Level};

use crate::assignment::assign_vehicles;
use crate::config::constant::{ACO_DEPOSIT, ACO_EVAPORATION, ACO_INITIAL_PHEROMONE};
use crate::construction::random_greedy;
use crate::domain::{ProblemInstance, Solution};
use crate::evaluation::find_fitness;
use crate::solver::SearchStats;
use crate::utils::scaled;

/// Pheromone per ordered location pair.
#[derive(Debug, Clone)]
pub struct PheromoneTrail {
    size: usize,
    levels: Vec<f64>,
}

impl PheromoneTrail {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            levels: vec![ACO_INITIAL_PHEROMONE; size * size],
        }
    }

    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.levels[from * self.size + to]
    }

    pub fn evaporate(&mut self) {
        for level in &mut self.levels {
            *level *= 1.0 - ACO_EVAPORATION;
        }
    }

    /// Adds `ACO_DEPOSIT / cost` on every edge the solution drives.
    pub fn deposit(&mut self, solution: &Solution) {
        let cost = solution.total_distance();
        if cost <= 0.0 {
            return;
        }
        let amount = ACO_DEPOSIT / cost;
        for route in &solution.routes {
            for edge in route.sequence().windows(2) {
                self.levels[edge[0] * self.size + edge[1]] += amount;
            }
        }
    }

    pub fn strongest(&self) -> f64 {
        self.levels.iter().copied().fold(0.0, f64::max)
    }
}

/// Colony of capacity-greedy ants.
///
/// Ants build their solutions with [`random_greedy`]; the trail is evaporated
/// and reinforced every iteration but does not yet bias stop selection, so
/// this is a randomized multi-start search with a pheromone record rather
/// than classical ACO. Each ant's whole solution (every route) competes for
/// the incumbent.
pub fn ant_colony(warm_start: &Solution, pi: &ProblemInstance, rng: &mut ChaCha8Rng) -> (Solution, SearchStats) {
    let n = pi.customer_count();
    let ants = scaled(n, 1, 5, 20);
    let iterations = scaled(n, 2, 10, 50);
    let mut trail = PheromoneTrail::new(pi.locations.len());
    let mut best_so_far = warm_start.clone();
    let mut stats = SearchStats::default();

    let loop_span = span!(Level::DEBUG, "ant_colony", ants, iterations);
    let _guard = loop_span.enter();

    for iteration in 1..=iterations {
        let colony: Vec<Solution> = (0..ants)
            .map(|_| assign_vehicles(random_greedy(pi, rng), pi))
            .collect();

        trail.evaporate();
        for ant in &colony {
            trail.deposit(ant);
            if find_fitness(ant).beats(&find_fitness(&best_so_far)) {
                best_so_far = ant.clone();
                stats.accepted_moves += 1;
                stats.record_best(iteration, best_so_far.total_distance());
            }
        }
        stats.iterations = iteration;
        debug!("Iteration {}: strongest trail {:.4}", iteration, trail.strongest());
    }

    info!(
        "Ant colony: {} iterations x {} ants, best {:.3} km",
        iterations,
        ants,
        best_so_far.total_distance()
    );
    (best_so_far, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Location, Route, Vehicle};
    use rand::SeedableRng;

    fn instance() -> ProblemInstance {
        let depot = Location::depot("d", 0.0, 0.0);
        let locations = vec![
            depot.clone(),
            Location::new("a", 0.0, 1.0, 1),
            Location::new("b", 1.0, 0.0, 1),
        ];
        ProblemInstance::new(&[Vehicle::new("v", 5, 1)], &locations, &depot).unwrap()
    }

    #[test]
    fn trail_evaporates_then_reinforces_driven_edges() {
        let pi = instance();
        let solution = Solution::new(vec![Route::new(&[1, 2], &pi)]);
        let mut trail = PheromoneTrail::new(3);

        trail.evaporate();
        assert!((trail.get(0, 1) - 0.9).abs() < 1e-12);

        trail.deposit(&solution);
        let expected = 0.9 + ACO_DEPOSIT / solution.total_distance();
        assert!((trail.get(0, 1) - expected).abs() < 1e-12);
        assert!((trail.get(1, 0) - 0.9).abs() < 1e-12);
    }

    #[test]
    fn keeps_warm_start_when_ants_do_no_better() {
        let pi = instance();
        let start = Solution::new(vec![Route::new(&[1, 2], &pi)]);

        let (best, stats) = ant_colony(&start, &pi, &mut ChaCha8Rng::seed_from_u64(1));

        assert!(best.total_distance() <= start.total_distance() + 1e-9);
        assert_eq!(stats.iterations, 10);
    }
}
