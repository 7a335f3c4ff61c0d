//! Entry point of the optimisation engine: one algorithm, or every algorithm
//! side by side with a ranking.

use std::any::Any;
use std::collections::HashSet;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::str::FromStr;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, span, warn, Level};

use crate::config::constant::RECOMPUTE_TOLERANCE;
use crate::config::SearchParams;
use crate::construction::{ClarkeWright, NearestNeighbour, Sweep};
use crate::domain::{Location, ProblemInstance, Solution, Vehicle};
use crate::error::{EngineError, EngineResult};
use crate::evaluation::{evaluate, rank, CostSummary};
use crate::setup::OptimizationRequest;
use crate::solver::{
    ant_colony, construct_and_improve, genetic, simulated_annealing, tabu_search, warm_start, ExternalSolver,
    SearchStats,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlgorithmKey {
    ClarkeWright,
    EnhancedClarkeWright,
    NearestNeighbor,
    Sweep,
    Genetic,
    TabuSearch,
    SimulatedAnnealing,
    AntColony,
    /// Passthrough to an [`ExternalSolver`], falling back to enhanced savings.
    External,
}

impl AlgorithmKey {
    /// Every algorithm the engine implements itself, in comparison order.
    pub const BUILT_IN: [AlgorithmKey; 8] = [
        AlgorithmKey::ClarkeWright,
        AlgorithmKey::EnhancedClarkeWright,
        AlgorithmKey::NearestNeighbor,
        AlgorithmKey::Sweep,
        AlgorithmKey::Genetic,
        AlgorithmKey::TabuSearch,
        AlgorithmKey::SimulatedAnnealing,
        AlgorithmKey::AntColony,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AlgorithmKey::ClarkeWright => "clarke-wright",
            AlgorithmKey::EnhancedClarkeWright => "enhanced-clarke-wright",
            AlgorithmKey::NearestNeighbor => "nearest-neighbor",
            AlgorithmKey::Sweep => "sweep",
            AlgorithmKey::Genetic => "genetic",
            AlgorithmKey::TabuSearch => "tabu-search",
            AlgorithmKey::SimulatedAnnealing => "simulated-annealing",
            AlgorithmKey::AntColony => "ant-colony",
            AlgorithmKey::External => "external",
        }
    }

    /// Whether the algorithm draws from the seeded RNG.
    pub fn is_randomized(&self) -> bool {
        matches!(
            self,
            AlgorithmKey::Genetic | AlgorithmKey::SimulatedAnnealing | AlgorithmKey::AntColony
        )
    }
}

impl fmt::Display for AlgorithmKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlgorithmKey {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        AlgorithmKey::BUILT_IN
            .into_iter()
            .chain([AlgorithmKey::External])
            .find(|k| k.as_str() == key)
            .ok_or_else(|| EngineError::UnknownAlgorithm(s.to_string()))
    }
}

/// One algorithm's output. Failed runs in comparison mode carry `error`, an
/// empty solution and a zeroed summary.
#[derive(Debug, Clone, Serialize)]
pub struct OptimizationResult {
    pub algorithm: AlgorithmKey,
    pub solution: Solution,
    pub summary: CostSummary,
    pub stats: SearchStats,
    pub error: Option<String>,
}

impl OptimizationResult {
    fn failed(algorithm: AlgorithmKey, error: &EngineError) -> Self {
        Self {
            algorithm,
            solution: Solution::default(),
            summary: CostSummary::default(),
            stats: SearchStats::default(),
            error: Some(error.to_string()),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    /// In the order the algorithms were run.
    pub results: Vec<OptimizationResult>,
    /// Indices into `results`, best first; failed runs are absent.
    pub ranking: Vec<usize>,
}

impl ComparisonReport {
    pub fn selected(&self) -> Option<&OptimizationResult> {
        self.ranking.first().map(|&ind| &self.results[ind])
    }
}

#[derive(Debug, Clone, Serialize)]
pub enum OptimizationOutcome {
    Single(OptimizationResult),
    Comparison(ComparisonReport),
}

impl OptimizationOutcome {
    /// The single result, or the comparison winner.
    pub fn best(&self) -> Option<&OptimizationResult> {
        match self {
            OptimizationOutcome::Single(result) => Some(result),
            OptimizationOutcome::Comparison(report) => report.selected(),
        }
    }
}

/// Runs `algorithm`, or with `compare_all` every built-in algorithm (plus the
/// external one when given), on one problem.
///
/// Input errors are returned before anything runs. A failing algorithm is an
/// error in single mode and a failed entry in comparison mode.
pub fn optimize(
    vehicles: &[Vehicle],
    locations: &[Location],
    depot: &Location,
    algorithm: AlgorithmKey,
    compare_all: bool,
    params: &SearchParams,
    external: Option<&dyn ExternalSolver>,
) -> EngineResult<OptimizationOutcome> {
    let pi = ProblemInstance::new(vehicles, locations, depot)?;
    info!(
        "Optimizing {} locations with {} vehicles ({} slots)",
        pi.customer_count(),
        pi.vehicles.len(),
        pi.total_slots()
    );

    if !compare_all {
        return run_algorithm(algorithm, &pi, params, external).map(OptimizationOutcome::Single);
    }

    let mut keys = AlgorithmKey::BUILT_IN.to_vec();
    if external.is_some() {
        keys.push(AlgorithmKey::External);
    }

    let report = compare(&keys, |key| run_algorithm(key, &pi, params, external));
    Ok(OptimizationOutcome::Comparison(report))
}

/// Optimizes independent requests on the rayon pool, one request per worker.
/// Each request still runs its algorithms one after another; results come
/// back in request order.
pub fn optimize_batch(
    requests: &[OptimizationRequest],
    algorithm: AlgorithmKey,
    compare_all: bool,
    params: &SearchParams,
    external: Option<&dyn ExternalSolver>,
) -> Vec<EngineResult<OptimizationOutcome>> {
    requests
        .par_iter()
        .map(|req| {
            optimize(
                &req.vehicles,
                &req.locations,
                &req.depot,
                algorithm,
                compare_all,
                params,
                external,
            )
        })
        .collect()
}

/// Runs `keys` in order, turning failures into failed entries, and ranks the rest.
fn compare(
    keys: &[AlgorithmKey],
    run: impl Fn(AlgorithmKey) -> EngineResult<OptimizationResult>,
) -> ComparisonReport {
    let results: Vec<OptimizationResult> = keys
        .iter()
        .map(|&key| {
            run(key).unwrap_or_else(|err| {
                warn!("{} failed: {}", key, err);
                OptimizationResult::failed(key, &err)
            })
        })
        .collect();

    let ranking = rank(&results, |r| r.succeeded().then_some(&r.summary));
    if let Some(&winner) = ranking.first() {
        info!(
            "Selected {} ({:.1}% coverage, {:.3} km)",
            results[winner].algorithm, results[winner].summary.coverage_percentage, results[winner].summary.total_distance
        );
    } else {
        warn!("Every algorithm failed");
    }

    ComparisonReport { results, ranking }
}

fn run_algorithm(
    key: AlgorithmKey,
    pi: &ProblemInstance,
    params: &SearchParams,
    external: Option<&dyn ExternalSolver>,
) -> EngineResult<OptimizationResult> {
    let algorithm_span = span!(Level::INFO, "algorithm", key = key.as_str());
    let _guard = algorithm_span.enter();

    run_guarded(key, pi, || solve(key, pi, params, external))
}

/// Runs `body` with panics caught, then verifies and evaluates its solution.
fn run_guarded(
    key: AlgorithmKey,
    pi: &ProblemInstance,
    body: impl FnOnce() -> (Solution, SearchStats),
) -> EngineResult<OptimizationResult> {
    let (solution, stats) = panic::catch_unwind(AssertUnwindSafe(body)).map_err(|payload| EngineError::AlgorithmFailed {
        algorithm: key.to_string(),
        reason: panic_message(payload.as_ref()),
    })?;

    verify_solution(&solution, pi).map_err(|reason| EngineError::AlgorithmFailed {
        algorithm: key.to_string(),
        reason,
    })?;

    let summary = evaluate(&solution, pi);
    info!(
        "{}: {} routes, {:.3} km, {} min, {:.1}% coverage, {:.1}% utilization",
        key,
        solution.routes.len(),
        summary.total_distance,
        summary.total_duration,
        summary.coverage_percentage,
        summary.vehicle_utilization
    );

    Ok(OptimizationResult {
        algorithm: key,
        solution,
        summary,
        stats,
        error: None,
    })
}

fn solve(
    key: AlgorithmKey,
    pi: &ProblemInstance,
    params: &SearchParams,
    external: Option<&dyn ExternalSolver>,
) -> (Solution, SearchStats) {
    let mut rng = ChaCha8Rng::seed_from_u64(params.seed);
    let weights = params.savings_weights;

    match key {
        AlgorithmKey::ClarkeWright => (construct_and_improve(&ClarkeWright, pi), SearchStats::default()),
        AlgorithmKey::EnhancedClarkeWright => (warm_start(pi, weights), SearchStats::default()),
        AlgorithmKey::NearestNeighbor => (construct_and_improve(&NearestNeighbour, pi), SearchStats::default()),
        AlgorithmKey::Sweep => (construct_and_improve(&Sweep, pi), SearchStats::default()),
        AlgorithmKey::TabuSearch => tabu_search(&warm_start(pi, weights), pi),
        AlgorithmKey::SimulatedAnnealing => simulated_annealing(&warm_start(pi, weights), pi, &mut rng),
        AlgorithmKey::Genetic => genetic(&warm_start(pi, weights), pi, &mut rng),
        AlgorithmKey::AntColony => ant_colony(&warm_start(pi, weights), pi, &mut rng),
        AlgorithmKey::External => (solve_external(pi, params, external), SearchStats::default()),
    }
}

fn solve_external(pi: &ProblemInstance, params: &SearchParams, external: Option<&dyn ExternalSolver>) -> Solution {
    let Some(solver) = external else {
        warn!("No external solver configured, falling back to enhanced-clarke-wright");
        return warm_start(pi, params.savings_weights);
    };

    let attempt = panic::catch_unwind(AssertUnwindSafe(|| solver.solve(pi))).unwrap_or_else(|payload| {
        Err(EngineError::ExternalSolver(format!(
            "panicked: {}",
            panic_message(payload.as_ref())
        )))
    });

    match attempt {
        Ok(solution) => match verify_solution(&solution, pi) {
            Ok(()) => solution,
            Err(reason) => {
                warn!(
                    "External solver {} returned an invalid solution ({}), falling back to enhanced-clarke-wright",
                    solver.name(),
                    reason
                );
                warm_start(pi, params.savings_weights)
            }
        },
        Err(err) => {
            warn!(
                "External solver {} failed ({}), falling back to enhanced-clarke-wright",
                solver.name(),
                err
            );
            warm_start(pi, params.savings_weights)
        }
    }
}

/// Structural checks every returned solution must pass.
pub fn verify_solution(solution: &Solution, pi: &ProblemInstance) -> Result<(), String> {
    let mut seen = HashSet::new();

    for (r, route) in solution.routes.iter().enumerate() {
        let stops = route.stops();
        if stops.len() < 2 {
            return Err(format!("route {} has {} stops", r, stops.len()));
        }
        if stops[0].location != pi.depot || stops[stops.len() - 1].location != pi.depot {
            return Err(format!("route {} does not start and end at the depot", r));
        }
        if let Some(stop) = stops.iter().enumerate().find(|(ind, s)| s.order != *ind) {
            return Err(format!("route {} has stop order {} at position {}", r, stop.1.order, stop.0));
        }
        for &loc in &route.visits() {
            if loc == pi.depot {
                return Err(format!("route {} visits the depot mid-route", r));
            }
            if !seen.insert(loc) {
                return Err(format!("location {} is visited twice", pi.locations[loc].id));
            }
        }

        let recomputed = pi.distance_matrix.path_distance(&route.sequence());
        if (recomputed - route.distance()).abs() > RECOMPUTE_TOLERANCE {
            return Err(format!(
                "route {} caches {:.6} km but its stops measure {:.6} km",
                r,
                route.distance(),
                recomputed
            ));
        }
        if let Some(vehicle) = route.vehicle() {
            if route.total_capacity() > vehicle.capacity {
                return Err(format!(
                    "route {} carries {} on vehicle {} of capacity {}",
                    r,
                    route.total_capacity(),
                    vehicle.id,
                    vehicle.capacity
                ));
            }
        }
    }
    Ok(())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Route;

    struct Broken;

    impl ExternalSolver for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn solve(&self, _pi: &ProblemInstance) -> EngineResult<Solution> {
            Err(EngineError::ExternalSolver("connection refused".into()))
        }
    }

    struct Panicking;

    impl ExternalSolver for Panicking {
        fn name(&self) -> &str {
            "panicking"
        }

        fn solve(&self, _pi: &ProblemInstance) -> EngineResult<Solution> {
            panic!("solver crashed")
        }
    }

    fn inputs() -> (Vec<Vehicle>, Vec<Location>, Location) {
        let depot = Location::depot("d", 1.30, 103.80);
        let mut locations = vec![depot.clone()];
        for ind in 0..6 {
            locations.push(Location::new(
                &format!("c{}", ind),
                1.30 + 0.01 * ind as f64,
                103.80 + 0.02 * (ind % 3) as f64,
                3,
            ));
        }
        (vec![Vehicle::new("v", 10, 2)], locations, depot)
    }

    #[test]
    fn algorithm_keys_parse_and_print() {
        for key in AlgorithmKey::BUILT_IN {
            assert_eq!(key.as_str().parse::<AlgorithmKey>().unwrap(), key);
        }
        assert_eq!("Tabu-Search".parse::<AlgorithmKey>().unwrap(), AlgorithmKey::TabuSearch);
        assert!(matches!(
            "dijkstra".parse::<AlgorithmKey>(),
            Err(EngineError::UnknownAlgorithm(_))
        ));
        assert_eq!(serde_json::to_string(&AlgorithmKey::AntColony).unwrap(), "\"ant-colony\"");
    }

    #[test]
    fn input_errors_are_returned_before_running() {
        let (_, locations, depot) = inputs();
        let result = optimize(
            &[],
            &locations,
            &depot,
            AlgorithmKey::Sweep,
            false,
            &SearchParams::default(),
            None,
        );
        assert!(matches!(result, Err(EngineError::EmptyFleet)));
    }

    #[test]
    fn external_failure_falls_back() {
        let (vehicles, locations, depot) = inputs();
        let params = SearchParams::default();

        let outcome = optimize(&vehicles, &locations, &depot, AlgorithmKey::External, false, &params, Some(&Broken)).unwrap();
        let fallback = optimize(
            &vehicles,
            &locations,
            &depot,
            AlgorithmKey::EnhancedClarkeWright,
            false,
            &params,
            None,
        )
        .unwrap();

        let (a, b) = (outcome.best().unwrap(), fallback.best().unwrap());
        assert_eq!(a.algorithm, AlgorithmKey::External);
        assert_eq!(a.solution.signature(), b.solution.signature());
    }

    #[test]
    fn panicking_external_solver_falls_back() {
        let (vehicles, locations, depot) = inputs();
        let params = SearchParams::default();

        let outcome = optimize(&vehicles, &locations, &depot, AlgorithmKey::External, false, &params, Some(&Panicking)).unwrap();
        let fallback = optimize(
            &vehicles,
            &locations,
            &depot,
            AlgorithmKey::EnhancedClarkeWright,
            false,
            &params,
            None,
        )
        .unwrap();

        let (a, b) = (outcome.best().unwrap(), fallback.best().unwrap());
        assert!(a.succeeded());
        assert_eq!(a.solution.signature(), b.solution.signature());
    }

    #[test]
    fn comparison_includes_external_when_given() {
        let (vehicles, locations, depot) = inputs();

        let outcome = optimize(
            &vehicles,
            &locations,
            &depot,
            AlgorithmKey::Sweep,
            true,
            &SearchParams::default(),
            Some(&Panicking),
        )
        .unwrap();

        let OptimizationOutcome::Comparison(report) = outcome else {
            panic!("expected a comparison report");
        };
        assert_eq!(report.results.len(), 9);
        assert_eq!(report.results[8].algorithm, AlgorithmKey::External);
        assert!(report.results.iter().all(|r| r.succeeded()));
        assert_eq!(report.ranking.len(), 9);
    }

    #[test]
    fn panicking_algorithm_is_isolated_in_comparison() {
        let (vehicles, locations, depot) = inputs();
        let pi = ProblemInstance::new(&vehicles, &locations, &depot).unwrap();
        let params = SearchParams::default();
        let keys = [AlgorithmKey::Sweep, AlgorithmKey::Genetic, AlgorithmKey::ClarkeWright];

        let report = compare(&keys, |key| {
            if key == AlgorithmKey::Genetic {
                run_guarded(key, &pi, || panic!("population collapsed"))
            } else {
                run_algorithm(key, &pi, &params, None)
            }
        });

        assert_eq!(report.results.len(), 3);
        let failed = &report.results[1];
        assert!(!failed.succeeded());
        assert!(failed.solution.routes.is_empty());
        assert!(failed.error.as_deref().unwrap_or_default().contains("population collapsed"));
        assert_eq!(report.ranking.len(), 2);
        assert!(!report.ranking.contains(&1));
    }

    #[test]
    fn batch_matches_individual_requests() {
        let (vehicles, locations, depot) = inputs();
        let params = SearchParams::default();
        let requests = vec![
            OptimizationRequest {
                vehicles: vehicles.clone(),
                locations: locations.clone(),
                depot: depot.clone(),
            },
            OptimizationRequest {
                vehicles: vec![],
                locations: locations.clone(),
                depot: depot.clone(),
            },
            OptimizationRequest {
                vehicles: vec![Vehicle::new("small", 6, 4)],
                locations,
                depot,
            },
        ];

        let batch = optimize_batch(&requests, AlgorithmKey::SimulatedAnnealing, false, &params, None);

        assert_eq!(batch.len(), 3);
        assert!(matches!(batch[1], Err(EngineError::EmptyFleet)));
        for ind in [0, 2] {
            let req = &requests[ind];
            let single = optimize(
                &req.vehicles,
                &req.locations,
                &req.depot,
                AlgorithmKey::SimulatedAnnealing,
                false,
                &params,
                None,
            )
            .unwrap();
            let from_batch = batch[ind].as_ref().unwrap();
            assert_eq!(
                from_batch.best().unwrap().solution.signature(),
                single.best().unwrap().solution.signature()
            );
        }
    }

    #[test]
    fn verify_rejects_duplicate_visits() {
        let (vehicles, locations, depot) = inputs();
        let pi = ProblemInstance::new(&vehicles, &locations, &depot).unwrap();
        let solution = Solution::new(vec![Route::new(&[1, 2], &pi), Route::new(&[2], &pi)]);

        assert!(verify_solution(&solution, &pi).is_err());
        assert!(verify_solution(&Solution::new(vec![Route::new(&[1, 2], &pi)]), &pi).is_ok());
    }
}
