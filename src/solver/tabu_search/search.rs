use tracing::{debug, info, span, Level};

use super::neighbourhood::find_neighbours;
use super::tabu::{tenure, TabuList};
use crate::config::constant::TABU_NEIGHBOUR_CAP;
use crate::domain::{ProblemInstance, Solution};
use crate::evaluation::find_fitness;
use crate::solver::SearchStats;
use crate::utils::{apply_swap, scaled};

struct SearchState {
    current: Solution,
    best_so_far: Solution,
    best_so_far_iteration: usize,
    tabu_list: TabuList,
    stats: SearchStats,
}

impl SearchState {
    fn new(initial_solution: Solution, tenure: usize) -> Self {
        let mut tabu_list = TabuList::new(tenure);
        tabu_list.insert(initial_solution.signature(), 0);
        Self {
            current: initial_solution.clone(),
            best_so_far: initial_solution,
            best_so_far_iteration: 0,
            tabu_list,
            stats: SearchStats::default(),
        }
    }
}

/// Steepest-descent over within-route swaps with a solution-signature tabu
/// list. Moves to the best admissible neighbour even if it is worse and keeps
/// the best solution seen.
pub fn tabu_search(warm_start: &Solution, pi: &ProblemInstance) -> (Solution, SearchStats) {
    let n = pi.customer_count();
    let max_iterations = scaled(n, 3, 20, 100);
    let mut state = SearchState::new(warm_start.clone(), tenure(n));

    let loop_span = span!(Level::DEBUG, "tabu_search", max_iterations);
    let _guard = loop_span.enter();

    for iteration in 1..=max_iterations {
        if !perform_iteration(iteration, &mut state, pi) {
            debug!("No admissible neighbour at iteration {}", iteration);
            break;
        }
    }

    info!(
        "Tabu search: {} iterations, best {:.3} km found at iteration {}",
        state.stats.iterations,
        state.best_so_far.total_distance(),
        state.best_so_far_iteration
    );

    if find_fitness(&state.best_so_far).beats(&find_fitness(warm_start)) {
        (state.best_so_far, state.stats)
    } else {
        (warm_start.clone(), state.stats)
    }
}

fn perform_iteration(iteration: usize, state: &mut SearchState, pi: &ProblemInstance) -> bool {
    let route_count = state.current.routes.len().max(1);
    let tabu_list = &state.tabu_list;
    let candidates = find_neighbours(
        &state.current,
        pi,
        iteration % route_count,
        TABU_NEIGHBOUR_CAP,
        |sig| !tabu_list.is_tabu(sig, iteration),
    );

    let Some(chosen) = candidates.into_iter().next() else {
        return false;
    };

    apply_swap(&mut state.current, chosen.swap.route, chosen.swap.i, chosen.swap.j, pi);
    state.tabu_list.insert(chosen.signature, iteration);
    state.stats.iterations = iteration;
    state.stats.accepted_moves += 1;

    if find_fitness(&state.current).beats(&find_fitness(&state.best_so_far)) {
        state.best_so_far = state.current.clone();
        state.best_so_far_iteration = iteration;
        state.stats.record_best(iteration, state.best_so_far.total_distance());
    }
    true
}
