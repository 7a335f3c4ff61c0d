use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, span, Level};

use crate::assignment::assign_vehicles;
use crate::config::constant::{GA_MUTATION_RATE, GA_TOURNAMENT_SIZE};
use crate::construction::random_greedy;
use crate::domain::{ProblemInstance, Route, Solution};
use crate::evaluation::{find_fitness, Fitness};
use crate::solver::SearchStats;
use crate::utils::{apply_swap, random_pair, scaled, swappable_routes};

struct Individual {
    solution: Solution,
    fitness: Fitness,
}

impl Individual {
    fn new(solution: Solution) -> Self {
        let fitness = find_fitness(&solution);
        Self { solution, fitness }
    }
}

/// Elitist generational GA. The warm start seeds the population next to
/// random-greedy individuals; offspring inherit whole routes and are repaired
/// back into a valid, vehicle-assigned solution.
pub fn genetic(warm_start: &Solution, pi: &ProblemInstance, rng: &mut ChaCha8Rng) -> (Solution, SearchStats) {
    let n = pi.customer_count();
    let population_size = scaled(n, 2, 10, 30);
    let generations = scaled(n, 2, 15, 50);
    let mut stats = SearchStats::default();

    let loop_span = span!(Level::DEBUG, "genetic", population_size, generations);
    let _guard = loop_span.enter();

    let mut population = vec![Individual::new(warm_start.clone())];
    while population.len() < population_size {
        let draft = random_greedy(pi, rng);
        population.push(Individual::new(assign_vehicles(draft, pi)));
    }

    let mut best_so_far = fittest(&population).solution.clone();

    for generation in 1..=generations {
        let elite = fittest(&population);
        let mut next = vec![Individual::new(elite.solution.clone())];

        while next.len() < population_size {
            let mother = tournament(&population, rng);
            let father = tournament(&population, rng);
            let mut child = repair(crossover(&mother.solution, &father.solution, rng), pi);
            if rng.gen::<f64>() < GA_MUTATION_RATE {
                mutate(&mut child, pi, rng);
            }
            next.push(Individual::new(child));
        }

        population = next;
        stats.iterations = generation;

        let leader = fittest(&population);
        if leader.fitness.beats(&find_fitness(&best_so_far)) {
            best_so_far = leader.solution.clone();
            stats.accepted_moves += 1;
            stats.record_best(generation, best_so_far.total_distance());
        }
    }

    info!(
        "Genetic: {} generations of {}, best {:.3} km",
        generations,
        population_size,
        best_so_far.total_distance()
    );

    if find_fitness(&best_so_far).beats(&find_fitness(warm_start)) {
        (best_so_far, stats)
    } else {
        (warm_start.clone(), stats)
    }
}

fn fittest(population: &[Individual]) -> &Individual {
    // First of equals wins, so the elite stays put across generations.
    population
        .iter()
        .reduce(|best, ind| if ind.fitness.beats(&best.fitness) { ind } else { best })
        .unwrap_or(&population[0])
}

fn tournament<'a>(population: &'a [Individual], rng: &mut ChaCha8Rng) -> &'a Individual {
    let mut winner = &population[rng.gen_range(0..population.len())];
    for _ in 1..GA_TOURNAMENT_SIZE {
        let challenger = &population[rng.gen_range(0..population.len())];
        if challenger.fitness.beats(&winner.fitness) {
            winner = challenger;
        }
    }
    winner
}

/// Route `k` of the child comes from one parent chosen uniformly, or from the
/// other parent if the chosen one has fewer routes.
fn crossover(mother: &Solution, father: &Solution, rng: &mut ChaCha8Rng) -> Vec<Vec<usize>> {
    let count = mother.routes.len().max(father.routes.len());
    (0..count)
        .filter_map(|k| {
            let (first, second) = if rng.gen::<bool>() {
                (mother, father)
            } else {
                (father, mother)
            };
            first.routes.get(k).or_else(|| second.routes.get(k)).map(Route::visits)
        })
        .collect()
}

/// Drops repeated visits, reinserts missing customers at their cheapest
/// capacity-feasible position and reassigns vehicles.
pub(crate) fn repair(routes: Vec<Vec<usize>>, pi: &ProblemInstance) -> Solution {
    let mut seen = vec![false; pi.locations.len()];
    seen[pi.depot] = true;

    let mut kept: Vec<Vec<usize>> = vec![];
    for visits in routes {
        let mut unique = vec![];
        for c in visits {
            if !seen[c] {
                seen[c] = true;
                unique.push(c);
            }
        }
        if !unique.is_empty() {
            kept.push(unique);
        }
    }

    let missing: Vec<usize> = pi.customers().into_iter().filter(|&c| !seen[c]).collect();
    if !missing.is_empty() {
        debug!("Repair: reinserting {} customers", missing.len());
    }
    for c in missing {
        insert_cheapest(&mut kept, c, pi);
    }

    let draft = Solution::new(kept.iter().map(|visits| Route::new(visits, pi)).collect());
    assign_vehicles(draft, pi)
}

fn insert_cheapest(routes: &mut Vec<Vec<usize>>, c: usize, pi: &ProblemInstance) {
    let demand = pi.demand(c);
    let max_capacity = pi.max_capacity();
    let mut best: Option<(f64, usize, usize)> = None;

    for (r, visits) in routes.iter().enumerate() {
        let load: u64 = visits.iter().map(|&v| pi.demand(v)).sum();
        if load + demand > max_capacity {
            continue;
        }
        for pos in 0..=visits.len() {
            let prev = if pos == 0 { pi.depot } else { visits[pos - 1] };
            let next = visits.get(pos).copied().unwrap_or(pi.depot);
            let cost = pi.dist(prev, c) + pi.dist(c, next) - pi.dist(prev, next);
            if best.map_or(true, |(b, _, _)| cost < b) {
                best = Some((cost, r, pos));
            }
        }
    }

    match best {
        Some((_, r, pos)) => routes[r].insert(pos, c),
        None => routes.push(vec![c]),
    }
}

fn mutate(solution: &mut Solution, pi: &ProblemInstance, rng: &mut ChaCha8Rng) {
    let candidates = swappable_routes(solution);
    if candidates.is_empty() {
        return;
    }
    let r = candidates[rng.gen_range(0..candidates.len())];
    let (i, j) = random_pair(rng, solution.routes[r].visit_count());
    apply_swap(solution, r, i, j, pi);
}
