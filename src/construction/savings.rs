use itertools::Itertools;
use tracing::debug;

use super::RouteConstructor;
use crate::config::constant::FLEET_MERGE_GUARD;
use crate::domain::{ProblemInstance, Route, Solution};

/// Score for serving `i` and `j` on one tour instead of two round trips.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Saving {
    pub i: usize,
    pub j: usize,
    pub value: f64,
}

/// `d(depot, i) + d(depot, j) - d(i, j)` for every unordered customer pair,
/// in customer order.
pub(crate) fn basic_savings(pi: &ProblemInstance) -> Vec<Saving> {
    pi.customers()
        .into_iter()
        .tuple_combinations()
        .map(|(i, j)| Saving {
            i,
            j,
            value: pi.dist(pi.depot, i) + pi.dist(pi.depot, j) - pi.dist(i, j),
        })
        .collect()
}

/// Greedy Clarke-Wright merge pass followed by the fleet-fit pass.
///
/// Savings are processed in descending order; equal scores keep their
/// encounter order. Two routes merge only when `i` closes one and `j` opens
/// the other (or the reverse) and the combined load fits the largest vehicle.
pub(crate) fn merge_by_savings(pi: &ProblemInstance, mut savings: Vec<Saving>) -> Vec<Vec<usize>> {
    savings.sort_by(|a, b| b.value.total_cmp(&a.value));

    let customers = pi.customers();
    let max_capacity = pi.max_capacity();

    let mut routes: Vec<Vec<usize>> = customers.iter().map(|&c| vec![c]).collect();
    let mut loads: Vec<u64> = customers.iter().map(|&c| pi.demand(c)).collect();
    let mut route_of = vec![usize::MAX; pi.locations.len()];
    for (r, &c) in customers.iter().enumerate() {
        route_of[c] = r;
    }

    let mut merges = 0;
    for saving in &savings {
        let (ri, rj) = (route_of[saving.i], route_of[saving.j]);
        if ri == rj {
            continue;
        }

        let i_at_end = routes[ri].last() == Some(&saving.i);
        let i_at_start = routes[ri].first() == Some(&saving.i);
        let j_at_end = routes[rj].last() == Some(&saving.j);
        let j_at_start = routes[rj].first() == Some(&saving.j);

        let (head, tail) = if i_at_end && j_at_start {
            (ri, rj)
        } else if j_at_end && i_at_start {
            (rj, ri)
        } else {
            continue;
        };

        let combined = loads[ri] + loads[rj];
        if combined > max_capacity {
            continue;
        }

        // The merged tour takes the lower slot, keeping the original route order.
        let keep = ri.min(rj);
        let gone = ri.max(rj);
        let tail_visits = std::mem::take(&mut routes[tail]);
        let mut merged = std::mem::take(&mut routes[head]);
        merged.extend(tail_visits);
        for &loc in &merged {
            route_of[loc] = keep;
        }
        routes[keep] = merged;
        loads[keep] = combined;
        loads[gone] = 0;
        merges += 1;
    }

    let routes: Vec<Vec<usize>> = routes.into_iter().filter(|r| !r.is_empty()).collect();
    debug!("Savings pass: {} merges, {} routes", merges, routes.len());

    fit_to_fleet(pi, routes)
}

/// While there are more routes than vehicles, join the two lightest routes
/// that still fit the largest vehicle. Bounded by `FLEET_MERGE_GUARD`.
fn fit_to_fleet(pi: &ProblemInstance, mut routes: Vec<Vec<usize>>) -> Vec<Vec<usize>> {
    let slots = pi.total_slots();
    let max_capacity = pi.max_capacity();
    let load = |r: &Vec<usize>| -> u64 { r.iter().map(|&c| pi.demand(c)).sum() };

    let mut guard = 0;
    while routes.len() > slots && guard < FLEET_MERGE_GUARD {
        guard += 1;
        routes.sort_by_key(|r| load(r));

        let loads: Vec<u64> = routes.iter().map(|r| load(r)).collect();
        let pair = (0..routes.len())
            .tuple_combinations::<(usize, usize)>()
            .find(|&(a, b)| loads[a] + loads[b] <= max_capacity);

        match pair {
            Some((a, b)) => {
                let tail = routes.remove(b);
                routes[a].extend(tail);
            }
            None => break,
        }
    }

    if routes.len() > slots {
        debug!(
            "Fleet-fit pass left {} routes for {} vehicles",
            routes.len(),
            slots
        );
    }
    routes
}

/// Classic Clarke-Wright savings.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClarkeWright;

impl RouteConstructor for ClarkeWright {
    fn name(&self) -> &'static str {
        "clarke-wright"
    }

    fn construct(&self, pi: &ProblemInstance) -> Solution {
        let routes = merge_by_savings(pi, basic_savings(pi));
        Solution::new(routes.iter().map(|visits| Route::new(visits, pi)).collect())
    }
}
