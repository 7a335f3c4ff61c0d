use super::RouteConstructor;
use crate::assignment::SlotPool;
use crate::distance::geo::polar_angle;
use crate::domain::{ProblemInstance, Route, Solution};

/// Packs locations into vehicle slots in order of their polar angle around
/// the depot, opening the next slot when the current one is full.
///
/// Once the fleet is exhausted further routes are cut at the largest
/// capacity; the assigner decides what happens to them.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sweep;

impl RouteConstructor for Sweep {
    fn name(&self) -> &'static str {
        "sweep"
    }

    fn construct(&self, pi: &ProblemInstance) -> Solution {
        let depot = pi.depot_location();
        let mut order: Vec<(usize, f64)> = pi
            .customers()
            .into_iter()
            .map(|c| (c, polar_angle(depot, &pi.locations[c])))
            .collect();
        order.sort_by(|a, b| a.1.total_cmp(&b.1));

        let capacities: Vec<u64> = SlotPool::from_fleet(&pi.vehicles).iter().map(|s| s.capacity).collect();
        let capacity_at = |slot: usize| capacities.get(slot).copied().unwrap_or_else(|| pi.max_capacity());

        let mut routes = vec![];
        let mut slot = 0;
        let mut current: Vec<usize> = vec![];
        let mut load = 0;

        for (c, _) in order {
            let demand = pi.demand(c);
            if !current.is_empty() && load + demand > capacity_at(slot) {
                routes.push(Route::new(&current, pi));
                current.clear();
                load = 0;
                slot += 1;
            }
            current.push(c);
            load += demand;
        }
        if !current.is_empty() {
            routes.push(Route::new(&current, pi));
        }

        Solution::new(routes)
    }
}
