use std::cmp::Reverse;

use tracing::{debug, info, warn};

use super::slot_pool::SlotPool;
use crate::domain::{ProblemInstance, Route, Solution};

/// A route holding the slot it was packed into.
#[derive(Debug, Clone)]
struct Placement {
    slot: usize,
    route: Route,
}

/// Assigns a vehicle slot to every route that can be served.
///
/// Routes that cannot be served after best fit, consolidation and splitting
/// come back vehicle-less with `capacity_exceeded` set.
pub fn assign_vehicles(solution: Solution, pi: &ProblemInstance) -> Solution {
    let pool = SlotPool::from_fleet(&pi.vehicles);
    let route_count = solution.routes.len();

    let (pool, mut placed, pending) = best_fit(pool, solution.routes);
    let (pool, pending) = consolidate(pool, &mut placed, pending, pi);
    let (pool, split_routes, leftovers) = split(pool, pending, pi);

    debug!(
        "Assignment: {} routes in, {} placed, {} split, {} unserved, {} slots free",
        route_count,
        placed.len(),
        split_routes.len(),
        leftovers.len(),
        pool.free_count()
    );

    let mut routes: Vec<Route> = placed.into_iter().map(|p| p.route).collect();
    routes.extend(split_routes);
    for mut route in leftovers {
        warn!(
            "Route with load {} ({} stops) cannot be served by the fleet",
            route.total_capacity(),
            route.visit_count()
        );
        route.mark_capacity_exceeded();
        routes.push(route);
    }

    Solution::new(routes)
}

/// Heaviest route first, each into the smallest free slot that holds it.
fn best_fit(mut pool: SlotPool, mut routes: Vec<Route>) -> (SlotPool, Vec<Placement>, Vec<Route>) {
    pool.sort_by_capacity_desc();
    routes.sort_by_key(|r| Reverse(r.total_capacity()));

    let mut placed = vec![];
    let mut pending = vec![];
    for mut route in routes {
        if let Some(ind) = pool.best_fit(route.total_capacity()) {
            if route.assign(pool.slot(ind).as_assigned()) {
                pool.occupy(ind, route.total_capacity());
                placed.push(Placement { slot: ind, route });
                continue;
            }
        }
        pending.push(route);
    }
    (pool, placed, pending)
}

/// Appends leftover routes onto used slots that still have room.
fn consolidate(
    mut pool: SlotPool,
    placed: &mut [Placement],
    pending: Vec<Route>,
    pi: &ProblemInstance,
) -> (SlotPool, Vec<Route>) {
    let mut still_pending = vec![];
    for route in pending {
        let demand = route.total_capacity();
        let target = pool
            .best_remaining_fit(demand)
            .and_then(|slot| placed.iter_mut().find(|p| p.slot == slot));

        match target {
            Some(placement) => {
                let mut visits = placement.route.visits();
                visits.extend(route.visits());
                placement.route.set_visits(&visits, pi);
                pool.add_load(placement.slot, demand);
                info!(
                    "Consolidated {} stops into vehicle {}",
                    route.visit_count(),
                    pool.slot(placement.slot).vehicle_id
                );
            }
            None => still_pending.push(route),
        }
    }
    (pool, still_pending)
}

/// Cuts each remaining multi-stop route into consecutive chunks that each
/// fill a free slot, largest slot first. Whatever cannot be placed is
/// returned as a leftover route.
fn split(mut pool: SlotPool, pending: Vec<Route>, pi: &ProblemInstance) -> (SlotPool, Vec<Route>, Vec<Route>) {
    let mut split_routes = vec![];
    let mut leftovers = vec![];

    for route in pending {
        if route.visit_count() < 2 {
            leftovers.push(route);
            continue;
        }

        let visits = route.visits();
        let mut cursor = 0;
        while cursor < visits.len() {
            let Some(largest) = pool.largest_free() else {
                break;
            };
            let capacity = pool.slot(largest).capacity;

            let mut load = 0;
            let mut end = cursor;
            while end < visits.len() && load + pi.demand(visits[end]) <= capacity {
                load += pi.demand(visits[end]);
                end += 1;
            }
            if end == cursor {
                break;
            }

            let ind = pool.best_fit(load).unwrap_or(largest);
            let mut chunk = Route::new(&visits[cursor..end], pi);
            if chunk.assign(pool.slot(ind).as_assigned()) {
                pool.occupy(ind, load);
                split_routes.push(chunk);
            } else {
                leftovers.push(chunk);
            }
            cursor = end;
        }

        if cursor == 0 {
            leftovers.push(route);
        } else if cursor < visits.len() {
            leftovers.push(Route::new(&visits[cursor..], pi));
        }
    }

    (pool, split_routes, leftovers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Location, Vehicle};

    fn instance(vehicles: &[Vehicle], demands: &[u64]) -> ProblemInstance {
        let depot = Location::depot("d", 0.0, 0.0);
        let mut locations = vec![depot.clone()];
        for (ind, &demand) in demands.iter().enumerate() {
            locations.push(Location::new(&format!("c{}", ind), 0.1 * (ind + 1) as f64, 0.05, demand));
        }
        ProblemInstance::new(vehicles, &locations, &depot).unwrap()
    }

    #[test]
    fn best_fit_uses_smallest_sufficient_vehicle() {
        let pi = instance(&[Vehicle::new("big", 20, 1), Vehicle::new("small", 6, 1)], &[5, 15]);
        let draft = Solution::new(vec![Route::new(&[1], &pi), Route::new(&[2], &pi)]);

        let solution = assign_vehicles(draft, &pi);

        let vehicle_of = |loc: usize| {
            solution
                .routes
                .iter()
                .find(|r| r.contains(loc))
                .and_then(|r| r.vehicle())
                .map(|v| v.id.to_string())
        };
        assert_eq!(vehicle_of(1).as_deref(), Some("small"));
        assert_eq!(vehicle_of(2).as_deref(), Some("big"));
    }

    #[test]
    fn consolidates_into_partly_used_vehicle() {
        let pi = instance(&[Vehicle::new("v", 10, 1)], &[3, 4]);
        let draft = Solution::new(vec![Route::new(&[1], &pi), Route::new(&[2], &pi)]);

        let solution = assign_vehicles(draft, &pi);

        assert_eq!(solution.routes.len(), 1);
        let route = &solution.routes[0];
        assert_eq!(route.total_capacity(), 7);
        assert_eq!(route.visit_count(), 2);
        assert!(route.vehicle().is_some());
        assert!((route.distance() - pi.distance_matrix.path_distance(&route.sequence())).abs() < 1e-9);
    }

    #[test]
    fn splits_oversized_route_across_free_slots() {
        let pi = instance(&[Vehicle::new("v", 6, 2)], &[3, 3, 3, 3]);
        let draft = Solution::new(vec![Route::new(&[1, 2, 3, 4], &pi)]);

        let solution = assign_vehicles(draft, &pi);

        assert_eq!(solution.routes.len(), 2);
        assert!(solution.routes.iter().all(|r| r.vehicle().is_some()));
        assert!(solution.routes.iter().all(|r| r.total_capacity() <= 6));
        assert_eq!(solution.served_locations().len(), 4);
    }

    #[test]
    fn unservable_route_is_flagged_not_dropped() {
        let pi = instance(&[Vehicle::new("v", 5, 1)], &[9]);
        let draft = Solution::new(vec![Route::new(&[1], &pi)]);

        let solution = assign_vehicles(draft, &pi);

        assert_eq!(solution.routes.len(), 1);
        assert!(solution.routes[0].capacity_exceeded());
        assert!(solution.routes[0].vehicle().is_none());
        assert!(solution.served_locations().is_empty());
    }

    #[test]
    fn split_leftover_is_flagged() {
        let pi = instance(&[Vehicle::new("v", 6, 1)], &[3, 3, 3]);
        let draft = Solution::new(vec![Route::new(&[1, 2, 3], &pi)]);

        let solution = assign_vehicles(draft, &pi);

        assert_eq!(solution.routes.len(), 2);
        assert_eq!(solution.routes.iter().filter(|r| r.capacity_exceeded()).count(), 1);
        assert_eq!(solution.served_locations().len(), 2);
        assert_eq!(solution.visited_locations().len(), 3);
    }
}
