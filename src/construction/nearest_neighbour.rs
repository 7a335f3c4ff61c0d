use tracing::warn;

use super::RouteConstructor;
use crate::assignment::SlotPool;
use crate::domain::{ProblemInstance, Route, Solution};

/// Fills one vehicle slot at a time with the nearest unvisited location that
/// still fits, returning to the depot when nothing fits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestNeighbour;

impl RouteConstructor for NearestNeighbour {
    fn name(&self) -> &'static str {
        "nearest-neighbor"
    }

    fn construct(&self, pi: &ProblemInstance) -> Solution {
        let customers = pi.customers();
        let mut visited = vec![false; pi.locations.len()];
        let mut pending = customers.len();
        let mut routes = vec![];

        for slot in SlotPool::from_fleet(&pi.vehicles).iter() {
            if pending == 0 {
                break;
            }

            let mut remaining = slot.capacity;
            let mut current = pi.depot;
            let mut visits = vec![];

            loop {
                let from = current;
                let nearest = customers
                    .iter()
                    .copied()
                    .filter(|&c| !visited[c] && pi.demand(c) <= remaining)
                    .min_by(|&a, &b| pi.dist(from, a).total_cmp(&pi.dist(from, b)));
                let Some(next) = nearest else {
                    break;
                };

                visited[next] = true;
                pending -= 1;
                remaining -= pi.demand(next);
                visits.push(next);
                current = next;
            }

            if !visits.is_empty() {
                routes.push(Route::new(&visits, pi));
            }
        }

        // Out of vehicles: every leftover gets its own trip; assignment flags
        // the ones no vehicle can carry.
        for &c in &customers {
            if visited[c] {
                continue;
            }
            if pi.demand(c) > pi.max_capacity() {
                warn!(
                    "Location {} (demand {}) fits no vehicle",
                    pi.locations[c].id,
                    pi.demand(c)
                );
            }
            visited[c] = true;
            routes.push(Route::new(&[c], pi));
        }

        Solution::new(routes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Location, Vehicle};

    fn instance(vehicles: &[Vehicle]) -> ProblemInstance {
        let depot = Location::depot("d", 0.0, 0.0);
        let locations = vec![
            depot.clone(),
            Location::new("far", 0.0, 3.0, 4),
            Location::new("near", 0.0, 1.0, 4),
            Location::new("mid", 0.0, 2.0, 4),
        ];
        ProblemInstance::new(vehicles, &locations, &depot).unwrap()
    }

    #[test]
    fn visits_in_nearest_order() {
        let pi = instance(&[Vehicle::new("v", 100, 1)]);
        let solution = NearestNeighbour.construct(&pi);

        assert_eq!(solution.routes.len(), 1);
        assert_eq!(solution.routes[0].visits(), vec![2, 3, 1]);
    }

    #[test]
    fn leftovers_become_single_stop_routes() {
        let pi = instance(&[Vehicle::new("v", 8, 1)]);
        let solution = NearestNeighbour.construct(&pi);

        assert_eq!(solution.routes.len(), 2);
        assert_eq!(solution.routes[0].visits(), vec![2, 3]);
        assert_eq!(solution.routes[1].visits(), vec![1]);
    }

    #[test]
    fn oversized_location_keeps_its_own_route() {
        let depot = Location::depot("d", 0.0, 0.0);
        let locations = vec![depot.clone(), Location::new("huge", 0.0, 1.0, 50)];
        let pi = ProblemInstance::new(&[Vehicle::new("v", 10, 1)], &locations, &depot).unwrap();

        let solution = NearestNeighbour.construct(&pi);
        assert_eq!(solution.routes.len(), 1);
        assert_eq!(solution.routes[0].visits(), vec![1]);
        assert_eq!(solution.visited_locations().len(), 1);
    }
}
