use std::collections::BTreeSet;

use serde::Serialize;

use crate::domain::route::Route;

/// A set of routes; no location appears in two of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Solution {
    pub routes: Vec<Route>,
}

impl Solution {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    pub fn total_distance(&self) -> f64 {
        self.routes.iter().map(|r| r.distance()).sum()
    }

    /// Locations on routes that a vehicle can actually run.
    pub fn served_locations(&self) -> BTreeSet<usize> {
        self.routes
            .iter()
            .filter(|r| !r.capacity_exceeded())
            .flat_map(|r| r.visits())
            .collect()
    }

    /// Every non-depot location appearing on any route.
    pub fn visited_locations(&self) -> BTreeSet<usize> {
        self.routes.iter().flat_map(|r| r.visits()).collect()
    }

    pub fn demand_served(&self) -> u64 {
        self.routes
            .iter()
            .filter(|r| !r.capacity_exceeded())
            .map(|r| r.total_capacity())
            .sum()
    }

    /// Canonical form: each route's visit sequence, sorted.
    pub fn signature(&self) -> Vec<Vec<usize>> {
        let mut sig: Vec<Vec<usize>> = self
            .routes
            .iter()
            .map(|r| r.visits())
            .filter(|v| !v.is_empty())
            .collect();
        sig.sort();
        sig
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{Location, ProblemInstance, Vehicle};

    #[test]
    fn signature_ignores_route_order() {
        let depot = Location::depot("d", 0.0, 0.0);
        let locations = vec![
            depot.clone(),
            Location::new("a", 0.0, 1.0, 1),
            Location::new("b", 1.0, 0.0, 1),
            Location::new("c", 1.0, 1.0, 1),
        ];
        let pi = ProblemInstance::new(&[Vehicle::new("v", 5, 2)], &locations, &depot).unwrap();

        let one = Solution::new(vec![Route::new(&[1, 2], &pi), Route::new(&[3], &pi)]);
        let two = Solution::new(vec![Route::new(&[3], &pi), Route::new(&[1, 2], &pi)]);

        assert_eq!(one.signature(), two.signature());
        assert_eq!(one.visited_locations().len(), 3);
        assert!((one.total_distance() - two.total_distance()).abs() < 1e-12);
    }
}
