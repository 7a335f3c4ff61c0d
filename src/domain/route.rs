use serde::Serialize;
use tracing::warn;

use crate::config::constant::AVERAGE_SPEED_KMH;
use crate::domain::types::{ProblemInstance, Stop, VehicleId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignedVehicle {
    pub id: VehicleId,
    pub name: String,
    pub capacity: u64,
}

/// A closed tour `depot -> visits -> depot`.
///
/// The stop list is private: every structural change goes through
/// [`Route::set_sequence`], which re-indexes the stops and recomputes
/// `distance`, `duration` and `total_capacity` in one place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    stops: Vec<Stop>,
    vehicle: Option<AssignedVehicle>,
    distance: f64,
    duration: u64,
    total_capacity: u64,
    capacity_exceeded: bool,
}

/// Travel time in whole minutes at the average fleet speed.
pub fn duration_minutes(distance_km: f64) -> u64 {
    (distance_km / AVERAGE_SPEED_KMH * 60.0).round() as u64
}

impl Route {
    /// Builds an unassigned route over `visits` (non-depot location indices).
    pub fn new(visits: &[usize], pi: &ProblemInstance) -> Self {
        let mut route = Route {
            stops: vec![],
            vehicle: None,
            distance: 0.0,
            duration: 0,
            total_capacity: 0,
            capacity_exceeded: false,
        };
        route.set_visits(visits, pi);
        route
    }

    pub fn set_visits(&mut self, visits: &[usize], pi: &ProblemInstance) {
        let mut sequence = Vec::with_capacity(visits.len() + 2);
        sequence.push(pi.depot);
        sequence.extend_from_slice(visits);
        sequence.push(pi.depot);
        self.set_sequence(&sequence, pi);
    }

    /// Replaces the whole stop sequence. `sequence` must start and end at the depot.
    pub fn set_sequence(&mut self, sequence: &[usize], pi: &ProblemInstance) {
        debug_assert!(sequence.len() >= 2);
        debug_assert_eq!(sequence.first(), Some(&pi.depot));
        debug_assert_eq!(sequence.last(), Some(&pi.depot));

        self.stops = sequence
            .iter()
            .enumerate()
            .map(|(order, &loc)| pi.stop(loc, order))
            .collect();
        self.distance = pi.distance_matrix.path_distance(sequence);
        self.duration = duration_minutes(self.distance);
        self.total_capacity = self.stops.iter().map(|s| s.demand).sum();

        if let Some(vehicle) = &self.vehicle {
            if self.total_capacity > vehicle.capacity {
                warn!(
                    "Route load {} no longer fits vehicle {} ({}), unassigning",
                    self.total_capacity, vehicle.id, vehicle.capacity
                );
                self.vehicle = None;
            }
        }
    }

    /// Assigns `vehicle` if the current load fits it.
    pub(crate) fn assign(&mut self, vehicle: AssignedVehicle) -> bool {
        if self.total_capacity > vehicle.capacity {
            return false;
        }
        self.vehicle = Some(vehicle);
        self.capacity_exceeded = false;
        true
    }

    pub(crate) fn mark_capacity_exceeded(&mut self) {
        self.vehicle = None;
        self.capacity_exceeded = true;
    }

    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    /// Full location sequence, depot at both ends.
    pub fn sequence(&self) -> Vec<usize> {
        self.stops.iter().map(|s| s.location).collect()
    }

    /// Non-depot location indices in visiting order.
    pub fn visits(&self) -> Vec<usize> {
        self.interior().iter().map(|s| s.location).collect()
    }

    pub fn visit_count(&self) -> usize {
        self.stops.len().saturating_sub(2)
    }

    pub fn contains(&self, location: usize) -> bool {
        self.interior().iter().any(|s| s.location == location)
    }

    pub fn vehicle(&self) -> Option<&AssignedVehicle> {
        self.vehicle.as_ref()
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn duration(&self) -> u64 {
        self.duration
    }

    pub fn total_capacity(&self) -> u64 {
        self.total_capacity
    }

    pub fn capacity_exceeded(&self) -> bool {
        self.capacity_exceeded
    }

    fn interior(&self) -> &[Stop] {
        if self.stops.len() < 2 {
            return &[];
        }
        &self.stops[1..self.stops.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{Location, Vehicle};

    fn instance() -> ProblemInstance {
        let depot = Location::depot("d", 0.0, 0.0);
        let locations = vec![
            depot.clone(),
            Location::new("a", 0.0, 1.0, 4),
            Location::new("b", 0.0, 2.0, 5),
        ];
        ProblemInstance::new(&[Vehicle::new("v", 10, 1)], &locations, &depot).unwrap()
    }

    #[test]
    fn new_route_is_closed_and_indexed() {
        let pi = instance();
        let route = Route::new(&[1, 2], &pi);

        assert_eq!(route.sequence(), vec![0, 1, 2, 0]);
        let orders: Vec<usize> = route.stops().iter().map(|s| s.order).collect();
        assert_eq!(orders, vec![0, 1, 2, 3]);
        assert_eq!(route.total_capacity(), 9);
        assert!(route.vehicle().is_none());
        assert!(!route.capacity_exceeded());
    }

    #[test]
    fn mutation_recomputes_cached_metrics() {
        let pi = instance();
        let mut route = Route::new(&[1], &pi);
        let single = route.distance();

        route.set_visits(&[2, 1], &pi);

        assert!(route.distance() > single);
        assert!((route.distance() - pi.distance_matrix.path_distance(&route.sequence())).abs() < 1e-9);
        assert_eq!(route.duration(), duration_minutes(route.distance()));
        assert_eq!(route.total_capacity(), 9);
    }

    #[test]
    fn growing_past_capacity_drops_vehicle() {
        let pi = instance();
        let mut route = Route::new(&[1], &pi);
        let small = AssignedVehicle {
            id: "s".into(),
            name: "small".into(),
            capacity: 5,
        };

        assert!(route.assign(small));
        route.set_visits(&[1, 2], &pi);
        assert!(route.vehicle().is_none());
    }
}
