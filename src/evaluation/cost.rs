use serde::{Deserialize, Serialize};

use crate::domain::route::duration_minutes;
use crate::domain::{ProblemInstance, Solution};

/// Derived totals for one solution. Never stored on its own.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostSummary {
    pub total_distance: f64,
    /// Minutes at the average fleet speed.
    pub total_duration: u64,
    pub locations_served: usize,
    pub total_locations: usize,
    pub coverage_percentage: f64,
    pub vehicle_utilization: f64,
    /// Routes flagged `capacity_exceeded`.
    pub unserved_routes: usize,
}

pub fn evaluate(solution: &Solution, pi: &ProblemInstance) -> CostSummary {
    let total_distance = solution.total_distance();
    let locations_served = solution.served_locations().len();
    let total_locations = pi.customer_count();
    let fleet_capacity = pi.total_fleet_capacity();

    CostSummary {
        total_distance,
        total_duration: duration_minutes(total_distance),
        locations_served,
        total_locations,
        coverage_percentage: percentage(locations_served as f64, total_locations as f64),
        vehicle_utilization: percentage(solution.demand_served() as f64, fleet_capacity as f64),
        unserved_routes: solution.routes.iter().filter(|r| r.capacity_exceeded()).count(),
    }
}

fn percentage(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}
