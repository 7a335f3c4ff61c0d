use serde::{Deserialize, Serialize};

use crate::domain::{Location, Vehicle};

/// A validated optimisation request: the fleet, every location, and the one
/// location acting as depot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationRequest {
    pub vehicles: Vec<Vehicle>,
    pub locations: Vec<Location>,
    pub depot: Location,
}
