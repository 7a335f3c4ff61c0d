use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::distance::matrix::DistanceMatrix;
use crate::error::{EngineError, EngineResult};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VehicleId(pub String);

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LocationId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for VehicleId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A demand point or the depot. Read-only input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    #[serde(default)]
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub demand: u64,
    #[serde(default)]
    pub is_depot: bool,
}

impl Location {
    pub fn new(id: &str, latitude: f64, longitude: f64, demand: u64) -> Self {
        Self {
            id: id.into(),
            name: id.to_string(),
            latitude,
            longitude,
            demand,
            is_depot: false,
        }
    }

    pub fn depot(id: &str, latitude: f64, longitude: f64) -> Self {
        Self {
            is_depot: true,
            ..Self::new(id, latitude, longitude, 0)
        }
    }
}

/// A vehicle type; `count` identical units of it exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    #[serde(default)]
    pub name: String,
    pub capacity: u64,
    #[serde(default = "default_count")]
    pub count: u32,
}

fn default_count() -> u32 {
    1
}

impl Vehicle {
    pub fn new(id: &str, capacity: u64, count: u32) -> Self {
        Self {
            id: id.into(),
            name: id.to_string(),
            capacity,
            count,
        }
    }
}

/// One visit within a route. `location` indexes `ProblemInstance::locations`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stop {
    #[serde(skip)]
    pub location: usize,
    pub location_id: LocationId,
    pub demand: u64,
    pub order: usize,
}

/// Everything one optimisation run reads: the fleet, the locations (depot
/// included) and the distance matrix built over them.
#[derive(Debug, Clone)]
pub struct ProblemInstance {
    pub vehicles: Vec<Vehicle>,
    pub locations: Vec<Location>,
    pub depot: usize,
    pub distance_matrix: DistanceMatrix,
}

impl ProblemInstance {
    /// Validates the inputs and builds the distance matrix.
    ///
    /// `depot` is matched against `locations` by id; if it is missing it is
    /// prepended. Every other location is treated as a demand point.
    pub fn new(vehicles: &[Vehicle], locations: &[Location], depot: &Location) -> EngineResult<Self> {
        if vehicles.is_empty() {
            return Err(EngineError::EmptyFleet);
        }
        for vehicle in vehicles {
            if vehicle.capacity == 0 {
                return Err(EngineError::InvalidVehicle {
                    id: vehicle.id.to_string(),
                    reason: "capacity must be positive".into(),
                });
            }
            if vehicle.count == 0 {
                return Err(EngineError::InvalidVehicle {
                    id: vehicle.id.to_string(),
                    reason: "count must be at least 1".into(),
                });
            }
        }

        let mut seen = HashSet::new();
        for loc in locations {
            if !seen.insert(&loc.id) {
                return Err(EngineError::DuplicateLocation(loc.id.to_string()));
            }
        }

        let mut all_locations = locations.to_vec();
        let depot_index = match all_locations.iter().position(|l| l.id == depot.id) {
            Some(ind) => ind,
            None => {
                all_locations.insert(0, depot.clone());
                0
            }
        };

        if all_locations.len() < 2 {
            return Err(EngineError::NoLocations);
        }

        let distance_matrix = DistanceMatrix::build(&all_locations);

        Ok(Self {
            vehicles: vehicles.to_vec(),
            locations: all_locations,
            depot: depot_index,
            distance_matrix,
        })
    }

    pub fn depot_location(&self) -> &Location {
        &self.locations[self.depot]
    }

    /// Non-depot location indices, in input order.
    pub fn customers(&self) -> Vec<usize> {
        (0..self.locations.len()).filter(|&i| i != self.depot).collect()
    }

    pub fn customer_count(&self) -> usize {
        self.locations.len() - 1
    }

    pub fn demand(&self, location: usize) -> u64 {
        if location == self.depot {
            0
        } else {
            self.locations[location].demand
        }
    }

    pub fn dist(&self, from: usize, to: usize) -> f64 {
        self.distance_matrix.get(from, to)
    }

    pub fn max_capacity(&self) -> u64 {
        self.vehicles.iter().map(|v| v.capacity).max().unwrap_or(0)
    }

    /// Number of physical vehicles across all types.
    pub fn total_slots(&self) -> usize {
        self.vehicles.iter().map(|v| v.count as usize).sum()
    }

    pub fn total_fleet_capacity(&self) -> u64 {
        self.vehicles.iter().map(|v| v.capacity * v.count as u64).sum()
    }

    pub fn stop(&self, location: usize, order: usize) -> Stop {
        Stop {
            location,
            location_id: self.locations[location].id.clone(),
            demand: self.demand(location),
            order,
        }
    }
}
