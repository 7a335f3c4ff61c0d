//! Caller-side checks and input loading. The engine trusts what comes out of
//! here: one depot, a non-empty fleet, and a problem within the size caps.

use std::path::Path;

use csv::ReaderBuilder;
use tracing::{info, warn};

use crate::config::constant::{MAX_LOCATIONS, MAX_VEHICLES, WAREHOUSE};
use crate::config::RunConfig;
use crate::domain::{Location, Vehicle};
use crate::error::{EngineError, EngineResult};
use crate::fixtures::generate_random_inputs;
use crate::setup::init_types::OptimizationRequest;

/// The single location flagged as depot.
pub fn resolve_depot(locations: &[Location]) -> EngineResult<Location> {
    let mut depots = locations.iter().filter(|l| l.is_depot);
    match (depots.next(), depots.count()) {
        (None, _) => Err(EngineError::NoDepot),
        (Some(depot), 0) => Ok(depot.clone()),
        (Some(_), others) => Err(EngineError::MultipleDepots(others + 1)),
    }
}

pub fn validate_request(vehicles: Vec<Vehicle>, locations: Vec<Location>) -> EngineResult<OptimizationRequest> {
    if vehicles.is_empty() {
        return Err(EngineError::EmptyFleet);
    }
    if vehicles.len() > MAX_VEHICLES {
        return Err(EngineError::TooManyVehicles {
            max: MAX_VEHICLES,
            actual: vehicles.len(),
        });
    }

    let depot = resolve_depot(&locations)?;
    let customers = locations.len() - 1;
    if customers == 0 {
        return Err(EngineError::NoLocations);
    }
    if customers > MAX_LOCATIONS {
        return Err(EngineError::TooManyLocations {
            max: MAX_LOCATIONS,
            actual: customers,
        });
    }

    Ok(OptimizationRequest {
        vehicles,
        locations,
        depot,
    })
}

pub fn load_locations_csv(path: impl AsRef<Path>) -> EngineResult<Vec<Location>> {
    let mut reader = ReaderBuilder::new().trim(csv::Trim::All).from_path(path.as_ref())?;
    let locations = reader.deserialize().collect::<Result<Vec<Location>, _>>()?;
    info!("Loaded {} locations from {}", locations.len(), path.as_ref().display());
    Ok(locations)
}

pub fn load_vehicles_csv(path: impl AsRef<Path>) -> EngineResult<Vec<Vehicle>> {
    let mut reader = ReaderBuilder::new().trim(csv::Trim::All).from_path(path.as_ref())?;
    let vehicles = reader.deserialize().collect::<Result<Vec<Vehicle>, _>>()?;
    info!("Loaded {} vehicle types from {}", vehicles.len(), path.as_ref().display());
    Ok(vehicles)
}

/// Reads the request from the configured CSV files, generating whatever is
/// missing from the seeded fixtures.
pub fn load_request(config: &RunConfig) -> EngineResult<OptimizationRequest> {
    let (generated_locations, generated_vehicles) =
        generate_random_inputs(config.location_count, WAREHOUSE, config.seed);

    let locations = match &config.locations_csv {
        Some(path) => load_locations_csv(path)?,
        None => {
            warn!(
                "CVRP_LOCATIONS_CSV not set, using {} generated locations",
                config.location_count
            );
            generated_locations
        }
    };
    let vehicles = match &config.vehicles_csv {
        Some(path) => load_vehicles_csv(path)?,
        None => {
            warn!("CVRP_VEHICLES_CSV not set, using the default fleet");
            generated_vehicles
        }
    };

    validate_request(vehicles, locations)
}
