pub mod route;
pub mod solution;
pub mod types;

pub use route::{AssignedVehicle, Route};
pub use solution::Solution;
pub use types::{Location, LocationId, ProblemInstance, Stop, Vehicle, VehicleId};
