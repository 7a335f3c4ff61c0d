pub mod geo;
pub mod matrix;
pub mod road_routing;

pub use geo::distance;
pub use matrix::DistanceMatrix;
