use std::env;

use dotenv::dotenv;
use tracing::warn;

pub mod constant {
    pub(crate) const EARTH_RADIUS_KM: f64 = 6371.0;
    pub(crate) const AVERAGE_SPEED_KMH: f64 = 40.0;
    pub(crate) const IMPROVEMENT_EPSILON: f64 = 1e-9;
    pub(crate) const RECOMPUTE_TOLERANCE: f64 = 1e-6;

    pub const MAX_LOCATIONS: usize = 100;
    pub const MAX_VEHICLES: usize = 20;
    pub const SEED: u64 = 12345;

    // Savings: bound on the post-pass that squeezes routes into the fleet.
    pub(crate) const FLEET_MERGE_GUARD: usize = 1000;

    // Tabu search
    pub(crate) const TABU_NEIGHBOUR_CAP: usize = 50;

    // Simulated annealing
    pub(crate) const SA_START_TEMPERATURE: f64 = 1000.0;
    pub(crate) const SA_COOLING_RATE: f64 = 0.95;
    pub(crate) const SA_MIN_TEMPERATURE: f64 = 1.0;

    // Genetic algorithm
    pub(crate) const GA_MUTATION_RATE: f64 = 0.1;
    pub(crate) const GA_TOURNAMENT_SIZE: usize = 3;

    // Ant colony
    pub(crate) const ACO_EVAPORATION: f64 = 0.1;
    pub(crate) const ACO_DEPOSIT: f64 = 100.0;
    pub(crate) const ACO_INITIAL_PHEROMONE: f64 = 1.0;

    // Fixture generation, same fleet shape the solver was first tuned on.
    pub const TRUCK_CAPACITIES: [u64; 2] = [1_000_000, 500_000];
    pub const WAREHOUSE: (f64, f64) = (1.3521, 103.8198);
    pub const LOCATION_COUNT: usize = 40;
}

/// Re-weighting constants for the enhanced savings score.
///
/// The values are empirical; they are kept here so callers can tune them
/// without touching the heuristic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SavingsWeights {
    /// Bonus for pairs that are near-colinear from the depot.
    pub angular_weight: f64,
    /// Bonus proportional to combined demand over the largest capacity.
    pub urgency_weight: f64,
    /// Pairs closer than this get the distance-efficiency bonus.
    pub efficiency_cutoff_km: f64,
    pub efficiency_weight: f64,
    /// Multiplier applied when a pair cannot share the largest vehicle.
    pub over_capacity_factor: f64,
}

impl Default for SavingsWeights {
    fn default() -> Self {
        Self {
            angular_weight: 0.15,
            urgency_weight: 0.2,
            efficiency_cutoff_km: 50.0,
            efficiency_weight: 0.1,
            over_capacity_factor: 0.5,
        }
    }
}

/// Per-run knobs handed to the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchParams {
    pub seed: u64,
    pub savings_weights: SavingsWeights,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            seed: constant::SEED,
            savings_weights: SavingsWeights::default(),
        }
    }
}

/// Settings for the command-line solver, read from the environment / `.env`.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub algorithm: String,
    pub compare_all: bool,
    pub locations_csv: Option<String>,
    pub vehicles_csv: Option<String>,
    pub location_count: usize,
    pub seed: u64,
    pub database_url: String,
    pub osrm_base_url: String,
    pub road_geometry: bool,
    pub report_csv: String,
}

impl RunConfig {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            algorithm: env::var("CVRP_ALGORITHM").unwrap_or_else(|_| "enhanced-clarke-wright".into()),
            compare_all: parse_flag("CVRP_COMPARE_ALL"),
            locations_csv: env::var("CVRP_LOCATIONS_CSV").ok(),
            vehicles_csv: env::var("CVRP_VEHICLES_CSV").ok(),
            location_count: parse_or("CVRP_LOCATION_COUNT", constant::LOCATION_COUNT),
            seed: parse_or("CVRP_SEED", constant::SEED),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| {
                warn!("DATABASE_URL not set, using default SQLite file");
                "sqlite:cvrp_runs.sqlite".to_string()
            }),
            osrm_base_url: env::var("OSRM_BASE_URL")
                .unwrap_or_else(|_| "https://router.project-osrm.org/route/v1/driving".to_string()),
            road_geometry: parse_flag("CVRP_ROAD_GEOMETRY"),
            report_csv: env::var("CVRP_REPORT_CSV").unwrap_or_else(|_| "best_so_far.csv".into()),
        }
    }

    pub fn search_params(&self) -> SearchParams {
        SearchParams {
            seed: self.seed,
            ..SearchParams::default()
        }
    }
}

fn parse_flag(key: &str) -> bool {
    env::var(key)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring unparsable {}={:?}", key, raw);
            default
        }),
        Err(_) => default,
    }
}
