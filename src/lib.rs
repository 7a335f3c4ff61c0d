pub mod assignment;
pub mod config;
pub mod construction;
pub mod database;
pub mod distance;
pub mod domain;
pub mod engine;
pub mod error;
pub mod evaluation;
pub mod fixtures;
pub mod local_search;
pub mod runner;
pub mod setup;
pub mod solver;
pub mod utils;

pub use config::{SavingsWeights, SearchParams};
pub use engine::{optimize, AlgorithmKey, ComparisonReport, OptimizationOutcome, OptimizationResult};
pub use error::{EngineError, EngineResult};
