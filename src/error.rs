use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("at least one vehicle is required")]
    EmptyFleet,

    #[error("at least one non-depot location is required")]
    NoLocations,

    #[error("vehicle {id} is invalid: {reason}")]
    InvalidVehicle { id: String, reason: String },

    #[error("location {0} appears more than once")]
    DuplicateLocation(String),

    #[error("no location is flagged as depot")]
    NoDepot,

    #[error("{0} locations are flagged as depot, expected exactly one")]
    MultipleDepots(usize),

    #[error("too many locations: {actual} (max {max})")]
    TooManyLocations { max: usize, actual: usize },

    #[error("too many vehicles: {actual} (max {max})")]
    TooManyVehicles { max: usize, actual: usize },

    #[error("unknown algorithm '{0}'")]
    UnknownAlgorithm(String),

    #[error("algorithm {algorithm} failed: {reason}")]
    AlgorithmFailed { algorithm: String, reason: String },

    #[error("external solver error: {0}")]
    ExternalSolver(String),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;
