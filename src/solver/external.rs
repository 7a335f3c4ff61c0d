use crate::domain::{ProblemInstance, Solution};
use crate::error::EngineResult;

/// A solver living outside this crate (a remote optimisation service, an
/// OR library binding). Results are treated as best effort: any error makes
/// the engine fall back to enhanced savings.
pub trait ExternalSolver: Send + Sync {
    fn name(&self) -> &str;

    fn solve(&self, pi: &ProblemInstance) -> EngineResult<Solution>;
}
