//! Constructive heuristics. Each produces a draft solution whose routes have
//! no vehicle yet; vehicles are handed out by [`crate::assignment`].

pub mod enhanced_savings;
pub mod nearest_neighbour;
pub mod random_greedy;
pub mod savings;
pub mod sweep;

use crate::domain::{ProblemInstance, Solution};

pub use enhanced_savings::EnhancedClarkeWright;
pub use nearest_neighbour::NearestNeighbour;
pub use random_greedy::random_greedy;
pub use savings::ClarkeWright;
pub use sweep::Sweep;

pub trait RouteConstructor {
    fn name(&self) -> &'static str;

    fn construct(&self, pi: &ProblemInstance) -> Solution;
}
