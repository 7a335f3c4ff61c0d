pub mod comparison;
pub mod cost;
pub mod fitness;

pub use comparison::{compare_summaries, rank};
pub use cost::{evaluate, CostSummary};
pub use fitness::{find_fitness, Fitness};
