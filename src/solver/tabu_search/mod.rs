pub mod neighbourhood;
pub mod search;
pub mod tabu;

pub use neighbourhood::*;
pub use search::*;
pub use tabu::*;
