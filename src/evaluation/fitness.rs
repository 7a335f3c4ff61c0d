use std::cmp::Ordering;

use crate::config::constant::IMPROVEMENT_EPSILON;
use crate::domain::Solution;

/// How good a solution is: more served locations first, then less distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fitness {
    pub served: usize,
    pub distance: f64,
}

pub fn find_fitness(solution: &Solution) -> Fitness {
    Fitness {
        served: solution.served_locations().len(),
        distance: solution.total_distance(),
    }
}

impl Fitness {
    /// Strictly better, ignoring distance differences below the noise floor.
    pub fn beats(&self, other: &Fitness) -> bool {
        match self.served.cmp(&other.served) {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => self.distance + IMPROVEMENT_EPSILON < other.distance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coverage_outranks_distance() {
        let wide = Fitness { served: 5, distance: 900.0 };
        let short = Fitness { served: 4, distance: 10.0 };

        assert!(wide.beats(&short));
        assert!(!short.beats(&wide));
    }

    #[test]
    fn near_equal_distance_is_not_an_improvement() {
        let a = Fitness { served: 3, distance: 100.0 };
        let b = Fitness { served: 3, distance: 100.0 + 1e-12 };

        assert!(!a.beats(&b));
        assert!(!b.beats(&a));
    }
}
