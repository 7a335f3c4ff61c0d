use std::f64::consts::PI;

use super::savings::{basic_savings, merge_by_savings, Saving};
use super::RouteConstructor;
use crate::config::SavingsWeights;
use crate::distance::geo::subtended_angle;
use crate::domain::{ProblemInstance, Route, Solution};

/// Clarke-Wright with a re-weighted saving score.
///
/// Only the ordering of the savings list changes; merges still follow the
/// endpoint and capacity rules of the classic pass. The score multiplies the
/// basic saving by:
/// - an angular bonus for pairs that lie in the same direction from the depot,
/// - a penalty (not an exclusion) when the pair would overflow the largest vehicle,
/// - an urgency bonus growing with the pair's share of that vehicle,
/// - a bonus for pairs closer than `efficiency_cutoff_km`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnhancedClarkeWright {
    pub weights: SavingsWeights,
}

impl EnhancedClarkeWright {
    pub fn new(weights: SavingsWeights) -> Self {
        Self { weights }
    }

    pub(crate) fn score(&self, pi: &ProblemInstance, saving: &Saving) -> f64 {
        let w = &self.weights;
        let depot = pi.depot_location();
        let (li, lj) = (&pi.locations[saving.i], &pi.locations[saving.j]);

        let angle = subtended_angle(depot, li, lj);
        let angular = 1.0 + w.angular_weight * (1.0 - angle / PI);

        let max_capacity = pi.max_capacity() as f64;
        let combined = (pi.demand(saving.i) + pi.demand(saving.j)) as f64;
        let capacity = if combined > max_capacity {
            w.over_capacity_factor
        } else {
            1.0
        };
        let urgency = 1.0 + w.urgency_weight * (combined / max_capacity).min(1.0);

        let gap = pi.dist(saving.i, saving.j);
        let efficiency = if gap < w.efficiency_cutoff_km {
            1.0 + w.efficiency_weight * (1.0 - gap / w.efficiency_cutoff_km)
        } else {
            1.0
        };

        saving.value * angular * capacity * urgency * efficiency
    }

    pub(crate) fn weighted_savings(&self, pi: &ProblemInstance) -> Vec<Saving> {
        basic_savings(pi)
            .into_iter()
            .map(|s| Saving {
                value: self.score(pi, &s),
                ..s
            })
            .collect()
    }
}

impl RouteConstructor for EnhancedClarkeWright {
    fn name(&self) -> &'static str {
        "enhanced-clarke-wright"
    }

    fn construct(&self, pi: &ProblemInstance) -> Solution {
        let routes = merge_by_savings(pi, self.weighted_savings(pi));
        Solution::new(routes.iter().map(|visits| Route::new(visits, pi)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Location, Vehicle};

    fn instance() -> ProblemInstance {
        let depot = Location::depot("d", 0.0, 0.0);
        let locations = vec![
            depot.clone(),
            Location::new("east1", 0.0, 0.2, 2),
            Location::new("east2", 0.0, 0.3, 2),
            Location::new("north", 0.25, 0.0, 2),
            Location::new("heavy", 0.0, 0.25, 9),
        ];
        ProblemInstance::new(&[Vehicle::new("v", 10, 3)], &locations, &depot).unwrap()
    }

    #[test]
    fn colinear_pairs_score_higher_than_basic() {
        let pi = instance();
        let ecw = EnhancedClarkeWright::default();
        let basic = basic_savings(&pi);
        let weighted = ecw.weighted_savings(&pi);

        let pair = |v: &[Saving], i, j| v.iter().find(|s| s.i == i && s.j == j).unwrap().value;
        assert!(pair(&weighted, 1, 2) > pair(&basic, 1, 2));
    }

    #[test]
    fn overflowing_pairs_are_penalised_not_dropped() {
        let pi = instance();
        let ecw = EnhancedClarkeWright::default();
        let basic = basic_savings(&pi);
        let weighted = ecw.weighted_savings(&pi);

        assert_eq!(basic.len(), weighted.len());
        let heavy_basic = basic.iter().find(|s| s.i == 2 && s.j == 4).unwrap();
        let heavy = weighted.iter().find(|s| s.i == 2 && s.j == 4).unwrap();
        assert!(heavy.value < heavy_basic.value);
    }

    #[test]
    fn construct_respects_largest_capacity() {
        let pi = instance();
        let solution = EnhancedClarkeWright::default().construct(&pi);

        assert_eq!(solution.visited_locations().len(), 4);
        assert!(solution
            .routes
            .iter()
            .all(|r| r.total_capacity() <= 10 || r.visit_count() == 1));
    }
}
