use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use crate::assignment::SlotPool;
use crate::domain::{ProblemInstance, Route, Solution};

/// Shuffles the locations and drops each into the first vehicle slot with
/// room for it; locations that fit nowhere get a trip of their own.
///
/// Used to seed population-based searches.
pub fn random_greedy(pi: &ProblemInstance, rng: &mut ChaCha8Rng) -> Solution {
    let mut customers = pi.customers();
    customers.shuffle(rng);

    let mut slots: Vec<(u64, Vec<usize>)> = SlotPool::from_fleet(&pi.vehicles)
        .iter()
        .map(|s| (s.capacity, vec![]))
        .collect();
    let mut overflow = vec![];

    for c in customers {
        let demand = pi.demand(c);
        match slots.iter_mut().find(|(room, _)| *room >= demand) {
            Some((room, visits)) => {
                *room -= demand;
                visits.push(c);
            }
            None => overflow.push(vec![c]),
        }
    }

    let routes = slots
        .into_iter()
        .map(|(_, visits)| visits)
        .chain(overflow)
        .filter(|visits| !visits.is_empty())
        .map(|visits| Route::new(&visits, pi))
        .collect();

    Solution::new(routes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Location, Vehicle};
    use rand::SeedableRng;

    fn instance() -> ProblemInstance {
        let depot = Location::depot("d", 0.0, 0.0);
        let mut locations = vec![depot.clone()];
        for ind in 0..8 {
            locations.push(Location::new(&format!("c{}", ind), 0.01 * ind as f64, 0.02, 3));
        }
        ProblemInstance::new(&[Vehicle::new("v", 9, 2)], &locations, &depot).unwrap()
    }

    #[test]
    fn covers_every_location_once() {
        let pi = instance();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let solution = random_greedy(&pi, &mut rng);

        let visited: usize = solution.routes.iter().map(|r| r.visit_count()).sum();
        assert_eq!(visited, 8);
        assert_eq!(solution.visited_locations().len(), 8);
        // Two slots of 9 hold three stops each; the rest overflow.
        assert_eq!(solution.routes.len(), 4);
    }

    #[test]
    fn same_seed_same_solution() {
        let pi = instance();
        let a = random_greedy(&pi, &mut ChaCha8Rng::seed_from_u64(3));
        let b = random_greedy(&pi, &mut ChaCha8Rng::seed_from_u64(3));
        assert_eq!(a.signature(), b.signature());
    }
}
