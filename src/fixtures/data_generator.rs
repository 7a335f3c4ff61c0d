use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use crate::config::constant::TRUCK_CAPACITIES;
use crate::domain::{Location, Vehicle};

/// Degrees of latitude/longitude customers may sit away from the warehouse.
const SPREAD_DEG: f64 = 0.12;

/// Warehouse first, then `count` customers scattered around it.
pub fn generate_random_locations(count: usize, warehouse: (f64, f64), rng: &mut ChaCha8Rng) -> Vec<Location> {
    let mut locations = Vec::with_capacity(count + 1);
    let mut depot = Location::depot("WH", warehouse.0, warehouse.1);
    depot.name = "Warehouse".to_string();
    locations.push(depot);

    for ind in 1..=count {
        let lat = warehouse.0 + rng.gen_range(-SPREAD_DEG..SPREAD_DEG);
        let lon = warehouse.1 + rng.gen_range(-SPREAD_DEG..SPREAD_DEG);
        locations.push(Location::new(&format!("C{:03}", ind), lat, lon, 0));
    }
    locations
}

/// Random customer demands in `[100_000, 150_000]`; the depot keeps 0.
fn generate_customer_demands(locations: &mut [Location], rng: &mut ChaCha8Rng) {
    for loc in locations.iter_mut().filter(|l| !l.is_depot) {
        loc.demand = rng.gen_range(100_000..=150_000);
    }
}

/// One truck per configured capacity.
pub fn default_fleet() -> Vec<Vehicle> {
    TRUCK_CAPACITIES
        .iter()
        .enumerate()
        .map(|(ind, &capacity)| {
            let mut vehicle = Vehicle::new(&format!("T{}", ind + 1), capacity, 1);
            vehicle.name = format!("Truck {}", ind + 1);
            vehicle
        })
        .collect()
}

/// Seeded random problem for demos and tests.
pub fn generate_random_inputs(count: usize, warehouse: (f64, f64), seed: u64) -> (Vec<Location>, Vec<Vehicle>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut locations = generate_random_locations(count, warehouse, &mut rng);
    generate_customer_demands(&mut locations, &mut rng);
    let vehicles = default_fleet();

    let total_demand: u64 = locations.iter().map(|l| l.demand).sum();
    let total_capacity: u64 = vehicles.iter().map(|v| v.capacity * v.count as u64).sum();
    info!(
        "Generated {} customers (total demand {}), fleet of {} (total capacity {})",
        count,
        total_demand,
        vehicles.len(),
        total_capacity
    );
    if total_capacity < total_demand {
        warn!(
            "Total fleet capacity ({}) is less than total demand ({}), some routes will be unserved",
            total_capacity, total_demand
        );
    }

    (locations, vehicles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::constant::WAREHOUSE;

    #[test]
    fn seeded_generation_is_repeatable() {
        let (a, fleet) = generate_random_inputs(10, WAREHOUSE, 42);
        let (b, _) = generate_random_inputs(10, WAREHOUSE, 42);

        assert_eq!(a, b);
        assert_eq!(a.len(), 11);
        assert_eq!(a.iter().filter(|l| l.is_depot).count(), 1);
        assert!(a[1..].iter().all(|l| (100_000..=150_000).contains(&l.demand)));
        assert_eq!(fleet.len(), TRUCK_CAPACITIES.len());
    }
}
