use std::collections::HashMap;

use tracing::info;

use super::geo::distance;
use crate::domain::types::{Location, LocationId};

/// Symmetric great-circle distances (km) between every pair of locations,
/// addressed by position in the location list or by location id.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    size: usize,
    data: Vec<f64>,
    index: HashMap<LocationId, usize>,
}

impl DistanceMatrix {
    /// O(n^2) construction, self-distances are 0.
    pub fn build(locations: &[Location]) -> Self {
        let size = locations.len();
        info!("Creating distance matrix ({} locations)", size);

        let mut data = vec![0.0; size * size];
        for i in 0..size {
            for j in (i + 1)..size {
                let d = distance(&locations[i], &locations[j]);
                data[i * size + j] = d;
                data[j * size + i] = d;
            }
        }

        let index = locations
            .iter()
            .enumerate()
            .map(|(ind, loc)| (loc.id.clone(), ind))
            .collect();

        Self { size, data, index }
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.data[from * self.size + to]
    }

    pub fn index_of(&self, id: &LocationId) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn get_by_id(&self, from: &LocationId, to: &LocationId) -> Option<f64> {
        Some(self.get(self.index_of(from)?, self.index_of(to)?))
    }

    /// Length of the walk through `sequence`. Every route metric and every
    /// local-search comparison goes through this.
    pub fn path_distance(&self, sequence: &[usize]) -> f64 {
        sequence.windows(2).map(|w| self.get(w[0], w[1])).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locations() -> Vec<Location> {
        vec![
            Location::depot("d", 0.0, 0.0),
            Location::new("a", 0.0, 1.0, 1),
            Location::new("b", 0.0, 2.0, 1),
        ]
    }

    #[test]
    fn matrix_is_complete_and_symmetric() {
        let dm = DistanceMatrix::build(&locations());
        assert_eq!(dm.len(), 3);
        for i in 0..3 {
            assert_eq!(dm.get(i, i), 0.0);
            for j in 0..3 {
                assert_eq!(dm.get(i, j), dm.get(j, i));
            }
        }
        let ab = dm.get_by_id(&"a".into(), &"b".into()).unwrap();
        assert!((ab - dm.get(1, 2)).abs() < 1e-12);
        assert!(dm.get_by_id(&"a".into(), &"zz".into()).is_none());
    }

    #[test]
    fn path_distance_sums_legs() {
        let dm = DistanceMatrix::build(&locations());
        let expected = dm.get(0, 1) + dm.get(1, 2) + dm.get(2, 0);
        assert!((dm.path_distance(&[0, 1, 2, 0]) - expected).abs() < 1e-12);
        assert_eq!(dm.path_distance(&[0]), 0.0);
    }
}
