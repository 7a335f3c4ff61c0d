use crate::domain::{AssignedVehicle, Vehicle, VehicleId};

/// One physical unit of a vehicle type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleSlot {
    pub vehicle_id: VehicleId,
    pub name: String,
    pub capacity: u64,
    pub load: u64,
    pub used: bool,
}

impl VehicleSlot {
    pub fn remaining(&self) -> u64 {
        self.capacity.saturating_sub(self.load)
    }

    pub fn as_assigned(&self) -> AssignedVehicle {
        AssignedVehicle {
            id: self.vehicle_id.clone(),
            name: self.name.clone(),
            capacity: self.capacity,
        }
    }
}

/// The fleet expanded into individual slots, in fleet order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotPool {
    slots: Vec<VehicleSlot>,
}

impl SlotPool {
    pub fn from_fleet(vehicles: &[Vehicle]) -> Self {
        let slots = vehicles
            .iter()
            .flat_map(|v| {
                (0..v.count).map(move |_| VehicleSlot {
                    vehicle_id: v.id.clone(),
                    name: v.name.clone(),
                    capacity: v.capacity,
                    load: 0,
                    used: false,
                })
            })
            .collect();
        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VehicleSlot> {
        self.slots.iter()
    }

    pub fn slot(&self, ind: usize) -> &VehicleSlot {
        &self.slots[ind]
    }

    pub fn free_count(&self) -> usize {
        self.slots.iter().filter(|s| !s.used).count()
    }

    /// Largest capacity first; equal capacities keep fleet order.
    pub fn sort_by_capacity_desc(&mut self) {
        self.slots.sort_by(|a, b| b.capacity.cmp(&a.capacity));
    }

    /// Free slot with the smallest capacity that still holds `demand`.
    pub fn best_fit(&self, demand: u64) -> Option<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.used && s.capacity >= demand)
            .min_by_key(|(_, s)| s.capacity)
            .map(|(ind, _)| ind)
    }

    /// Used slot with the smallest remaining room that still holds `demand`.
    pub fn best_remaining_fit(&self, demand: u64) -> Option<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.used && s.remaining() >= demand)
            .min_by_key(|(_, s)| s.remaining())
            .map(|(ind, _)| ind)
    }

    pub fn largest_free(&self) -> Option<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.used)
            .min_by(|(_, a), (_, b)| b.capacity.cmp(&a.capacity))
            .map(|(ind, _)| ind)
    }

    pub fn occupy(&mut self, ind: usize, load: u64) {
        let slot = &mut self.slots[ind];
        slot.used = true;
        slot.load = load;
    }

    pub fn add_load(&mut self, ind: usize, extra: u64) {
        self.slots[ind].load += extra;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> SlotPool {
        SlotPool::from_fleet(&[Vehicle::new("small", 5, 2), Vehicle::new("big", 12, 1)])
    }

    #[test]
    fn expands_counts_into_slots() {
        let pool = pool();
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.free_count(), 3);
        assert_eq!(pool.slot(2).capacity, 12);
    }

    #[test]
    fn best_fit_prefers_smallest_sufficient_slot() {
        let mut pool = pool();
        pool.sort_by_capacity_desc();

        let ind = pool.best_fit(4).unwrap();
        assert_eq!(pool.slot(ind).capacity, 5);
        pool.occupy(ind, 4);

        let next = pool.best_fit(4).unwrap();
        assert_ne!(next, ind);
        assert_eq!(pool.slot(next).capacity, 5);
        assert!(pool.best_fit(13).is_none());
    }

    #[test]
    fn remaining_fit_only_considers_used_slots() {
        let mut pool = pool();
        assert!(pool.best_remaining_fit(1).is_none());

        pool.occupy(2, 10);
        pool.occupy(0, 1);
        assert_eq!(pool.best_remaining_fit(2), Some(2));
        assert_eq!(pool.best_remaining_fit(3), Some(0));
        assert_eq!(pool.largest_free(), Some(1));
    }
}
