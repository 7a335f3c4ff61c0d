//! Hands physical vehicles to draft routes: best fit, then consolidation into
//! partly used vehicles, then splitting. The [`SlotPool`] moves through the
//! phases by value.

pub mod bin_packer;
pub mod slot_pool;

pub use bin_packer::assign_vehicles;
pub use slot_pool::{SlotPool, VehicleSlot};
