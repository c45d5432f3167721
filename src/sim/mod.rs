pub mod internal_loads;
pub mod lighting;
pub mod occupancy;
pub mod schedule;
