pub mod frame;
pub mod occupancy;
