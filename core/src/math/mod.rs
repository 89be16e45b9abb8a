pub mod gauge;
pub mod occupancy;
pub mod status;

pub use gauge::GaugeGeometry;
pub use occupancy::{occupancy_percent, round_tenth, EmaCounter};
pub use status::{classify, OccupancyStatus, StatusColor};
