//! Live-state sync layer for the crowd occupancy dashboard.
//!
//! `sync` polls the backend on a fixed cadence and reconciles what it gets
//! into shared room collections; `math` classifies occupancy and lays out the
//! gauge; `view` turns committed poll state into render models.

pub mod api_interface;
pub mod math;
pub mod prelude;
pub mod sync;
pub mod telemetry;
pub mod view;

pub use prelude::{BestEffort, RequestError, RequestResult, RoomSource};
