//! flightwatch-core: Pure state tracking library for watched flights.
//!
//! No async, no I/O beyond the config file — just the tracked-flight store,
//! snapshot reconciliation, and region geometry. The `flightwatch` binary
//! drives it from a live feed and delivers the alerts it produces.

pub mod config;
pub mod geo;
pub mod reconcile;
pub mod store;
pub mod types;

// Re-export commonly used types at crate root
pub use config::Config;
pub use geo::{Bounds, Region};
pub use reconcile::{reconcile, reconcile_detailed, Reconciliation};
pub use store::{Store, TrackedEntity};
pub use types::*;
