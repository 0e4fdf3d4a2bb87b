//! Batch detectors over the complaint store
//!
//! All three detectors are pure read-only queries: they take an explicit
//! `as_of` timestamp (no ambient wall-clock state), hold no mutable state,
//! and produce fresh results on every invocation — safe to run
//! concurrently with each other and with themselves.

pub mod forecast;
pub mod hotspot;
pub mod spike;

pub use forecast::{forecast_next_period, trend_direction, FORECAST_METHOD};
pub use hotspot::identify_hotspots;
pub use spike::detect_spikes;
