//! # Algorithms Module
//!
//! Alert thresholds and the aggregation reduction.

pub mod aggregation;
pub mod alerts;

pub use aggregation::{floor_average, gather_handles, reduce_batch};
pub use alerts::{evaluate, AlertThresholds, Band};
