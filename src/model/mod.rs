//! Data models for the capacity pool resource.

pub mod pool;

pub use pool::{CapacityPool, ScalingConfig, Tag};
