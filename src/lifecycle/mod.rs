//! Runtime side of the crate: the host loop that re-invokes handlers.

pub mod host;

pub use host::{Host, HostError};
pub use lifecycle_framework::setup_tracing;
