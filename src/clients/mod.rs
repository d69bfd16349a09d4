//! The remote capacity management API and its test doubles.

pub mod capacity_api;
pub mod mock;
pub mod sandbox;

pub use capacity_api::*;
pub use mock::MockCapacityApi;
pub use sandbox::SandboxCapacityApi;
