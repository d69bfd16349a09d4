//! # Observability & Tracing
//!
//! The engine logs every decision it makes through the `tracing` crate:
//!
//! - **Handler entry**: one span per invocation carrying the resource type
//!   and operation
//! - **Steps**: `Call`, `Skipped`, `Step ok`, `Recovered`, `Step failed`
//! - **Stabilization**: `Status check`, `Awaiting stabilization`,
//!   `Stabilized`, `Not stabilized`
//! - **Outcome**: `Operation complete` or the failure with its kind
//!
//! ## Usage Examples
//!
//! ```bash
//! # Step-level progress
//! RUST_LOG=info cargo run
//!
//! # Every call and status check
//! RUST_LOG=debug cargo run
//!
//! # Only the engine
//! RUST_LOG=lifecycle_framework=debug cargo run
//! ```
//!
//! A Create that waits once for the pool to turn `ACTIVE` looks like:
//!
//! ```text
//! INFO handle{resource_type="CapacityPool" operation=Create}: Recovered step="check-absent" kind=NotFound
//! INFO handle{resource_type="CapacityPool" operation=Create}: Awaiting stabilization step="create-pool" remaining=59
//! INFO handle{resource_type="CapacityPool" operation=Create}: Stabilized step="create-pool"
//! INFO handle{resource_type="CapacityPool" operation=Create}: Operation complete operation=Create
//! ```

/// Installs a compact `tracing-subscriber` filtered by `RUST_LOG`.
///
/// Calling it again is harmless; only the first subscriber is kept.
pub fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .try_init();
}
