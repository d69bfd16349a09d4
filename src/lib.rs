//! # Capacity Lifecycle
//!
//! > **Create, read, update, delete and list capacity pools against an
//! > eventually consistent management API.**
//!
//! This crate assembles one resource type, the capacity pool, on top of the
//! generic engine in [`lifecycle_framework`]. The engine owns classification,
//! stabilization, checkpointing and outcomes; this crate only says which
//! remote calls make up each operation and how models map onto them.
//!
//! ## Module Tour
//!
//! ### 1. The Model ([`model`])
//! [`CapacityPool`](model::CapacityPool) as callers see it. Every field is an
//! `Option`: absent means "not specified" on input and "not reported" on
//! output.
//!
//! ### 2. The Remote API ([`clients`])
//! The [`CapacityApi`](clients::CapacityApi) trait the steps call, plus two
//! implementations for tests and demos:
//! - [`MockCapacityApi`](clients::MockCapacityApi): scripted responses with
//!   `expect_*().return_ok(..)` / `return_err(..)` and `verify()`
//! - [`SandboxCapacityApi`](clients::SandboxCapacityApi): an in-memory
//!   service whose pools settle from `PENDING` to `ACTIVE`
//!
//! ### 3. The Steps ([`pool_resource`])
//! The [`ResourceType`](lifecycle_framework::ResourceType) implementation and
//! one module per operation. Each step is a small struct implementing
//! [`Step`](lifecycle_framework::Step).
//!
//! ### 4. The Host ([`lifecycle`])
//! [`Host`](lifecycle::Host) re-invokes a handler until the operation is done,
//! honoring the suggested delay between invocations.
//!
//! ## Quick Start
//!
//! ```bash
//! # Run the demo against the sandbox API
//! RUST_LOG=info cargo run
//!
//! # Tune the engine
//! LIFECYCLE_CALLBACK_DELAY_SECS=0 LIFECYCLE_STABILIZATION_RETRIES=5 cargo run
//! ```

pub mod clients;
pub mod lifecycle;
pub mod model;
pub mod pool_resource;
