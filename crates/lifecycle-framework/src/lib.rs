//! # Lifecycle Framework
//!
//! This crate provides the building blocks for driving cloud resources through
//! their lifecycle (create, read, update, delete, list) against a remote
//! management API that is eventually consistent, rate limited and slow.
//!
//! ## Why re-entrant handlers?
//!
//! A create call returns long before the resource is usable. Instead of
//! blocking until it is, a handler does as much as it can, then hands the
//! caller a [`ResumptionToken`] and a suggested delay. The caller (the "host")
//! re-invokes the handler with the token and the handler picks up exactly where
//! it stopped. No thread, task or in-memory state survives between invocations.
//!
//! ## Architecture Overview
//!
//! The crate separates concerns into four layers:
//!
//! 1. **Classification** ([`classify`]) - every remote failure becomes one
//!    [`ErrorKind`] before any decision is made
//! 2. **Reconciliation primitives** ([`tags`], [`stabilize`]) - tag diffs and
//!    single-shot status checks with a retry budget
//! 3. **Orchestration** ([`StepChain`]) - an ordered list of [`Step`]s walked
//!    from the token's position
//! 4. **Entry point** ([`LifecycleHandler`]) - identity resolution, token
//!    validation and chain execution for one [`ResourceType`]
//!
//! You describe a resource type **once** (its model, its API, its chains) and
//! the framework handles checkpointing, error policy and outcomes.
//!
//! ## Core Abstractions
//!
//! ### [`ResourceType`]
//! The trait a managed resource implements:
//!
//! ```rust,ignore
//! impl ResourceType for CapacityPool {
//!     type Model = Self;
//!     type Api = dyn CapacityApi;
//!     const TYPE_NAME: &'static str = "CapacityPool";
//!
//!     fn resolve_identity(model: &mut CapacityPool, addressing: &Addressing) -> Result<(), IdentityError> { ... }
//!     fn chain(operation: Operation) -> StepChain<Self> { ... }
//! }
//! ```
//!
//! ### [`Step`]
//! One remote call plus its error markers, its recovery policy and an optional
//! stabilization check.
//!
//! ### [`OperationOutcome`]
//! Exactly one of `InProgress`, `Success` or `Failed` per invocation.
//!
//! ## Observability
//!
//! Every decision is logged through `tracing`; see the [`observability`]
//! module for the events and [`setup_tracing`] for the subscriber.

pub mod chain;
pub mod classify;
pub mod config;
pub mod error;
pub mod handler;
pub mod identity;
pub mod observability;
pub mod outcome;
pub mod request;
pub mod resource;
pub mod stabilize;
pub mod tags;
pub mod token;

pub use chain::{Page, Recovery, Step, StepChain, StepContext};
pub use classify::{classify, ErrorMarkers};
pub use config::{EngineConfig, MAX_LIST_PAGE_SIZE};
pub use error::{EngineError, ErrorKind, IdentityError, NotStabilized, RemoteError};
pub use handler::LifecycleHandler;
pub use identity::{resolve_name, Addressing, Arn, ArnScope};
pub use outcome::{Completed, OperationOutcome};
pub use request::{HandlerRequest, Operation};
pub use resource::ResourceType;
pub use stabilize::{stabilize, StabilizationCriteria, StabilizationResult, StatusCriteria};
pub use tags::{diff, needs_reconciliation, TagDiff, TagLayers, TagSet, SYSTEM_TAG_PREFIX};
pub use token::{ResumptionToken, StepPhase};
pub use observability::setup_tracing;
