//! # ResourceType Trait
//!
//! The `ResourceType` trait is the contract every managed resource type
//! implements to be driven by the generic [`LifecycleHandler`](crate::LifecycleHandler).
//! A resource type contributes its model, the remote API it talks to, its
//! identity rules and one step chain per operation. Everything else
//! (classification, stabilization, checkpointing, outcomes) is shared.
//!
//! # Architecture Note
//! The per-resource code is data: a list of steps with their own request
//! building, error markers and status predicates. The engine that walks the
//! list is written once, so adding a resource type never means copying the
//! retry/stabilize/checkpoint plumbing.

use crate::chain::StepChain;
use crate::classify::ErrorMarkers;
use crate::error::IdentityError;
use crate::identity::Addressing;
use crate::request::Operation;
use std::fmt::Debug;

pub trait ResourceType: Send + Sync + Sized + 'static {
    /// The caller-visible description of one resource instance.
    type Model: Clone + Debug + Send + Sync + 'static;

    /// The remote API client the steps call. Usually a trait object.
    type Api: ?Sized + Send + Sync + 'static;

    /// Short name used in logs (e.g. `CapacityPool`).
    const TYPE_NAME: &'static str;

    /// Default error markers for this resource's operations. Steps may
    /// override them per call.
    fn markers() -> ErrorMarkers {
        ErrorMarkers::standard()
    }

    /// Makes the model's identity unambiguous before any remote call,
    /// deriving the name from a long-form identifier when needed.
    fn resolve_identity(
        model: &mut Self::Model,
        addressing: &Addressing,
    ) -> Result<(), IdentityError>;

    /// The ordered steps that implement `operation`.
    fn chain(operation: Operation) -> StepChain<Self>;
}
