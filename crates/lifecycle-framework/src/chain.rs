//! # Step Chain
//!
//! A [`StepChain`] is an ordered list of [`Step`]s that together implement one
//! operation. [`StepChain::execute`] walks the list from the position recorded
//! in the resumption token, short-circuits on the first unrecoverable failure
//! and returns after at most one status check.
//!
//! ## Per-invocation state machine
//!
//! ```text
//! Running(i) ──call ok, no stabilize──────▶ Running(i + 1)
//! Running(i) ──call ok, stabilize─────────▶ Stabilize(i)
//! Running(i) ──error, recover=Continue────▶ Running(i + 1)
//! Running(i) ──error, recover=Fail────────▶ Failed
//! Stabilize(i) ──Stable───────────────────▶ Running(i + 1)
//! Stabilize(i) ──Transient────────────────▶ InProgress (resume at Stabilize(i))
//! Stabilize(i) ──Fatal────────────────────▶ Failed(NotStabilized)
//! Running(len) ───────────────────────────▶ Success
//! ```
//!
//! The token's `step` and `phase` are the only thing preventing a mutating
//! call from running twice across invocations: once a step has moved to
//! `Stabilize`, its call is never issued again.

use crate::classify::{classify, ErrorMarkers};
use crate::error::{EngineError, ErrorKind, RemoteError};
use crate::outcome::{Completed, OperationOutcome};
use crate::request::{HandlerRequest, Operation};
use crate::resource::ResourceType;
use crate::stabilize::StabilizationResult;
use crate::token::{ResumptionToken, StepPhase};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, warn};

/// What to do after a step's call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Treat the failure as progress and move to the next step.
    Continue,
    Fail,
}

/// One page of a List operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<M> {
    pub models: Vec<M>,
    pub next_token: Option<String>,
}

/// The working state steps read from and write to.
#[derive(Debug, Clone)]
pub struct StepContext<M> {
    pub request: HandlerRequest<M>,
    /// Filled in by List steps.
    pub page: Option<Page<M>>,
    pub list_page_size: u32,
}

impl<M> StepContext<M> {
    pub fn new(request: HandlerRequest<M>, list_page_size: u32) -> Self {
        Self {
            request,
            page: None,
            list_page_size,
        }
    }

    pub fn model(&self) -> &M {
        &self.request.desired
    }

    pub fn model_mut(&mut self) -> &mut M {
        &mut self.request.desired
    }

    pub fn previous(&self) -> Option<&M> {
        self.request.previous.as_ref()
    }
}

/// One remote call plus its error policy and optional stabilization.
#[async_trait]
pub trait Step<R: ResourceType>: Send + Sync {
    fn name(&self) -> &'static str;

    /// Conditional steps return false to be skipped without a remote call.
    fn should_run(&self, _ctx: &StepContext<R::Model>) -> bool {
        true
    }

    /// Builds the request from the model, invokes the remote API and folds
    /// the response back into the model.
    async fn call(&self, api: &R::Api, ctx: &mut StepContext<R::Model>) -> Result<(), RemoteError>;

    fn markers(&self) -> ErrorMarkers {
        R::markers()
    }

    fn recover(&self, _kind: ErrorKind, _error: &RemoteError) -> Recovery {
        Recovery::Fail
    }

    fn stabilizes(&self) -> bool {
        false
    }

    /// One status check. Only invoked when [`Step::stabilizes`] is true.
    async fn stabilize(
        &self,
        _api: &R::Api,
        _ctx: &mut StepContext<R::Model>,
        _token: &mut ResumptionToken,
    ) -> Result<StabilizationResult<()>, RemoteError> {
        Ok(StabilizationResult::Stable(()))
    }
}

pub struct StepChain<R: ResourceType> {
    operation: Operation,
    steps: Vec<Box<dyn Step<R>>>,
}

impl<R: ResourceType> StepChain<R> {
    pub fn new(operation: Operation) -> Self {
        Self {
            operation,
            steps: Vec::new(),
        }
    }

    pub fn then(mut self, step: impl Step<R> + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Appends all steps of `other`, e.g. the Read steps at the end of Create.
    pub fn followed_by(mut self, other: StepChain<R>) -> Self {
        self.steps.extend(other.steps);
        self
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Rejects tokens minted for another operation or another chain shape.
    pub fn check_token(&self, token: &ResumptionToken) -> Result<(), EngineError> {
        if token.operation != self.operation {
            return Err(EngineError::TokenOperationMismatch {
                expected: self.operation.to_string(),
                found: token.operation.to_string(),
            });
        }
        if token.step > self.steps.len() {
            return Err(EngineError::TokenOutOfRange {
                step: token.step,
                len: self.steps.len(),
            });
        }
        Ok(())
    }

    /// Runs the chain from the token's position until it finishes, fails or
    /// has to wait for the remote resource.
    pub async fn execute(
        &self,
        api: &R::Api,
        mut ctx: StepContext<R::Model>,
        mut token: ResumptionToken,
        delay: Duration,
    ) -> OperationOutcome<R::Model> {
        let resource_type = R::TYPE_NAME;

        while let Some(step) = self.steps.get(token.step) {
            let name = step.name();

            if token.phase == StepPhase::Call {
                if !step.should_run(&ctx) {
                    debug!(resource_type, step = name, "Skipped");
                    token.advance();
                    continue;
                }

                debug!(resource_type, step = name, "Call");
                if let Err(error) = step.call(api, &mut ctx).await {
                    let kind = classify(&error, &step.markers());
                    match step.recover(kind, &error) {
                        Recovery::Continue => {
                            info!(resource_type, step = name, %kind, "Recovered");
                            token.advance();
                            continue;
                        }
                        Recovery::Fail => {
                            warn!(resource_type, step = name, %kind, error = %error, "Step failed");
                            return OperationOutcome::failed(kind, error.message);
                        }
                    }
                }

                if !step.stabilizes() {
                    info!(resource_type, step = name, "Step ok");
                    token.advance();
                    continue;
                }
                token.phase = StepPhase::Stabilize;
            }

            match step.stabilize(api, &mut ctx, &mut token).await {
                Ok(StabilizationResult::Stable(())) => {
                    info!(resource_type, step = name, "Stabilized");
                    token.advance();
                }
                Ok(StabilizationResult::Transient) => {
                    info!(
                        resource_type,
                        step = name,
                        remaining = token.stabilization_retries_remaining,
                        "Awaiting stabilization"
                    );
                    return OperationOutcome::InProgress {
                        token,
                        delay,
                        model: ctx.request.desired,
                    };
                }
                Ok(StabilizationResult::Fatal(reason)) => {
                    warn!(resource_type, step = name, %reason, "Not stabilized");
                    return OperationOutcome::failed(ErrorKind::NotStabilized, reason.to_string());
                }
                Err(error) => {
                    let kind = classify(&error, &step.markers());
                    warn!(resource_type, step = name, %kind, error = %error, "Status check failed");
                    return OperationOutcome::failed(kind, error.message);
                }
            }
        }

        info!(resource_type, operation = %self.operation, "Operation complete");
        let completed = match self.operation {
            Operation::Delete => Completed::Deleted,
            Operation::List => {
                let page = ctx.page.unwrap_or(Page {
                    models: Vec::new(),
                    next_token: None,
                });
                Completed::Page {
                    models: page.models,
                    next_token: page.next_token,
                }
            }
            Operation::Create | Operation::Read | Operation::Update => {
                Completed::Model(ctx.request.desired)
            }
        };
        OperationOutcome::Success(completed)
    }
}
