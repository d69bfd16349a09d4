//! # Lifecycle Handler
//!
//! [`LifecycleHandler`] is the entry point the host calls. It is generic over
//! a [`ResourceType`] and holds no state between invocations besides the API
//! client and configuration: everything that must survive an invocation is in
//! the [`ResumptionToken`] it hands back.

use crate::chain::StepContext;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::outcome::OperationOutcome;
use crate::request::{HandlerRequest, Operation};
use crate::resource::ResourceType;
use crate::token::ResumptionToken;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Drives one resource type's step chains.
///
/// # Usage Pattern
///
/// ```rust,ignore
/// let handler = LifecycleHandler::<CapacityPool>::new(api, EngineConfig::from_env());
///
/// let mut token = None;
/// loop {
///     match handler.handle(Operation::Create, request.clone(), token).await {
///         OperationOutcome::InProgress { token: next, delay, .. } => {
///             tokio::time::sleep(delay).await;
///             token = Some(next);
///         }
///         done => break done,
///     }
/// }
/// ```
///
/// # Invocation Steps
///
/// 1. For every operation but List, resolves the model's identity (and the
///    previous model's, when present) before any remote call.
/// 2. Builds the operation's chain from [`ResourceType::chain`].
/// 3. Starts a fresh token, or validates the one passed in.
/// 4. Executes the chain from the token's position.
pub struct LifecycleHandler<R: ResourceType> {
    api: Arc<R::Api>,
    config: EngineConfig,
    _resource: PhantomData<fn() -> R>,
}

impl<R: ResourceType> Clone for LifecycleHandler<R> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            config: self.config.clone(),
            _resource: PhantomData,
        }
    }
}

impl<R: ResourceType> LifecycleHandler<R> {
    pub fn new(api: Arc<R::Api>, config: EngineConfig) -> Self {
        Self {
            api,
            config: config.normalized(),
            _resource: PhantomData,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[instrument(skip_all, fields(resource_type = R::TYPE_NAME, %operation))]
    pub async fn handle(
        &self,
        operation: Operation,
        request: HandlerRequest<R::Model>,
        token: Option<ResumptionToken>,
    ) -> OperationOutcome<R::Model> {
        match self.prepare(operation, request, token) {
            Ok((ctx, token)) => {
                let chain = R::chain(operation);
                debug!(step = token.step, phase = ?token.phase, "Resuming");
                chain
                    .execute(self.api.as_ref(), ctx, token, self.config.callback_delay)
                    .await
            }
            Err(e) => {
                warn!(error = %e, "Rejected invocation");
                OperationOutcome::failed(e.kind(), e.to_string())
            }
        }
    }

    fn prepare(
        &self,
        operation: Operation,
        mut request: HandlerRequest<R::Model>,
        token: Option<ResumptionToken>,
    ) -> Result<(StepContext<R::Model>, ResumptionToken), EngineError> {
        if operation.requires_identity() {
            R::resolve_identity(&mut request.desired, &request.addressing)?;
            if let Some(previous) = request.previous.as_mut() {
                R::resolve_identity(previous, &request.addressing)?;
            }
        }

        let token = match token {
            Some(token) => {
                R::chain(operation).check_token(&token)?;
                token
            }
            None => ResumptionToken::new(operation, self.config.stabilization_retries),
        };

        Ok((StepContext::new(request, self.config.list_page_size), token))
    }

    pub async fn create(
        &self,
        request: HandlerRequest<R::Model>,
        token: Option<ResumptionToken>,
    ) -> OperationOutcome<R::Model> {
        self.handle(Operation::Create, request, token).await
    }

    pub async fn read(&self, request: HandlerRequest<R::Model>) -> OperationOutcome<R::Model> {
        self.handle(Operation::Read, request, None).await
    }

    pub async fn update(
        &self,
        request: HandlerRequest<R::Model>,
        token: Option<ResumptionToken>,
    ) -> OperationOutcome<R::Model> {
        self.handle(Operation::Update, request, token).await
    }

    pub async fn delete(
        &self,
        request: HandlerRequest<R::Model>,
        token: Option<ResumptionToken>,
    ) -> OperationOutcome<R::Model> {
        self.handle(Operation::Delete, request, token).await
    }

    pub async fn list(&self, request: HandlerRequest<R::Model>) -> OperationOutcome<R::Model> {
        self.handle(Operation::List, request, None).await
    }
}
