use lifecycle_framework::{
    Completed, EngineConfig, ErrorKind, HandlerRequest, LifecycleHandler, Operation,
    OperationOutcome, ResourceType, ResumptionToken,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors surfaced by the [`Host`] driver.
#[derive(Debug, Error, PartialEq)]
pub enum HostError {
    /// The operation reached a terminal failure.
    #[error("{operation} failed ({kind}): {message}")]
    Failed {
        operation: Operation,
        kind: ErrorKind,
        message: String,
    },

    /// The operation was still in progress after the allowed invocations.
    #[error("{operation} still in progress after {limit} invocations")]
    InvocationLimit { operation: Operation, limit: usize },

    /// The resumption token could not be persisted or restored.
    #[error("resumption token: {0}")]
    Token(String),
}

impl HostError {
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Failed { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// The reference scheduler that drives a handler to a terminal outcome.
///
/// `Host` is responsible for:
/// - **Re-invocation**: Calling the handler again with the token it returned
/// - **Pacing**: Sleeping for the delay each in-progress outcome suggests
/// - **Persistence**: Round-tripping the token through JSON between
///   invocations, as a host that stores it externally would
/// - **Bounding**: Giving up after `max_invocations`
///
/// # Example
///
/// ```ignore
/// let host = Host::<CapacityPool>::new(api, EngineConfig::from_env());
///
/// let created = host.run(Operation::Create, request).await?;
/// ```
pub struct Host<R: ResourceType> {
    handler: LifecycleHandler<R>,
    max_invocations: usize,
}

impl<R: ResourceType> Host<R> {
    pub const DEFAULT_MAX_INVOCATIONS: usize = 100;

    pub fn new(api: Arc<R::Api>, config: EngineConfig) -> Self {
        Self {
            handler: LifecycleHandler::new(api, config),
            max_invocations: Self::DEFAULT_MAX_INVOCATIONS,
        }
    }

    pub fn with_max_invocations(mut self, max_invocations: usize) -> Self {
        self.max_invocations = max_invocations;
        self
    }

    pub fn handler(&self) -> &LifecycleHandler<R> {
        &self.handler
    }

    /// Invokes the handler until the operation succeeds or fails.
    pub async fn run(
        &self,
        operation: Operation,
        request: HandlerRequest<R::Model>,
    ) -> Result<Completed<R::Model>, HostError> {
        let mut stored: Option<String> = None;

        for invocation in 1..=self.max_invocations {
            let token = stored.as_deref().map(restore).transpose()?;
            debug!(%operation, invocation, "Invoking handler");

            match self.handler.handle(operation, request.clone(), token).await {
                OperationOutcome::InProgress { token, delay, .. } => {
                    stored = Some(persist(&token)?);
                    debug!(%operation, ?delay, "Operation in progress");
                    tokio::time::sleep(delay).await;
                }
                OperationOutcome::Success(completed) => {
                    info!(%operation, invocations = invocation, "Operation succeeded");
                    return Ok(completed);
                }
                OperationOutcome::Failed { kind, message } => {
                    warn!(%operation, %kind, %message, "Operation failed");
                    return Err(HostError::Failed {
                        operation,
                        kind,
                        message,
                    });
                }
            }
        }

        Err(HostError::InvocationLimit {
            operation,
            limit: self.max_invocations,
        })
    }
}

fn persist(token: &ResumptionToken) -> Result<String, HostError> {
    token.to_json().map_err(|e| HostError::Token(e.to_string()))
}

fn restore(json: &str) -> Result<ResumptionToken, HostError> {
    ResumptionToken::from_json(json).map_err(|e| HostError::Token(e.to_string()))
}
