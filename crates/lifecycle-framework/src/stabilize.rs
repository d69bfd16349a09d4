//! # Stabilization Poller
//!
//! After a mutating call the remote resource keeps transitioning for a while.
//! The host re-invokes the handler instead of letting it sleep, so polling is
//! "check once, report back, resume later": [`stabilize`] performs exactly
//! one status read per call and leaves scheduling to the caller.

use crate::error::{NotStabilized, RemoteError};
use crate::token::ResumptionToken;
use std::future::Future;
use tracing::debug;

/// Result of one status check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StabilizationResult<S> {
    Stable(S),
    /// Still transitioning; the token's budget was decremented.
    Transient,
    Fatal(NotStabilized),
}

impl<S> StabilizationResult<S> {
    pub fn map<U>(self, f: impl FnOnce(S) -> U) -> StabilizationResult<U> {
        match self {
            Self::Stable(status) => StabilizationResult::Stable(f(status)),
            Self::Transient => StabilizationResult::Transient,
            Self::Fatal(reason) => StabilizationResult::Fatal(reason),
        }
    }
}

/// Terminality predicates over a status value.
pub trait StabilizationCriteria<S> {
    fn is_terminal(&self, status: &S) -> bool;
    fn is_failure_terminal(&self, status: &S) -> bool;
}

/// Criteria expressed as lists of status strings.
#[derive(Debug, Clone, Copy)]
pub struct StatusCriteria {
    pub ready: &'static [&'static str],
    pub failed: &'static [&'static str],
}

impl<S: AsRef<str>> StabilizationCriteria<S> for StatusCriteria {
    fn is_terminal(&self, status: &S) -> bool {
        self.ready.contains(&status.as_ref())
    }

    fn is_failure_terminal(&self, status: &S) -> bool {
        self.failed.contains(&status.as_ref())
    }
}

/// Reads the status once and decides.
///
/// A failure state wins over the remaining budget. A read error is returned
/// as-is for the caller to classify.
pub async fn stabilize<S, F, Fut, C>(
    read: F,
    criteria: &C,
    token: &mut ResumptionToken,
) -> Result<StabilizationResult<S>, RemoteError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<S, RemoteError>>,
    C: StabilizationCriteria<S>,
    S: std::fmt::Display,
{
    let status = read().await?;
    debug!(%status, remaining = token.stabilization_retries_remaining, "Status check");

    if criteria.is_failure_terminal(&status) {
        return Ok(StabilizationResult::Fatal(NotStabilized::FailedState {
            status: status.to_string(),
        }));
    }
    if criteria.is_terminal(&status) {
        return Ok(StabilizationResult::Stable(status));
    }
    match token.stabilization_retries_remaining.checked_sub(1) {
        Some(remaining) => {
            token.stabilization_retries_remaining = remaining;
            Ok(StabilizationResult::Transient)
        }
        None => Ok(StabilizationResult::Fatal(NotStabilized::Timeout)),
    }
}
