//! # Engine Errors
//!
//! This module defines the error types shared by every part of the engine.
//! Remote failures arrive as [`RemoteError`], are classified into an
//! [`ErrorKind`], and only the kind is used for control-flow decisions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed taxonomy every remote failure is classified into.
///
/// `NotStabilized` is never produced by the classifier; it only comes out of
/// the stabilization path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    InvalidArgument,
    Throttled,
    GeneralFailure,
    NotStabilized,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotFound => "NotFound",
            Self::AlreadyExists => "AlreadyExists",
            Self::InvalidArgument => "InvalidArgument",
            Self::Throttled => "Throttled",
            Self::GeneralFailure => "GeneralFailure",
            Self::NotStabilized => "NotStabilized",
        };
        f.write_str(name)
    }
}

/// A failure returned by a remote API call.
///
/// The message is kept verbatim so it can be surfaced to the caller
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct RemoteError {
    /// Provider error code (e.g. `ResourceNotFoundException`), when one is sent.
    pub code: Option<String>,
    /// HTTP status, when the transport exposes it.
    pub status: Option<u16>,
    pub message: String,
}

impl RemoteError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            status: None,
            message: message.into(),
        }
    }

    /// An error carrying only a message, as some providers send.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            code: None,
            status: None,
            message: message.into(),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }
}

/// Why a resource did not reach a good terminal state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum NotStabilized {
    /// The remote side declared a permanent failure.
    #[error("resource reached failure state {status}")]
    FailedState { status: String },

    /// The retry budget ran out while the resource was still transitioning.
    #[error("resource did not stabilize in time")]
    Timeout,
}

/// Failures resolving a resource's identity before any remote call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("malformed ARN: {0}")]
    MalformedArn(String),
    #[error("model has neither a name nor an ARN")]
    Missing,
    #[error("name {name} does not match ARN {arn}")]
    Mismatch { name: String, arn: String },
    #[error("ARN {arn} is not under {expected}")]
    ForeignArn { arn: String, expected: String },
}

/// Errors raised by the engine itself rather than by the remote API.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("resumption token belongs to {found} but {expected} was invoked")]
    TokenOperationMismatch { expected: String, found: String },
    #[error("resumption token points at step {step} but the chain has {len} steps")]
    TokenOutOfRange { step: usize, len: usize },
    #[error(transparent)]
    Identity(#[from] IdentityError),
}

impl EngineError {
    /// Engine errors always stem from a malformed invocation.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidArgument
    }
}
