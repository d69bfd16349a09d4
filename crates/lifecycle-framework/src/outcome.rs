//! # Operation Outcomes
//!
//! Every handler invocation produces exactly one [`OperationOutcome`].

use crate::error::ErrorKind;
use crate::token::ResumptionToken;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The payload of a successful operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Completed<M> {
    /// Create, Read and Update return the final model.
    Model(M),
    /// Delete returns no model.
    Deleted,
    /// List returns one page and the cursor for the next.
    Page {
        models: Vec<M>,
        next_token: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OperationOutcome<M> {
    /// Not finished; re-invoke with `token` after `delay`.
    InProgress {
        token: ResumptionToken,
        delay: Duration,
        model: M,
    },
    Success(Completed<M>),
    /// `message` is the remote message verbatim.
    Failed { kind: ErrorKind, message: String },
}

impl<M> OperationOutcome<M> {
    pub fn failed(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::Failed {
            kind,
            message: message.into(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::InProgress { .. })
    }

    pub fn token(&self) -> Option<&ResumptionToken> {
        match self {
            Self::InProgress { token, .. } => Some(token),
            _ => None,
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Failed { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// The final model of a successful Create, Read or Update.
    pub fn into_model(self) -> Option<M> {
        match self {
            Self::Success(Completed::Model(model)) => Some(model),
            _ => None,
        }
    }
}
