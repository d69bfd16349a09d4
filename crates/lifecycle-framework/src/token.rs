//! # Resumption Token
//!
//! The cursor a long-running operation hands back to its caller between
//! invocations. It is plain data so the host can persist it (see
//! [`ResumptionToken::to_json`]); the engine never keeps a copy.

use crate::request::Operation;
use serde::{Deserialize, Serialize};

/// Where inside a step the operation stopped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepPhase {
    /// The step's remote call has not been issued yet.
    #[default]
    Call,
    /// The call succeeded; only status checks remain.
    Stabilize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumptionToken {
    pub operation: Operation,
    /// Index of the step to resume at.
    pub step: usize,
    pub phase: StepPhase,
    pub stabilization_retries_remaining: u32,
}

impl ResumptionToken {
    /// A fresh token for the start of `operation`.
    pub fn new(operation: Operation, stabilization_retries: u32) -> Self {
        Self {
            operation,
            step: 0,
            phase: StepPhase::Call,
            stabilization_retries_remaining: stabilization_retries,
        }
    }

    /// Moves past the current step.
    pub(crate) fn advance(&mut self) {
        self.step += 1;
        self.phase = StepPhase::Call;
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn survives_a_round_trip_through_the_host() {
        let mut token = ResumptionToken::new(Operation::Create, 5);
        token.advance();
        token.phase = StepPhase::Stabilize;
        token.stabilization_retries_remaining = 3;

        let json = token.to_json().unwrap();
        assert!(json.contains("\"Stabilize\""));
        assert_eq!(ResumptionToken::from_json(&json).unwrap(), token);
    }

    #[test]
    fn advancing_resets_the_phase() {
        let mut token = ResumptionToken::new(Operation::Update, 1);
        token.phase = StepPhase::Stabilize;
        token.advance();
        assert_eq!(token.step, 1);
        assert_eq!(token.phase, StepPhase::Call);
    }
}
