//! # Handler Requests
//!
//! This module defines what the host passes into a handler invocation.
//!
//! # The Lifecycle Pattern
//! Every resource type supports the same five operations. Instead of a
//! different entry point per operation, the host names the [`Operation`] and
//! hands over one [`HandlerRequest`]:
//!
//! - **Create**: `desired` is the model to create.
//! - **Read**: `desired` carries the identity to read.
//! - **Update**: `desired` is the new state, `previous` the last applied one.
//! - **Delete**: `desired` carries the identity to delete.
//! - **List**: `desired` is ignored; `next_token` selects the page.

use crate::identity::Addressing;
use crate::tags::TagSet;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
    List,
}

impl Operation {
    /// Whether the desired model must resolve to an identity before any call.
    /// Only List works without one.
    pub fn requires_identity(self) -> bool {
        !matches!(self, Self::List)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Create => "Create",
            Self::Read => "Read",
            Self::Update => "Update",
            Self::Delete => "Delete",
            Self::List => "List",
        };
        f.write_str(name)
    }
}

/// Everything the host supplies for one invocation.
#[derive(Debug, Clone)]
pub struct HandlerRequest<M> {
    pub desired: M,
    /// Only present for Update.
    pub previous: Option<M>,
    pub stack_tags: TagSet,
    pub previous_stack_tags: TagSet,
    pub system_tags: TagSet,
    pub addressing: Addressing,
    /// Page cursor for List.
    pub next_token: Option<String>,
}

impl<M> HandlerRequest<M> {
    pub fn new(desired: M, addressing: Addressing) -> Self {
        Self {
            desired,
            previous: None,
            stack_tags: TagSet::new(),
            previous_stack_tags: TagSet::new(),
            system_tags: TagSet::new(),
            addressing,
            next_token: None,
        }
    }

    pub fn with_previous(mut self, previous: M) -> Self {
        self.previous = Some(previous);
        self
    }

    pub fn with_stack_tags(mut self, stack_tags: TagSet) -> Self {
        self.stack_tags = stack_tags;
        self
    }

    pub fn with_previous_stack_tags(mut self, previous_stack_tags: TagSet) -> Self {
        self.previous_stack_tags = previous_stack_tags;
        self
    }

    pub fn with_system_tags(mut self, system_tags: TagSet) -> Self {
        self.system_tags = system_tags;
        self
    }

    pub fn with_next_token(mut self, next_token: impl Into<String>) -> Self {
        self.next_token = Some(next_token.into());
        self
    }
}
