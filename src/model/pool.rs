use serde::{Deserialize, Serialize};

/// A capacity pool as callers describe it.
///
/// Every field is optional: a Read request may carry only the ARN, a List
/// result only the identity, and a pool without tags has `tags: None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityPool {
    pub name: Option<String>,
    pub arn: Option<String>,
    pub target_capacity: Option<u32>,
    /// Read-only, reported by the remote API (`PENDING`, `ACTIVE`, `FAILED`, ...).
    pub status: Option<String>,
    pub scaling: Option<ScalingConfig>,
    pub tags: Option<Vec<Tag>>,
}

impl CapacityPool {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// A model that carries only the ARN, as hosts send for Read and Delete.
    pub fn from_arn(arn: impl Into<String>) -> Self {
        Self {
            arn: Some(arn.into()),
            ..Default::default()
        }
    }

    pub fn with_target_capacity(mut self, target_capacity: u32) -> Self {
        self.target_capacity = Some(target_capacity);
        self
    }

    pub fn with_scaling(mut self, min_capacity: u32, max_capacity: u32) -> Self {
        self.scaling = Some(ScalingConfig {
            min_capacity,
            max_capacity,
        });
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags
            .get_or_insert_with(Vec::new)
            .push(Tag::new(key, value));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    /// Providers may send a key without a value; such tags are ignored.
    pub value: Option<String>,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Some(value.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalingConfig {
    pub min_capacity: u32,
    pub max_capacity: u32,
}
