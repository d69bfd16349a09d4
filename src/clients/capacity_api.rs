use crate::model::{ScalingConfig, Tag};
use async_trait::async_trait;
use lifecycle_framework::{RemoteError, TagSet};
use serde::{Deserialize, Serialize};

/// Remote state of one pool as the management API reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolDescription {
    pub name: String,
    pub target_capacity: u32,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePoolInput {
    pub name: String,
    pub target_capacity: u32,
    pub tags: TagSet,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatePoolInput {
    pub name: String,
    pub target_capacity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListPoolsInput {
    /// At most [`MAX_LIST_PAGE_SIZE`](lifecycle_framework::MAX_LIST_PAGE_SIZE).
    pub max_results: u32,
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListPoolsOutput {
    pub names: Vec<String>,
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagPage {
    pub tags: Vec<Tag>,
    pub next_token: Option<String>,
}

/// The capacity management API the pool handlers consume.
///
/// Transport, credentials and the wire format live behind this trait; the
/// handlers only see typed inputs, typed outputs and [`RemoteError`].
#[async_trait]
pub trait CapacityApi: Send + Sync {
    async fn create_pool(&self, input: CreatePoolInput) -> Result<PoolDescription, RemoteError>;

    async fn describe_pool(&self, name: &str) -> Result<PoolDescription, RemoteError>;

    async fn update_pool(&self, input: UpdatePoolInput) -> Result<PoolDescription, RemoteError>;

    /// Stops the pool from serving; required before delete.
    async fn cancel_pool(&self, name: &str) -> Result<(), RemoteError>;

    async fn delete_pool(&self, name: &str) -> Result<(), RemoteError>;

    async fn list_pools(&self, input: ListPoolsInput) -> Result<ListPoolsOutput, RemoteError>;

    async fn tag_resource(&self, arn: &str, tags: TagSet) -> Result<(), RemoteError>;

    async fn untag_resource(&self, arn: &str, keys: Vec<String>) -> Result<(), RemoteError>;

    async fn list_tags_for_resource(
        &self,
        arn: &str,
        next_token: Option<String>,
    ) -> Result<TagPage, RemoteError>;

    async fn get_scaling_config(&self, name: &str) -> Result<ScalingConfig, RemoteError>;

    async fn put_scaling_config(&self, name: &str, config: ScalingConfig) -> Result<(), RemoteError>;
}
