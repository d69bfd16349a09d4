//! An in-memory [`CapacityApi`] that behaves like the real service closely
//! enough to drive whole operations: pools start `PENDING` and turn `ACTIVE`
//! after a number of status reads, deletes require a prior cancel, tags and
//! pool listings are paginated.

use crate::clients::capacity_api::{
    CapacityApi, CreatePoolInput, ListPoolsInput, ListPoolsOutput, PoolDescription, TagPage,
    UpdatePoolInput,
};
use crate::model::{ScalingConfig, Tag};
use async_trait::async_trait;
use lifecycle_framework::{Arn, RemoteError, TagSet, MAX_LIST_PAGE_SIZE};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

const TAG_PAGE_SIZE: usize = 2;

#[derive(Debug, Clone)]
struct SandboxPool {
    target_capacity: u32,
    status: String,
    /// Status reads left before a `PENDING` pool turns `ACTIVE`.
    settling: u32,
    cancelled: bool,
    tags: TagSet,
    scaling: Option<ScalingConfig>,
}

impl SandboxPool {
    fn describe(&self, name: &str) -> PoolDescription {
        PoolDescription {
            name: name.to_owned(),
            target_capacity: self.target_capacity,
            status: self.status.clone(),
        }
    }
}

pub struct SandboxCapacityApi {
    pools: Mutex<BTreeMap<String, SandboxPool>>,
    settle_after: u32,
    fail_on_create: bool,
}

impl SandboxCapacityApi {
    /// Pools need `settle_after` status reads to turn `ACTIVE`.
    pub fn new(settle_after: u32) -> Self {
        Self {
            pools: Mutex::new(BTreeMap::new()),
            settle_after,
            fail_on_create: false,
        }
    }

    /// New pools end up `FAILED` instead of `ACTIVE`.
    pub fn failing(mut self) -> Self {
        self.fail_on_create = true;
        self
    }

    pub fn pool_count(&self) -> usize {
        self.pools().len()
    }

    /// The tags currently stored for `name`.
    pub fn tags_of(&self, name: &str) -> Option<TagSet> {
        self.pools().get(name).map(|pool| pool.tags.clone())
    }

    fn pools(&self) -> MutexGuard<'_, BTreeMap<String, SandboxPool>> {
        // A panicking test thread must not wedge the others.
        self.pools.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn with_pool<T>(
        &self,
        name: &str,
        f: impl FnOnce(&mut SandboxPool) -> Result<T, RemoteError>,
    ) -> Result<T, RemoteError> {
        let mut pools = self.pools();
        let pool = pools.get_mut(name).ok_or_else(|| not_found(name))?;
        f(pool)
    }

    fn name_from_arn(arn: &str) -> Result<String, RemoteError> {
        arn.parse::<Arn>()
            .map(|arn| arn.name)
            .map_err(|e| RemoteError::new("ValidationException", e.to_string()))
    }
}

fn not_found(name: &str) -> RemoteError {
    RemoteError::new("ResourceNotFoundException", format!("Pool {name} not found"))
}

#[async_trait]
impl CapacityApi for SandboxCapacityApi {
    async fn create_pool(&self, input: CreatePoolInput) -> Result<PoolDescription, RemoteError> {
        let mut pools = self.pools();
        if pools.contains_key(&input.name) {
            return Err(RemoteError::new(
                "ConflictException",
                format!("Pool {} already exists", input.name),
            ));
        }
        let pool = SandboxPool {
            target_capacity: input.target_capacity,
            status: "PENDING".to_owned(),
            settling: self.settle_after,
            cancelled: false,
            tags: input.tags,
            scaling: None,
        };
        let description = pool.describe(&input.name);
        debug!(name = %input.name, "Sandbox pool created");
        pools.insert(input.name, pool);
        Ok(description)
    }

    async fn describe_pool(&self, name: &str) -> Result<PoolDescription, RemoteError> {
        let fail_on_create = self.fail_on_create;
        self.with_pool(name, |pool| {
            if pool.status == "PENDING" {
                if pool.settling == 0 {
                    pool.status = if fail_on_create { "FAILED" } else { "ACTIVE" }.to_owned();
                } else {
                    pool.settling -= 1;
                }
            }
            Ok(pool.describe(name))
        })
    }

    async fn update_pool(&self, input: UpdatePoolInput) -> Result<PoolDescription, RemoteError> {
        let settle_after = self.settle_after;
        self.with_pool(&input.name, |pool| {
            pool.target_capacity = input.target_capacity;
            pool.status = "PENDING".to_owned();
            pool.settling = settle_after;
            Ok(pool.describe(&input.name))
        })
    }

    async fn cancel_pool(&self, name: &str) -> Result<(), RemoteError> {
        self.with_pool(name, |pool| {
            if pool.cancelled {
                return Err(RemoteError::new(
                    "InvalidStateException",
                    format!("Pool {name} is already cancelled"),
                ));
            }
            pool.cancelled = true;
            pool.status = "CANCELLED".to_owned();
            Ok(())
        })
    }

    async fn delete_pool(&self, name: &str) -> Result<(), RemoteError> {
        let mut pools = self.pools();
        match pools.get(name) {
            None => Err(not_found(name)),
            Some(pool) if !pool.cancelled => Err(RemoteError::new(
                "InvalidStateException",
                format!("Pool {name} must be cancelled before it is deleted"),
            )),
            Some(_) => {
                pools.remove(name);
                Ok(())
            }
        }
    }

    async fn list_pools(&self, input: ListPoolsInput) -> Result<ListPoolsOutput, RemoteError> {
        if input.max_results == 0 || input.max_results > MAX_LIST_PAGE_SIZE {
            return Err(RemoteError::new(
                "ValidationException",
                format!("maxResults must be between 1 and {MAX_LIST_PAGE_SIZE}"),
            ));
        }
        let pools = self.pools();
        let mut names: Vec<String> = pools
            .keys()
            .filter(|name| input.next_token.as_deref().map_or(true, |after| name.as_str() > after))
            .take(input.max_results as usize + 1)
            .cloned()
            .collect();

        let next_token = if names.len() > input.max_results as usize {
            names.pop();
            names.last().cloned()
        } else {
            None
        };
        Ok(ListPoolsOutput { names, next_token })
    }

    async fn tag_resource(&self, arn: &str, tags: TagSet) -> Result<(), RemoteError> {
        let name = Self::name_from_arn(arn)?;
        self.with_pool(&name, |pool| {
            pool.tags.extend(tags);
            Ok(())
        })
    }

    async fn untag_resource(&self, arn: &str, keys: Vec<String>) -> Result<(), RemoteError> {
        let name = Self::name_from_arn(arn)?;
        self.with_pool(&name, |pool| {
            for key in &keys {
                pool.tags.remove(key);
            }
            Ok(())
        })
    }

    async fn list_tags_for_resource(
        &self,
        arn: &str,
        next_token: Option<String>,
    ) -> Result<TagPage, RemoteError> {
        let name = Self::name_from_arn(arn)?;
        let offset = match next_token {
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| RemoteError::new("ValidationException", "invalid next token"))?,
            None => 0,
        };
        self.with_pool(&name, |pool| {
            let tags: Vec<Tag> = pool
                .tags
                .iter()
                .skip(offset)
                .take(TAG_PAGE_SIZE)
                .map(|(key, value)| Tag::new(key, value))
                .collect();
            let consumed = offset + tags.len();
            let next_token = (consumed < pool.tags.len()).then(|| consumed.to_string());
            Ok(TagPage { tags, next_token })
        })
    }

    async fn get_scaling_config(&self, name: &str) -> Result<ScalingConfig, RemoteError> {
        self.with_pool(name, |pool| {
            pool.scaling.ok_or_else(|| {
                RemoteError::new(
                    "ResourceNotFoundException",
                    format!("No scaling configuration for pool {name}"),
                )
            })
        })
    }

    async fn put_scaling_config(&self, name: &str, config: ScalingConfig) -> Result<(), RemoteError> {
        if config.min_capacity > config.max_capacity {
            return Err(RemoteError::new(
                "ValidationException",
                "minCapacity must not exceed maxCapacity",
            ));
        }
        self.with_pool(name, |pool| {
            pool.scaling = Some(config);
            Ok(())
        })
    }
}
