//! Read steps. Also appended to Create and Update so they return the
//! pool as the remote API sees it.

use super::translate::{apply_description, pool_arn, pool_name, tag_list};
use super::PoolApi;
use crate::model::CapacityPool;
use async_trait::async_trait;
use lifecycle_framework::{
    classify, ErrorKind, Operation, RemoteError, Step, StepChain, StepContext, TagSet,
};
use std::collections::HashSet;
use tracing::debug;

pub fn chain() -> StepChain<CapacityPool> {
    StepChain::new(Operation::Read)
        .then(DescribePool)
        .then(ReadTags)
        .then(ReadScaling)
}

pub struct DescribePool;

#[async_trait]
impl Step<CapacityPool> for DescribePool {
    fn name(&self) -> &'static str {
        "describe-pool"
    }

    async fn call(
        &self,
        api: &PoolApi,
        ctx: &mut StepContext<CapacityPool>,
    ) -> Result<(), RemoteError> {
        let name = pool_name(ctx.model())?;
        let description = api.describe_pool(&name).await?;
        apply_description(&mut ctx.request.desired, &description, &ctx.request.addressing);
        Ok(())
    }
}

/// Lists every tag page and keeps the user-visible ones.
///
/// Callers without tag permissions still get the pool back, without tags.
pub struct ReadTags;

#[async_trait]
impl Step<CapacityPool> for ReadTags {
    fn name(&self) -> &'static str {
        "read-tags"
    }

    async fn call(
        &self,
        api: &PoolApi,
        ctx: &mut StepContext<CapacityPool>,
    ) -> Result<(), RemoteError> {
        let arn = pool_arn(&ctx.request.addressing, &pool_name(ctx.model())?);
        let mut tags = TagSet::new();
        let mut seen_tokens = HashSet::new();
        let mut next_token = None;
        loop {
            let page = match api.list_tags_for_resource(&arn, next_token).await {
                Ok(page) => page,
                Err(e) if self.markers().is_access_denied(&e) => {
                    debug!(error = %e, "Tags not readable, reporting none");
                    ctx.model_mut().tags = None;
                    return Ok(());
                }
                Err(e) => return Err(e),
            };
            // Later pages win on duplicate keys.
            tags.extend(TagSet::from_entries(
                page.tags.into_iter().map(|tag| (tag.key, tag.value)),
            ));
            match page.next_token {
                None => break,
                Some(token) if !seen_tokens.insert(token.clone()) => {
                    return Err(RemoteError::new(
                        "InternalFailure",
                        format!("Tag listing for {arn} repeated page token {token}"),
                    ));
                }
                Some(token) => next_token = Some(token),
            }
        }
        ctx.model_mut().tags = tag_list(tags.without_system());
        Ok(())
    }
}

/// Scaling configuration is optional: not configured and not readable both
/// read back as absent.
pub struct ReadScaling;

#[async_trait]
impl Step<CapacityPool> for ReadScaling {
    fn name(&self) -> &'static str {
        "read-scaling"
    }

    async fn call(
        &self,
        api: &PoolApi,
        ctx: &mut StepContext<CapacityPool>,
    ) -> Result<(), RemoteError> {
        let name = pool_name(ctx.model())?;
        let markers = self.markers();
        ctx.model_mut().scaling = match api.get_scaling_config(&name).await {
            Ok(config) => Some(config),
            Err(e)
                if markers.is_access_denied(&e)
                    || classify(&e, &markers) == ErrorKind::NotFound =>
            {
                debug!(error = %e, "No scaling configuration");
                None
            }
            Err(e) => return Err(e),
        };
        Ok(())
    }
}
