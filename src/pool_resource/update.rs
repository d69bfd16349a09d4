//! Update: only the properties that changed are sent.

use super::translate::{apply_description, pool_arn, pool_name, update_tag_diff};
use super::{read, wait_for_active, PoolApi};
use crate::clients::UpdatePoolInput;
use crate::model::CapacityPool;
use async_trait::async_trait;
use lifecycle_framework::{
    Operation, RemoteError, ResumptionToken, StabilizationResult, Step, StepChain, StepContext,
};

pub fn chain() -> StepChain<CapacityPool> {
    StepChain::new(Operation::Update)
        .then(CheckExists)
        .then(UpdateCapacity)
        .then(PutScaling)
        .then(RemoveTags)
        .then(AddTags)
        .followed_by(read::chain())
}

/// Fails with `NotFound` before anything is modified.
pub struct CheckExists;

#[async_trait]
impl Step<CapacityPool> for CheckExists {
    fn name(&self) -> &'static str {
        "check-exists"
    }

    async fn call(
        &self,
        api: &PoolApi,
        ctx: &mut StepContext<CapacityPool>,
    ) -> Result<(), RemoteError> {
        let name = pool_name(ctx.model())?;
        api.describe_pool(&name).await.map(|_| ())
    }
}

pub struct UpdateCapacity;

#[async_trait]
impl Step<CapacityPool> for UpdateCapacity {
    fn name(&self) -> &'static str {
        "update-capacity"
    }

    fn should_run(&self, ctx: &StepContext<CapacityPool>) -> bool {
        let desired = ctx.model().target_capacity;
        desired.is_some() && desired != ctx.previous().and_then(|p| p.target_capacity)
    }

    async fn call(
        &self,
        api: &PoolApi,
        ctx: &mut StepContext<CapacityPool>,
    ) -> Result<(), RemoteError> {
        let Some(target_capacity) = ctx.model().target_capacity else {
            return Ok(());
        };
        let input = UpdatePoolInput {
            name: pool_name(ctx.model())?,
            target_capacity,
        };
        let description = api.update_pool(input).await?;
        apply_description(&mut ctx.request.desired, &description, &ctx.request.addressing);
        Ok(())
    }

    fn stabilizes(&self) -> bool {
        true
    }

    async fn stabilize(
        &self,
        api: &PoolApi,
        ctx: &mut StepContext<CapacityPool>,
        token: &mut ResumptionToken,
    ) -> Result<StabilizationResult<()>, RemoteError> {
        wait_for_active(api, ctx, token).await
    }
}

/// Removing a scaling configuration is not supported by the API, so only a
/// new or changed configuration is sent.
pub struct PutScaling;

#[async_trait]
impl Step<CapacityPool> for PutScaling {
    fn name(&self) -> &'static str {
        "put-scaling"
    }

    fn should_run(&self, ctx: &StepContext<CapacityPool>) -> bool {
        let desired = ctx.model().scaling;
        desired.is_some() && desired != ctx.previous().and_then(|p| p.scaling)
    }

    async fn call(
        &self,
        api: &PoolApi,
        ctx: &mut StepContext<CapacityPool>,
    ) -> Result<(), RemoteError> {
        let name = pool_name(ctx.model())?;
        match ctx.model().scaling {
            Some(config) => api.put_scaling_config(&name, config).await,
            None => Ok(()),
        }
    }
}

/// Removals go out before additions.
pub struct RemoveTags;

#[async_trait]
impl Step<CapacityPool> for RemoveTags {
    fn name(&self) -> &'static str {
        "remove-tags"
    }

    fn should_run(&self, ctx: &StepContext<CapacityPool>) -> bool {
        update_tag_diff(&ctx.request).is_some_and(|edit| !edit.to_remove.is_empty())
    }

    async fn call(
        &self,
        api: &PoolApi,
        ctx: &mut StepContext<CapacityPool>,
    ) -> Result<(), RemoteError> {
        let Some(edit) = update_tag_diff(&ctx.request) else {
            return Ok(());
        };
        let arn = pool_arn(&ctx.request.addressing, &pool_name(ctx.model())?);
        api.untag_resource(&arn, edit.to_remove.into_iter().collect())
            .await
    }
}

pub struct AddTags;

#[async_trait]
impl Step<CapacityPool> for AddTags {
    fn name(&self) -> &'static str {
        "add-tags"
    }

    fn should_run(&self, ctx: &StepContext<CapacityPool>) -> bool {
        update_tag_diff(&ctx.request).is_some_and(|edit| !edit.to_add.is_empty())
    }

    async fn call(
        &self,
        api: &PoolApi,
        ctx: &mut StepContext<CapacityPool>,
    ) -> Result<(), RemoteError> {
        let Some(edit) = update_tag_diff(&ctx.request) else {
            return Ok(());
        };
        let arn = pool_arn(&ctx.request.addressing, &pool_name(ctx.model())?);
        api.tag_resource(&arn, edit.to_add).await
    }
}
