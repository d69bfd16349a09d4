//! Create: refuse existing pools, create, wait for `ACTIVE`, configure
//! scaling, then read back.

use super::translate::{apply_description, create_tags, pool_name};
use super::{read, wait_for_active, PoolApi};
use crate::clients::CreatePoolInput;
use crate::model::CapacityPool;
use async_trait::async_trait;
use lifecycle_framework::{
    ErrorKind, Operation, Recovery, RemoteError, ResumptionToken, StabilizationResult, Step,
    StepChain, StepContext,
};

pub fn chain() -> StepChain<CapacityPool> {
    StepChain::new(Operation::Create)
        .then(CheckAbsent)
        .then(CreatePool)
        .then(PutScaling)
        .followed_by(read::chain())
}

/// Succeeds only by failing: a pool that can be described already exists.
pub struct CheckAbsent;

#[async_trait]
impl Step<CapacityPool> for CheckAbsent {
    fn name(&self) -> &'static str {
        "check-absent"
    }

    async fn call(
        &self,
        api: &PoolApi,
        ctx: &mut StepContext<CapacityPool>,
    ) -> Result<(), RemoteError> {
        let name = pool_name(ctx.model())?;
        api.describe_pool(&name).await?;
        Err(RemoteError::new(
            "ResourceAlreadyExistsException",
            format!("Resource of type 'CapacityPool' with identifier '{name}' already exists."),
        ))
    }

    fn recover(&self, kind: ErrorKind, _error: &RemoteError) -> Recovery {
        match kind {
            ErrorKind::NotFound => Recovery::Continue,
            _ => Recovery::Fail,
        }
    }
}

pub struct CreatePool;

#[async_trait]
impl Step<CapacityPool> for CreatePool {
    fn name(&self) -> &'static str {
        "create-pool"
    }

    async fn call(
        &self,
        api: &PoolApi,
        ctx: &mut StepContext<CapacityPool>,
    ) -> Result<(), RemoteError> {
        let input = CreatePoolInput {
            name: pool_name(ctx.model())?,
            target_capacity: ctx.model().target_capacity.ok_or_else(|| {
                RemoteError::new("ValidationException", "Target capacity is required")
            })?,
            tags: create_tags(&ctx.request),
        };
        let description = api.create_pool(input).await?;
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

/// Only runs when the model asks for a scaling configuration.
pub struct PutScaling;

#[async_trait]
impl Step<CapacityPool> for PutScaling {
    fn name(&self) -> &'static str {
        "put-scaling"
    }

    fn should_run(&self, ctx: &StepContext<CapacityPool>) -> bool {
        ctx.model().scaling.is_some()
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
