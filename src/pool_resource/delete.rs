//! Delete: a pool must be cancelled before it can be deleted.

use super::translate::pool_name;
use super::PoolApi;
use crate::model::CapacityPool;
use async_trait::async_trait;
use lifecycle_framework::{
    ErrorKind, ErrorMarkers, Operation, Recovery, RemoteError, ResourceType, Step, StepChain,
    StepContext,
};

pub fn chain() -> StepChain<CapacityPool> {
    StepChain::new(Operation::Delete)
        .then(CancelPool)
        .then(DeletePool)
}

/// A pool cancelled by an earlier, interrupted Delete is fine to delete.
pub struct CancelPool;

#[async_trait]
impl Step<CapacityPool> for CancelPool {
    fn name(&self) -> &'static str {
        "cancel-pool"
    }

    async fn call(
        &self,
        api: &PoolApi,
        ctx: &mut StepContext<CapacityPool>,
    ) -> Result<(), RemoteError> {
        api.cancel_pool(&pool_name(ctx.model())?).await
    }

    fn markers(&self) -> ErrorMarkers {
        CapacityPool::markers().with_benign("already cancelled")
    }

    fn recover(&self, kind: ErrorKind, error: &RemoteError) -> Recovery {
        if kind != ErrorKind::NotFound && self.markers().is_benign(error) {
            Recovery::Continue
        } else {
            Recovery::Fail
        }
    }
}

pub struct DeletePool;

#[async_trait]
impl Step<CapacityPool> for DeletePool {
    fn name(&self) -> &'static str {
        "delete-pool"
    }

    async fn call(
        &self,
        api: &PoolApi,
        ctx: &mut StepContext<CapacityPool>,
    ) -> Result<(), RemoteError> {
        api.delete_pool(&pool_name(ctx.model())?).await
    }
}
