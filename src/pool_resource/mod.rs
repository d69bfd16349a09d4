//! Capacity pool lifecycle: the [`ResourceType`] implementation and the
//! steps behind each operation.

pub mod create;
pub mod delete;
pub mod list;
pub mod read;
pub mod translate;
pub mod update;

use crate::clients::CapacityApi;
use crate::model::CapacityPool;
use lifecycle_framework::{
    resolve_name, stabilize, Addressing, IdentityError, Operation, RemoteError, ResourceType,
    ResumptionToken, StabilizationResult, StatusCriteria, StepChain, StepContext,
};
use translate::{pool_arn, pool_name};

/// ARN service segment.
pub const SERVICE: &str = "capacity";
/// ARN resource-type segment.
pub const RESOURCE_KIND: &str = "pool";

/// The API object every pool step receives.
pub type PoolApi = dyn CapacityApi;

const POOL_READY: StatusCriteria = StatusCriteria {
    ready: &["ACTIVE"],
    failed: &["FAILED", "CANCELLED"],
};

impl ResourceType for CapacityPool {
    type Model = CapacityPool;
    type Api = PoolApi;

    const TYPE_NAME: &'static str = "CapacityPool";

    /// Fills in whichever of name and ARN is missing. Only pool ARNs in the
    /// invocation's account and region are accepted.
    fn resolve_identity(
        model: &mut CapacityPool,
        addressing: &Addressing,
    ) -> Result<(), IdentityError> {
        let name = resolve_name(
            model.name.as_deref(),
            model.arn.as_deref(),
            addressing.scope(SERVICE, RESOURCE_KIND),
        )?;
        if model.arn.is_none() {
            model.arn = Some(pool_arn(addressing, &name));
        }
        model.name = Some(name);
        Ok(())
    }

    fn chain(operation: Operation) -> StepChain<Self> {
        match operation {
            Operation::Create => create::chain(),
            Operation::Read => read::chain(),
            Operation::Update => update::chain(),
            Operation::Delete => delete::chain(),
            Operation::List => list::chain(),
        }
    }
}

/// One status check after a create or capacity change.
async fn wait_for_active(
    api: &PoolApi,
    ctx: &mut StepContext<CapacityPool>,
    token: &mut ResumptionToken,
) -> Result<StabilizationResult<()>, RemoteError> {
    let name = pool_name(ctx.model())?;
    let result = stabilize(
        move || async move { api.describe_pool(&name).await.map(|d| d.status) },
        &POOL_READY,
        token,
    )
    .await?;
    Ok(result.map(|status| ctx.model_mut().status = Some(status)))
}
