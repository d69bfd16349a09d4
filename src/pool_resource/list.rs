//! List: one page per invocation, identity-only models.

use super::translate::identity_model;
use super::PoolApi;
use crate::clients::ListPoolsInput;
use crate::model::CapacityPool;
use async_trait::async_trait;
use lifecycle_framework::{Operation, Page, RemoteError, Step, StepChain, StepContext};

pub fn chain() -> StepChain<CapacityPool> {
    StepChain::new(Operation::List).then(ListPools)
}

pub struct ListPools;

#[async_trait]
impl Step<CapacityPool> for ListPools {
    fn name(&self) -> &'static str {
        "list-pools"
    }

    async fn call(
        &self,
        api: &PoolApi,
        ctx: &mut StepContext<CapacityPool>,
    ) -> Result<(), RemoteError> {
        let input = ListPoolsInput {
            max_results: ctx.list_page_size,
            next_token: ctx.request.next_token.clone(),
        };
        let output = api.list_pools(input).await?;
        let addressing = &ctx.request.addressing;
        let models = output
            .names
            .into_iter()
            .map(|name| identity_model(name, addressing))
            .collect();
        ctx.page = Some(Page {
            models,
            next_token: output.next_token,
        });
        Ok(())
    }
}
