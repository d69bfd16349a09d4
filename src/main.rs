//! Demo: drives one capacity pool through its whole lifecycle against the
//! in-memory sandbox API.

use capacity_lifecycle::clients::SandboxCapacityApi;
use capacity_lifecycle::lifecycle::{setup_tracing, Host, HostError};
use capacity_lifecycle::model::CapacityPool;
use lifecycle_framework::{Addressing, Completed, EngineConfig, HandlerRequest, Operation, TagSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Instrument};

#[tokio::main]
async fn main() -> Result<(), HostError> {
    setup_tracing();

    let config = EngineConfig::from_env().with_callback_delay(Duration::from_millis(200));
    info!(?config, "Starting capacity pool demo");

    let api = Arc::new(SandboxCapacityApi::new(2));
    let host = Host::<CapacityPool>::new(api, config);
    let addressing = Addressing::new("aws", "us-east-1", "123456789012");
    let stack_tags = TagSet::from_iter([("stack", "demo")]);

    let desired = CapacityPool::new("r1")
        .with_target_capacity(24)
        .with_tag("env", "dev");
    let request = HandlerRequest::new(desired.clone(), addressing.clone())
        .with_stack_tags(stack_tags.clone())
        .with_system_tags(TagSet::from_iter([("aws:stack-name", "demo")]));

    let created = host
        .run(Operation::Create, request)
        .instrument(tracing::info_span!("create"))
        .await?;
    info!(?created, "Pool created");

    let updated = CapacityPool::new("r1")
        .with_target_capacity(32)
        .with_scaling(16, 64)
        .with_tag("env", "prod");
    let request = HandlerRequest::new(updated, addressing.clone())
        .with_previous(desired)
        .with_stack_tags(stack_tags.clone())
        .with_previous_stack_tags(stack_tags);
    let updated = host
        .run(Operation::Update, request)
        .instrument(tracing::info_span!("update"))
        .await?;
    info!(?updated, "Pool updated");

    let request = HandlerRequest::new(CapacityPool::default(), addressing.clone());
    if let Completed::Page { models, next_token } = host.run(Operation::List, request).await? {
        info!(count = models.len(), ?next_token, "Pools listed");
    }

    let request = HandlerRequest::new(
        CapacityPool::from_arn("arn:aws:capacity:us-east-1:123456789012:pool/r1"),
        addressing.clone(),
    );
    host.run(Operation::Delete, request).await?;
    info!("Pool deleted");

    // Reading a deleted pool must fail with NotFound.
    let request = HandlerRequest::new(CapacityPool::new("r1"), addressing);
    match host.run(Operation::Read, request).await {
        Err(e) => info!(error = %e, "Pool is gone"),
        Ok(completed) => info!(?completed, "Pool still readable"),
    }

    info!("Demo completed successfully");
    Ok(())
}
