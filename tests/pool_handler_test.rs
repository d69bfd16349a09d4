use capacity_lifecycle::clients::mock::{access_denied, description, not_found};
use capacity_lifecycle::clients::{CapacityApi, ListPoolsOutput, MockCapacityApi, TagPage};
use capacity_lifecycle::model::{CapacityPool, ScalingConfig, Tag};
use lifecycle_framework::{
    Addressing, Completed, EngineConfig, ErrorKind, HandlerRequest, LifecycleHandler, Operation,
    OperationOutcome, RemoteError, ResumptionToken, StepPhase,
};
use std::sync::Arc;
use std::time::Duration;

fn handler(mock: &MockCapacityApi, retries: u32) -> LifecycleHandler<CapacityPool> {
    let config = EngineConfig::default()
        .with_stabilization_retries(retries)
        .with_callback_delay(Duration::ZERO);
    let api: Arc<dyn CapacityApi> = Arc::new(mock.clone());
    LifecycleHandler::new(api, config)
}

fn addressing() -> Addressing {
    Addressing::new("aws", "us-east-1", "123456789012")
}

fn request(pool: CapacityPool) -> HandlerRequest<CapacityPool> {
    HandlerRequest::new(pool, addressing())
}

fn in_progress_token(outcome: OperationOutcome<CapacityPool>) -> ResumptionToken {
    match outcome {
        OperationOutcome::InProgress { token, .. } => token,
        other => panic!("expected InProgress, got {other:?}"),
    }
}

fn page(tags: &[(&str, &str)], next_token: Option<&str>) -> TagPage {
    TagPage {
        tags: tags.iter().map(|(k, v)| Tag::new(*k, *v)).collect(),
        next_token: next_token.map(str::to_owned),
    }
}

/// Create of a new pool: not found, create, [PENDING, ACTIVE], read back.
#[tokio::test]
async fn create_waits_for_active_and_reads_back() {
    let mock = MockCapacityApi::new();
    mock.expect_describe_pool().return_err(not_found("r1"));
    mock.expect_create_pool().return_ok(description("r1", "PENDING"));
    mock.expect_describe_pool().return_ok(description("r1", "PENDING"));
    mock.expect_describe_pool().return_ok(description("r1", "ACTIVE"));
    mock.expect_describe_pool().return_ok(description("r1", "ACTIVE"));
    mock.expect_list_tags_for_resource().return_ok(TagPage::default());
    mock.expect_get_scaling_config().return_err(not_found("r1"));

    let handler = handler(&mock, 5);
    let desired = CapacityPool::new("r1").with_target_capacity(24);

    let first = handler.create(request(desired.clone()), None).await;
    let token = in_progress_token(first);
    assert_eq!(token.phase, StepPhase::Stabilize);
    assert_eq!(token.stabilization_retries_remaining, 4);

    // The host persists the token between invocations.
    let token = ResumptionToken::from_json(&token.to_json().unwrap()).unwrap();
    let model = handler
        .create(request(desired), Some(token))
        .await
        .into_model()
        .expect("pool created");

    assert_eq!(model.status.as_deref(), Some("ACTIVE"));
    assert_eq!(model.target_capacity, Some(24));
    assert_eq!(model.tags, None);
    assert_eq!(model.scaling, None);
    assert_eq!(
        model.arn.as_deref(),
        Some("arn:aws:capacity:us-east-1:123456789012:pool/r1")
    );
    assert_eq!(
        mock.calls().iter().filter(|c| **c == "create_pool").count(),
        1,
        "resuming must not repeat the create call"
    );
    mock.verify();
}

#[tokio::test]
async fn create_of_existing_pool_fails_without_creating() {
    let mock = MockCapacityApi::new();
    mock.expect_describe_pool().return_ok(description("r1", "ACTIVE"));

    let outcome = handler(&mock, 5)
        .create(request(CapacityPool::new("r1").with_target_capacity(24)), None)
        .await;

    assert_eq!(outcome.error_kind(), Some(ErrorKind::AlreadyExists));
    assert!(!mock.was_called("create_pool"));
    mock.verify();
}

#[tokio::test]
async fn create_applies_scaling_when_specified() {
    let mock = MockCapacityApi::new();
    mock.expect_describe_pool().return_err(not_found("r1"));
    mock.expect_create_pool().return_ok(description("r1", "PENDING"));
    mock.expect_describe_pool().return_ok(description("r1", "ACTIVE"));
    mock.expect_put_scaling_config().return_ok(());
    mock.expect_describe_pool().return_ok(description("r1", "ACTIVE"));
    mock.expect_list_tags_for_resource().return_ok(TagPage::default());
    mock.expect_get_scaling_config().return_ok(ScalingConfig {
        min_capacity: 8,
        max_capacity: 48,
    });

    let desired = CapacityPool::new("r1").with_target_capacity(24).with_scaling(8, 48);
    let model = handler(&mock, 5)
        .create(request(desired), None)
        .await
        .into_model()
        .expect("pool created in one invocation");

    assert_eq!(
        model.scaling,
        Some(ScalingConfig {
            min_capacity: 8,
            max_capacity: 48
        })
    );
    mock.verify();
}

#[tokio::test]
async fn failure_state_is_not_stabilized() {
    let mock = MockCapacityApi::new();
    mock.expect_describe_pool().return_err(not_found("r1"));
    mock.expect_create_pool().return_ok(description("r1", "PENDING"));
    mock.expect_describe_pool().return_ok(description("r1", "FAILED"));

    let outcome = handler(&mock, 60)
        .create(request(CapacityPool::new("r1").with_target_capacity(24)), None)
        .await;

    match outcome {
        OperationOutcome::Failed { kind, message } => {
            assert_eq!(kind, ErrorKind::NotStabilized);
            assert!(message.contains("FAILED"));
        }
        other => panic!("expected Failed, got {other:?}"),
    }
    mock.verify();
}

#[tokio::test]
async fn exhausted_budget_is_not_stabilized() {
    let mock = MockCapacityApi::new();
    mock.expect_describe_pool().return_err(not_found("r1"));
    mock.expect_create_pool().return_ok(description("r1", "PENDING"));
    mock.expect_describe_pool().return_ok(description("r1", "PENDING"));
    mock.expect_describe_pool().return_ok(description("r1", "PENDING"));

    let handler = handler(&mock, 1);
    let desired = CapacityPool::new("r1").with_target_capacity(24);

    let token = in_progress_token(handler.create(request(desired.clone()), None).await);
    let outcome = handler.create(request(desired), Some(token)).await;

    assert_eq!(outcome.error_kind(), Some(ErrorKind::NotStabilized));
    mock.verify();
}

#[tokio::test]
async fn throttling_surfaces_with_remote_message() {
    let mock = MockCapacityApi::new();
    mock.expect_describe_pool().return_err(not_found("r1"));
    mock.expect_create_pool()
        .return_err(RemoteError::new("ThrottlingException", "Rate exceeded"));

    let outcome = handler(&mock, 5)
        .create(request(CapacityPool::new("r1").with_target_capacity(24)), None)
        .await;

    assert_eq!(
        outcome,
        OperationOutcome::Failed {
            kind: ErrorKind::Throttled,
            message: "Rate exceeded".into()
        }
    );
}

#[tokio::test]
async fn create_without_capacity_is_invalid() {
    let mock = MockCapacityApi::new();
    mock.expect_describe_pool().return_err(not_found("r1"));

    let outcome = handler(&mock, 5)
        .create(request(CapacityPool::new("r1")), None)
        .await;

    assert_eq!(outcome.error_kind(), Some(ErrorKind::InvalidArgument));
    assert!(!mock.was_called("create_pool"));
}

#[tokio::test]
async fn delete_continues_past_already_cancelled() {
    let mock = MockCapacityApi::new();
    mock.expect_cancel_pool().return_err(RemoteError::new(
        "InvalidStateException",
        "Pool r1 is already cancelled",
    ));
    mock.expect_delete_pool().return_ok(());

    let outcome = handler(&mock, 5)
        .delete(request(CapacityPool::new("r1")), None)
        .await;

    assert_eq!(outcome, OperationOutcome::Success(Completed::Deleted));
    mock.verify();
}

#[tokio::test]
async fn delete_of_missing_pool_never_reaches_delete() {
    let mock = MockCapacityApi::new();
    mock.expect_cancel_pool().return_err(not_found("r1"));

    let outcome = handler(&mock, 5)
        .delete(request(CapacityPool::new("r1")), None)
        .await;

    assert_eq!(outcome.error_kind(), Some(ErrorKind::NotFound));
    assert!(!mock.was_called("delete_pool"));
    mock.verify();
}

#[tokio::test]
async fn read_merges_tag_pages() {
    let mock = MockCapacityApi::new();
    mock.expect_describe_pool().return_ok(description("r1", "ACTIVE"));
    mock.expect_list_tags_for_resource()
        .return_ok(page(&[("a", "1")], Some("t1")));
    mock.expect_list_tags_for_resource()
        .return_ok(page(&[("b", "2")], Some("t2")));
    mock.expect_list_tags_for_resource()
        .return_ok(page(&[("c", "3")], None));
    mock.expect_get_scaling_config().return_err(not_found("r1"));

    let model = handler(&mock, 5)
        .read(request(CapacityPool::from_arn(
            "arn:aws:capacity:us-east-1:123456789012:pool/r1",
        )))
        .await
        .into_model()
        .expect("pool read");

    assert_eq!(model.name.as_deref(), Some("r1"));
    assert_eq!(
        model.tags,
        Some(vec![Tag::new("a", "1"), Tag::new("b", "2"), Tag::new("c", "3")])
    );
    mock.verify();
}

#[tokio::test]
async fn read_keeps_the_last_page_value_for_duplicate_keys() {
    let mock = MockCapacityApi::new();
    mock.expect_describe_pool().return_ok(description("r1", "ACTIVE"));
    mock.expect_list_tags_for_resource()
        .return_ok(page(&[("a", "1")], Some("t1")));
    mock.expect_list_tags_for_resource()
        .return_ok(page(&[("a", "2")], None));
    mock.expect_get_scaling_config().return_err(not_found("r1"));

    let model = handler(&mock, 5)
        .read(request(CapacityPool::new("r1")))
        .await
        .into_model()
        .expect("pool read");

    assert_eq!(model.tags, Some(vec![Tag::new("a", "2")]));
    mock.verify();
}

#[tokio::test]
async fn read_stops_when_tag_pages_repeat_a_token() {
    let mock = MockCapacityApi::new();
    mock.expect_describe_pool().return_ok(description("r1", "ACTIVE"));
    mock.expect_list_tags_for_resource()
        .return_ok(page(&[("a", "1")], Some("t1")));
    mock.expect_list_tags_for_resource()
        .return_ok(page(&[("b", "2")], Some("t1")));

    let outcome = handler(&mock, 5).read(request(CapacityPool::new("r1"))).await;

    assert_eq!(outcome.error_kind(), Some(ErrorKind::GeneralFailure));
    assert!(!mock.was_called("get_scaling_config"));
    mock.verify();
}

#[tokio::test]
async fn read_strips_system_tags() {
    let mock = MockCapacityApi::new();
    mock.expect_describe_pool().return_ok(description("r1", "ACTIVE"));
    mock.expect_list_tags_for_resource().return_ok(page(
        &[("aws:cloudformation:stack-name", "s1"), ("env", "prod")],
        None,
    ));
    mock.expect_get_scaling_config().return_err(not_found("r1"));

    let model = handler(&mock, 5)
        .read(request(CapacityPool::new("r1")))
        .await
        .into_model()
        .expect("pool read");

    assert_eq!(model.tags, Some(vec![Tag::new("env", "prod")]));
}

#[tokio::test]
async fn read_downgrades_access_denied_to_absent() {
    let mock = MockCapacityApi::new();
    mock.expect_describe_pool().return_ok(description("r1", "ACTIVE"));
    mock.expect_list_tags_for_resource()
        .return_err(access_denied("ListTagsForResource"));
    mock.expect_get_scaling_config()
        .return_err(access_denied("GetScalingConfig"));

    let pool = CapacityPool::new("r1").with_tag("stale", "value");
    let model = handler(&mock, 5)
        .read(request(pool))
        .await
        .into_model()
        .expect("pool read despite missing permissions");

    assert_eq!(model.tags, None);
    assert_eq!(model.scaling, None);
    mock.verify();
}

#[tokio::test]
async fn read_of_missing_pool_is_not_found() {
    let mock = MockCapacityApi::new();
    mock.expect_describe_pool().return_err(not_found("r1"));

    let outcome = handler(&mock, 5).read(request(CapacityPool::new("r1"))).await;

    assert_eq!(outcome.error_kind(), Some(ErrorKind::NotFound));
    assert_eq!(mock.calls(), vec!["describe_pool"]);
}

#[tokio::test]
async fn update_without_changes_issues_no_mutations() {
    let mock = MockCapacityApi::new();
    mock.expect_describe_pool().return_ok(description("r1", "ACTIVE"));
    mock.expect_describe_pool().return_ok(description("r1", "ACTIVE"));
    mock.expect_list_tags_for_resource()
        .return_ok(page(&[("env", "prod")], None));
    mock.expect_get_scaling_config().return_err(not_found("r1"));

    let pool = CapacityPool::new("r1")
        .with_target_capacity(24)
        .with_tag("env", "prod");
    let outcome = handler(&mock, 5)
        .update(request(pool.clone()).with_previous(pool), None)
        .await;

    assert!(matches!(outcome, OperationOutcome::Success(Completed::Model(_))));
    for mutation in ["update_pool", "put_scaling_config", "tag_resource", "untag_resource"] {
        assert!(!mock.was_called(mutation), "{mutation} should not be called");
    }
    mock.verify();
}

#[tokio::test]
async fn update_removes_before_adding_tags() {
    let mock = MockCapacityApi::new();
    mock.expect_describe_pool().return_ok(description("r1", "ACTIVE"));
    mock.expect_untag_resource().return_ok(());
    mock.expect_tag_resource().return_ok(());
    mock.expect_describe_pool().return_ok(description("r1", "ACTIVE"));
    mock.expect_list_tags_for_resource()
        .return_ok(page(&[("env", "prod")], None));
    mock.expect_get_scaling_config().return_err(not_found("r1"));

    let previous = CapacityPool::new("r1")
        .with_target_capacity(24)
        .with_tag("env", "dev")
        .with_tag("old", "x");
    let desired = CapacityPool::new("r1")
        .with_target_capacity(24)
        .with_tag("env", "prod");
    let model = handler(&mock, 5)
        .update(request(desired).with_previous(previous), None)
        .await
        .into_model()
        .expect("pool updated");

    assert_eq!(model.tags, Some(vec![Tag::new("env", "prod")]));
    assert_eq!(
        mock.calls(),
        vec![
            "describe_pool",
            "untag_resource",
            "tag_resource",
            "describe_pool",
            "list_tags_for_resource",
            "get_scaling_config"
        ]
    );
    mock.verify();
}

#[tokio::test]
async fn update_of_capacity_waits_for_active() {
    let mock = MockCapacityApi::new();
    mock.expect_describe_pool().return_ok(description("r1", "ACTIVE"));
    mock.expect_update_pool().return_ok(description("r1", "PENDING"));
    mock.expect_describe_pool().return_ok(description("r1", "PENDING"));
    mock.expect_describe_pool().return_ok(description("r1", "ACTIVE"));
    mock.expect_describe_pool().return_ok(description("r1", "ACTIVE"));
    mock.expect_list_tags_for_resource().return_ok(TagPage::default());
    mock.expect_get_scaling_config().return_err(not_found("r1"));

    let handler = handler(&mock, 5);
    let previous = CapacityPool::new("r1").with_target_capacity(24);
    let desired = CapacityPool::new("r1").with_target_capacity(32);

    let token = in_progress_token(
        handler
            .update(request(desired.clone()).with_previous(previous.clone()), None)
            .await,
    );
    assert_eq!(token.step, 1);

    let outcome = handler
        .update(request(desired).with_previous(previous), Some(token))
        .await;
    assert!(outcome.is_terminal());
    assert_eq!(mock.calls().iter().filter(|c| **c == "update_pool").count(), 1);
    mock.verify();
}

#[tokio::test]
async fn update_of_missing_pool_is_not_found() {
    let mock = MockCapacityApi::new();
    mock.expect_describe_pool().return_err(not_found("r1"));

    let pool = CapacityPool::new("r1").with_target_capacity(32);
    let outcome = handler(&mock, 5).update(request(pool), None).await;

    assert_eq!(outcome.error_kind(), Some(ErrorKind::NotFound));
    assert!(!mock.was_called("update_pool"));
}

#[tokio::test]
async fn list_maps_entries_to_identity_models() {
    let mock = MockCapacityApi::new();
    mock.expect_list_pools().return_ok(ListPoolsOutput {
        names: vec!["a".into(), "b".into()],
        next_token: Some("b".into()),
    });

    let outcome = handler(&mock, 5)
        .list(request(CapacityPool::default()))
        .await;

    match outcome {
        OperationOutcome::Success(Completed::Page { models, next_token }) => {
            assert_eq!(next_token.as_deref(), Some("b"));
            assert_eq!(models.len(), 2);
            assert_eq!(models[0].name.as_deref(), Some("a"));
            assert_eq!(
                models[1].arn.as_deref(),
                Some("arn:aws:capacity:us-east-1:123456789012:pool/b")
            );
            assert!(models.iter().all(|m| m.status.is_none() && m.tags.is_none()));
        }
        other => panic!("expected a page, got {other:?}"),
    }
}

#[tokio::test]
async fn foreign_token_is_rejected_before_any_call() {
    let mock = MockCapacityApi::new();

    let outcome = handler(&mock, 5)
        .delete(
            request(CapacityPool::new("r1")),
            Some(ResumptionToken::new(Operation::Create, 5)),
        )
        .await;

    assert_eq!(outcome.error_kind(), Some(ErrorKind::InvalidArgument));
    assert!(mock.calls().is_empty());
}

#[tokio::test]
async fn conflicting_identity_is_rejected_before_any_call() {
    let mock = MockCapacityApi::new();
    let pool = CapacityPool {
        name: Some("r2".into()),
        arn: Some("arn:aws:capacity:us-east-1:123456789012:pool/r1".into()),
        ..Default::default()
    };

    let outcome = handler(&mock, 5).read(request(pool)).await;

    assert_eq!(outcome.error_kind(), Some(ErrorKind::InvalidArgument));
    assert!(mock.calls().is_empty());
}

#[tokio::test]
async fn arn_of_another_service_is_rejected_before_any_call() {
    let mock = MockCapacityApi::new();

    let outcome = handler(&mock, 5)
        .read(request(CapacityPool::from_arn(
            "arn:aws:iam::999999999999:role/r1",
        )))
        .await;

    assert_eq!(outcome.error_kind(), Some(ErrorKind::InvalidArgument));
    assert!(mock.calls().is_empty());
}

#[tokio::test]
async fn create_with_conflicting_identity_is_rejected_before_any_call() {
    let mock = MockCapacityApi::new();
    let pool = CapacityPool {
        name: Some("r2".into()),
        arn: Some("arn:aws:capacity:us-east-1:123456789012:pool/r1".into()),
        target_capacity: Some(4),
        ..Default::default()
    };

    let outcome = handler(&mock, 5).create(request(pool), None).await;

    assert_eq!(outcome.error_kind(), Some(ErrorKind::InvalidArgument));
    assert!(mock.calls().is_empty());
}
