//! # Mock Capacity API
//!
//! A scripted [`CapacityApi`] for testing handlers in isolation.
//!
//! Queue one response per expected remote call, in order, then run the
//! handler. Every call pops the next response; a call that does not match the
//! next expectation panics with both method names.
//!
//! # Example
//! ```ignore
//! let mock = MockCapacityApi::new();
//! mock.expect_describe_pool().return_err(not_found("r1"));
//! mock.expect_create_pool().return_ok(description("r1", "PENDING"));
//! mock.expect_describe_pool().return_ok(description("r1", "ACTIVE"));
//!
//! let api: Arc<dyn CapacityApi> = Arc::new(mock.clone());
//! // Drive the handler...
//! mock.verify(); // Ensures all expectations were met
//! ```

use crate::clients::capacity_api::{
    CapacityApi, CreatePoolInput, ListPoolsInput, ListPoolsOutput, PoolDescription, TagPage,
    UpdatePoolInput,
};
use crate::model::ScalingConfig;
use async_trait::async_trait;
use lifecycle_framework::{RemoteError, TagSet};
use paste::paste;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Generates the expectation enum, one builder per API method, and the
/// `expect_*` / `take_*` pair on [`MockCapacityApi`].
macro_rules! mock_methods {
    ($($method:ident => $ok:ty),* $(,)?) => {
        paste! {
            /// A queued response to one expected call.
            enum Expectation {
                $( [<$method:camel>](Result<$ok, RemoteError>), )*
            }

            impl Expectation {
                fn method(&self) -> &'static str {
                    match self {
                        $( Self::[<$method:camel>](_) => stringify!($method), )*
                    }
                }
            }

            $(
                #[doc = concat!("Builder for `", stringify!($method), "` expectations.")]
                pub struct [<$method:camel Expectation>] {
                    expectations: Arc<Mutex<VecDeque<Expectation>>>,
                }

                impl [<$method:camel Expectation>] {
                    /// Sets the expectation to return a successful result.
                    pub fn return_ok(self, value: $ok) {
                        let mut exps = self.expectations.lock().unwrap();
                        exps.push_back(Expectation::[<$method:camel>](Ok(value)));
                    }

                    /// Sets the expectation to return an error.
                    pub fn return_err(self, error: RemoteError) {
                        let mut exps = self.expectations.lock().unwrap();
                        exps.push_back(Expectation::[<$method:camel>](Err(error)));
                    }
                }
            )*

            impl MockCapacityApi {
                $(
                    #[doc = concat!("Expects a `", stringify!($method), "` call.")]
                    pub fn [<expect_ $method>](&self) -> [<$method:camel Expectation>] {
                        [<$method:camel Expectation>] {
                            expectations: self.expectations.clone(),
                        }
                    }

                    fn [<take_ $method>](&self) -> Result<$ok, RemoteError> {
                        self.calls.lock().unwrap().push(stringify!($method));
                        let next = self.expectations.lock().unwrap().pop_front();
                        match next {
                            Some(Expectation::[<$method:camel>](response)) => response,
                            Some(other) => panic!(
                                "Expected {} but {} was called",
                                other.method(),
                                stringify!($method)
                            ),
                            None => panic!("Unexpected call to {}", stringify!($method)),
                        }
                    }
                )*
            }
        }
    };
}

/// A mock API with expectation tracking for fluent testing.
///
/// Clones share the same queue and call log, so a test can keep one handle
/// while the handler owns another.
#[derive(Clone, Default)]
pub struct MockCapacityApi {
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
    calls: Arc<Mutex<Vec<&'static str>>>,
}

mock_methods! {
    create_pool => PoolDescription,
    describe_pool => PoolDescription,
    update_pool => PoolDescription,
    cancel_pool => (),
    delete_pool => (),
    list_pools => ListPoolsOutput,
    tag_resource => (),
    untag_resource => (),
    list_tags_for_resource => TagPage,
    get_scaling_config => ScalingConfig,
    put_scaling_config => (),
}

impl MockCapacityApi {
    /// Creates a new mock with no expectations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Method names of every call received so far, in order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn was_called(&self, method: &str) -> bool {
        self.calls.lock().unwrap().iter().any(|call| *call == method)
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let exps = self.expectations.lock().unwrap();
        if !exps.is_empty() {
            let pending: Vec<_> = exps.iter().map(Expectation::method).collect();
            panic!("Not all expectations were met. {} remaining: {pending:?}", exps.len());
        }
    }
}

#[async_trait]
impl CapacityApi for MockCapacityApi {
    async fn create_pool(&self, _input: CreatePoolInput) -> Result<PoolDescription, RemoteError> {
        self.take_create_pool()
    }

    async fn describe_pool(&self, _name: &str) -> Result<PoolDescription, RemoteError> {
        self.take_describe_pool()
    }

    async fn update_pool(&self, _input: UpdatePoolInput) -> Result<PoolDescription, RemoteError> {
        self.take_update_pool()
    }

    async fn cancel_pool(&self, _name: &str) -> Result<(), RemoteError> {
        self.take_cancel_pool()
    }

    async fn delete_pool(&self, _name: &str) -> Result<(), RemoteError> {
        self.take_delete_pool()
    }

    async fn list_pools(&self, _input: ListPoolsInput) -> Result<ListPoolsOutput, RemoteError> {
        self.take_list_pools()
    }

    async fn tag_resource(&self, _arn: &str, _tags: TagSet) -> Result<(), RemoteError> {
        self.take_tag_resource()
    }

    async fn untag_resource(&self, _arn: &str, _keys: Vec<String>) -> Result<(), RemoteError> {
        self.take_untag_resource()
    }

    async fn list_tags_for_resource(
        &self,
        _arn: &str,
        _next_token: Option<String>,
    ) -> Result<TagPage, RemoteError> {
        self.take_list_tags_for_resource()
    }

    async fn get_scaling_config(&self, _name: &str) -> Result<ScalingConfig, RemoteError> {
        self.take_get_scaling_config()
    }

    async fn put_scaling_config(
        &self,
        _name: &str,
        _config: ScalingConfig,
    ) -> Result<(), RemoteError> {
        self.take_put_scaling_config()
    }
}

/// A pool description with default capacity, for scripting responses.
pub fn description(name: &str, status: &str) -> PoolDescription {
    PoolDescription {
        name: name.to_owned(),
        target_capacity: 24,
        status: status.to_owned(),
    }
}

pub fn not_found(name: &str) -> RemoteError {
    RemoteError::new("ResourceNotFoundException", format!("Pool {name} not found"))
}

pub fn access_denied(operation: &str) -> RemoteError {
    RemoteError::new(
        "AccessDeniedException",
        format!("User is not authorized to perform: capacity:{operation}"),
    )
}
