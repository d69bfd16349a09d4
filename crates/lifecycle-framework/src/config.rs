//! Engine configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Largest page size the remote list APIs accept.
pub const MAX_LIST_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Status checks allowed per stabilization before giving up.
    pub stabilization_retries: u32,

    /// Suggested wait before the host re-invokes an in-progress operation.
    #[serde(with = "secs")]
    pub callback_delay: Duration,

    pub list_page_size: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            stabilization_retries: 60,
            callback_delay: Duration::from_secs(15),
            list_page_size: 50,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables, falling back to the
    /// defaults for anything absent or unparsable.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let parse = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());

        let stabilization_retries = parse("LIFECYCLE_STABILIZATION_RETRIES")
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or(defaults.stabilization_retries);

        let callback_delay = parse("LIFECYCLE_CALLBACK_DELAY_SECS")
            .map(Duration::from_secs)
            .unwrap_or(defaults.callback_delay);

        let list_page_size = parse("LIFECYCLE_LIST_PAGE_SIZE")
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or(defaults.list_page_size);

        Self {
            stabilization_retries,
            callback_delay,
            list_page_size,
        }
        .normalized()
    }

    /// Clamps the page size into `1..=MAX_LIST_PAGE_SIZE`.
    pub fn normalized(mut self) -> Self {
        self.list_page_size = self.list_page_size.clamp(1, MAX_LIST_PAGE_SIZE);
        self
    }

    pub fn with_stabilization_retries(mut self, retries: u32) -> Self {
        self.stabilization_retries = retries;
        self
    }

    pub fn with_callback_delay(mut self, delay: Duration) -> Self {
        self.callback_delay = delay;
        self
    }

    pub fn with_list_page_size(mut self, size: u32) -> Self {
        self.list_page_size = size;
        self.normalized()
    }
}

mod secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
