//! Route configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Names and delays used by the route's plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteConfig {
    /// Name looked up eagerly.
    #[serde(default = "default_person_name")]
    pub person_name: String,

    /// Name looked up by the slow, deferred lookup.
    #[serde(default = "default_deferred_person_name")]
    pub deferred_person_name: String,

    /// Delay of the slow lookup in milliseconds.
    #[serde(default = "default_slow_delay_ms")]
    pub slow_delay_ms: u64,

    /// Message resolved by the deferred message unit.
    #[serde(default = "default_message")]
    pub message: String,

    /// Delay of the deferred message in milliseconds.
    #[serde(default = "default_message_delay_ms")]
    pub message_delay_ms: u64,
}

fn default_person_name() -> String {
    "John Doe".to_string()
}

fn default_deferred_person_name() -> String {
    "Tanner Linsley".to_string()
}

fn default_slow_delay_ms() -> u64 {
    1000
}

fn default_message() -> String {
    "Hello deferred!".to_string()
}

fn default_message_delay_ms() -> u64 {
    2000
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            person_name: default_person_name(),
            deferred_person_name: default_deferred_person_name(),
            slow_delay_ms: default_slow_delay_ms(),
            message: default_message(),
            message_delay_ms: default_message_delay_ms(),
        }
    }
}

impl RouteConfig {
    pub fn slow_delay(&self) -> Duration {
        Duration::from_millis(self.slow_delay_ms)
    }

    pub fn message_delay(&self) -> Duration {
        Duration::from_millis(self.message_delay_ms)
    }
}
