//! Configuration for the response listener's settle race.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ListenerConfig {
    /// How long a step may produce zero network traffic before the wait is
    /// abandoned and treated as settled.
    pub grace_window_ms: u64,
    /// Hard backstop around the whole settle race.
    pub settle_timeout_ms: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            grace_window_ms: 5_000,
            settle_timeout_ms: 30_000,
        }
    }
}
